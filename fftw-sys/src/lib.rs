//! Raw bindings to the batched complex-to-complex subset of FFTW 3.
//!
//! `fftw_complex` and `fftwf_complex` are bound to the `num_complex` types so
//! that `&mut [Complex<f64>]` buffers can be handed to the planner directly.
#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(dead_code)]

#[allow(unused_imports)]
use libc::FILE;
pub use num_complex::Complex32 as fftwf_complex;
pub use num_complex::Complex64 as fftw_complex;

include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
