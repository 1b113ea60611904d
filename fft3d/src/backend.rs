//! # Backends
//!
//! Implementations of [`Local1dTransform`](crate::traits::fft::Local1dTransform), the batched 1D
//! complex DFTs each stage of a plan is built on.
pub mod layout;

#[cfg(feature = "fftw")]
pub mod fftw;
mod naive;
mod rust_fft;

#[cfg(feature = "fftw")]
pub use fftw::Fftw;
pub use naive::NaiveDft;
pub use rust_fft::RustFft;

/// Backend used by plans unless another is requested, FFTW when built with the `fftw` feature.
#[cfg(feature = "fftw")]
pub type DefaultBackend = Fftw;

/// Backend used by plans unless another is requested, FFTW when built with the `fftw` feature.
#[cfg(not(feature = "fftw"))]
pub type DefaultBackend = RustFft;
