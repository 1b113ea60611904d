//! Static FFTW 3 libraries, double (`libfftw3`) and single (`libfftw3f`) precision.
//!
//! This crate has no Rust API. Its build script compiles FFTW and exports the
//! install prefix to dependants as `DEP_FFTW3_ROOT`.
