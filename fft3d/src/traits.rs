//! # Trait Definitions
pub mod comm;
pub mod fft;
pub mod remap;
pub mod types;
