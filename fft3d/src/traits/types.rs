//! Utility types for trait definitions.
use std::fmt::{Debug, Display};

use bytemuck::Pod;
use num::traits::{FloatConst, FromPrimitive, NumAssign, Signed};
use num::Float;

#[cfg(feature = "fftw")]
use crate::backend::fftw::FftError;

/// Error type for plan construction and execution.
///
/// `Configuration`, `Allocation`, `BufferTooSmall` and `InPlaceNotPermitted` are raised before
/// any collective call is made. `Communication` and `Backend` failures happen part way through
/// a collective pipeline and leave the other ranks of the communicator blocked, they must be
/// treated as fatal for the whole distributed computation.
#[derive(thiserror::Error, Debug)]
pub enum Fft3dError {
    /// Invalid grid dimensions or inconsistent local block bounds
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A collective data exchange failed
    #[error("communication failure: {0}")]
    Communication(String),

    /// The 1D transform library reported an error
    #[error("backend failure: {0}")]
    Backend(String),

    /// A plan owned buffer could not be allocated
    #[error("allocation of {len} elements for the {name} buffer failed")]
    Allocation {
        /// Buffer being allocated
        name: &'static str,
        /// Requested number of elements
        len: usize,
    },

    /// A caller provided buffer is shorter than the local block it must hold
    #[error("{name} buffer holds {len} elements, {required} required")]
    BufferTooSmall {
        /// Buffer role
        name: &'static str,
        /// Length of the buffer provided
        len: usize,
        /// Minimum length
        required: usize,
    },

    /// In-place execution requested for a plan that cannot support it
    #[error("in-place execution not permitted: {0}")]
    InPlaceNotPermitted(String),

    /// Error raised by the FFTW wrapper
    #[cfg(feature = "fftw")]
    #[error("FFTW error: {0:?}")]
    Fftw(#[from] FftError),
}

/// Result Type
pub type Result<T> = std::result::Result<T, Fft3dError>;

/// Floating point precision of complex grid elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Precision {
    /// `f32` real and imaginary components
    Single,
    /// `f64` real and imaginary components
    Double,
}

/// Storage of the real and imaginary parts of a batch of complex numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComplexLayout {
    /// `[re_0, im_0, re_1, im_1, ...]`, identical to a `[Complex<T>]` slice
    Interleaved,
    /// `[re_0, re_1, ..., im_0, im_1, ...]`
    Planar,
}

/// Direction of a transform.
///
/// Both directions are unnormalised at the kernel level, `Inverse` results are optionally scaled
/// by `1/(Nfast*Nmid*Nslow)` once the pipeline completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `exp(-2 pi i jk/n)` kernel
    Forward,
    /// `exp(+2 pi i jk/n)` kernel
    Inverse,
}

/// Scalars which can be exchanged by a [`Communicator`](crate::traits::comm::Communicator).
#[cfg(feature = "mpi")]
pub trait CommScalar: mpi::traits::Equivalence {}

#[cfg(feature = "mpi")]
impl<T: mpi::traits::Equivalence> CommScalar for T {}

/// Scalars which can be exchanged by a [`Communicator`](crate::traits::comm::Communicator).
#[cfg(not(feature = "mpi"))]
pub trait CommScalar {}

#[cfg(not(feature = "mpi"))]
impl<T> CommScalar for T {}

/// Real scalar type underlying the complex grid elements, implemented for `f32` and `f64`.
pub trait FftScalar:
    Float
    + FloatConst
    + NumAssign
    + Signed
    + FromPrimitive
    + Pod
    + Default
    + Debug
    + Display
    + Send
    + Sync
    + CommScalar
    + 'static
{
    /// Precision tag of this scalar
    const PRECISION: Precision;
}

impl FftScalar for f32 {
    const PRECISION: Precision = Precision::Single;
}

impl FftScalar for f64 {
    const PRECISION: Precision = Precision::Double;
}
