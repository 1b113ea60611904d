//! Helper functions
use std::os::raw::c_int;

use crate::backend::fftw::types::{FftError, Sign};
use crate::traits::types::Direction;

/// Validate a DFT plan created with FFTW
///
/// # Arguments
/// * `plan` - Raw pointer for a plan
pub fn validate_plan<T: Sized>(plan: *mut T) -> Result<*mut T, FftError> {
    if plan.is_null() {
        Err(FftError::InvalidPlanError {})
    } else {
        Ok(plan)
    }
}

/// Convert a transform dimension to a C `int`.
pub fn to_c_int(n: usize) -> Result<c_int, FftError> {
    c_int::try_from(n).map_err(|_| FftError::InvalidDimensionError)
}

/// Exponent sign used by FFTW for a transform direction.
pub fn sign(direction: Direction) -> Sign {
    match direction {
        Direction::Forward => Sign::Forward,
        Direction::Inverse => Sign::Backward,
    }
}
