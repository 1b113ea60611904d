//! # FFTW Types
use std::sync::Mutex;

use fft3d_fftw_sys as ffi;
use lazy_static::lazy_static;

/// A threadsafe wrapper for a FFT plan operating on double precision data
pub struct Plan64(pub *mut ffi::fftw_plan_s);

/// A threadsafe wrapper for a FFT plan operating on single precision data
pub struct Plan32(pub *mut ffi::fftwf_plan_s);

impl Drop for Plan64 {
    fn drop(&mut self) {
        let _lock = FFTW_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        unsafe {
            ffi::fftw_destroy_plan(self.0);
        }
    }
}

impl Drop for Plan32 {
    fn drop(&mut self) {
        let _lock = FFTW_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        unsafe {
            ffi::fftwf_destroy_plan(self.0);
        }
    }
}

// Executing a plan is thread safe, only planning and destruction are serialised
unsafe impl Send for Plan32 {}
unsafe impl Send for Plan64 {}
unsafe impl Sync for Plan32 {}
unsafe impl Sync for Plan64 {}

/// A batched in-place 1D plan, with the shape it was created for.
pub struct FftwHandle<P> {
    /// Raw plan
    pub plan: P,

    /// Length of each transform
    pub length: usize,

    /// Number of transforms per execution
    pub batch: usize,
}

/// Error type for the FFTW wrapper, raised when planning fails or a shape cannot be expressed.
#[derive(Debug)]
pub enum FftError {
    /// Failed to create a valid plan using FFTW library
    InvalidPlanError,

    /// Transform length or batch count exceeds the range of a C `int`
    InvalidDimensionError,
}

/// FFTW in 'estimate' mode. A sub-optimal heuristic is used to create FFT plan.
/// input/output arrays are not overwritten during planning, see [original doc](https://www.fftw.org/fftw3_doc/Planner-Flags.html) for detail
pub const FFTW_ESTIMATE: u32 = 1 << 6;

/// Plans may be executed on arrays without the alignment of the planning array.
pub const FFTW_UNALIGNED: u32 = 1 << 1;

lazy_static! {
    /// Mutex for FFTW call.
    ///
    /// This mutex is necessary because most of calls in FFTW are not thread-safe.
    /// See the [original document](http://www.fftw.org/fftw3_doc/Thread-safety.html) for detail
    pub static ref FFTW_MUTEX: Mutex<()> = Mutex::new(());
}

/// Direction of complex-to-complex transform
#[repr(i32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Sign {
    /// Forward transform
    Forward = -1,

    /// Backward transform
    Backward = 1,
}
