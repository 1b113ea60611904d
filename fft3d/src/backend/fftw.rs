//! # FFTW Backend
//!
//! Batched in-place 1D transforms planned with `fftw_plan_many_dft`. Planning and plan
//! destruction go through a global mutex, execution of an existing plan on new arrays does not.
pub mod helpers;
pub mod types;

pub use types::FftError;

use fft3d_fftw_sys as ffi;
use num_complex::{Complex32, Complex64};

use crate::backend::fftw::helpers::{sign, to_c_int, validate_plan};
use crate::backend::fftw::types::{FftwHandle, Plan32, Plan64, FFTW_ESTIMATE, FFTW_UNALIGNED};
use crate::traits::fft::Local1dTransform;
use crate::traits::types::{ComplexLayout, Direction, Fft3dError, Result};

/// Exclusive call of FFTW interface.
macro_rules! excall {
    ($call:expr) => {{
        use $crate::backend::fftw::types::FFTW_MUTEX;
        let _lock = FFTW_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        unsafe { $call }
    }};
}

/// Backend wrapping the FFTW 3 library.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fftw;

fn check_len(length: usize, batch: usize, data_len: usize) -> Result<()> {
    if data_len != 2 * length * batch {
        return Err(Fft3dError::Backend(format!(
            "expected {} scalars, found {}",
            2 * length * batch,
            data_len
        )));
    }
    Ok(())
}

impl Local1dTransform<f64> for Fftw {
    const LAYOUT: ComplexLayout = ComplexLayout::Interleaved;

    type Handle = FftwHandle<Plan64>;

    fn prepare(direction: Direction, length: usize, batch: usize) -> Result<Self::Handle> {
        let n = [to_c_int(length)?];
        let howmany = to_c_int(batch)?;

        // Planning in estimate mode leaves the array untouched, it only fixes in-placeness
        let mut probe = vec![Complex64::default(); (length * batch).max(1)];
        let ptr = probe.as_mut_ptr();

        let plan = Plan64(validate_plan(excall!(ffi::fftw_plan_many_dft(
            1,
            n.as_ptr(),
            howmany,
            ptr,
            std::ptr::null(),
            1,
            n[0],
            ptr,
            std::ptr::null(),
            1,
            n[0],
            sign(direction) as i32,
            FFTW_ESTIMATE | FFTW_UNALIGNED
        )))?);

        Ok(FftwHandle {
            plan,
            length,
            batch,
        })
    }

    fn run(handle: &mut Self::Handle, data: &mut [f64]) -> Result<()> {
        check_len(handle.length, handle.batch, data.len())?;
        if data.is_empty() {
            return Ok(());
        }

        let buffer = bytemuck::cast_slice_mut::<f64, Complex64>(data);
        unsafe { ffi::fftw_execute_dft(handle.plan.0, buffer.as_mut_ptr(), buffer.as_mut_ptr()) };
        Ok(())
    }
}

impl Local1dTransform<f32> for Fftw {
    const LAYOUT: ComplexLayout = ComplexLayout::Interleaved;

    type Handle = FftwHandle<Plan32>;

    fn prepare(direction: Direction, length: usize, batch: usize) -> Result<Self::Handle> {
        let n = [to_c_int(length)?];
        let howmany = to_c_int(batch)?;

        let mut probe = vec![Complex32::default(); (length * batch).max(1)];
        let ptr = probe.as_mut_ptr();

        let plan = Plan32(validate_plan(excall!(ffi::fftwf_plan_many_dft(
            1,
            n.as_ptr(),
            howmany,
            ptr,
            std::ptr::null(),
            1,
            n[0],
            ptr,
            std::ptr::null(),
            1,
            n[0],
            sign(direction) as i32,
            FFTW_ESTIMATE | FFTW_UNALIGNED
        )))?);

        Ok(FftwHandle {
            plan,
            length,
            batch,
        })
    }

    fn run(handle: &mut Self::Handle, data: &mut [f32]) -> Result<()> {
        check_len(handle.length, handle.batch, data.len())?;
        if data.is_empty() {
            return Ok(());
        }

        let buffer = bytemuck::cast_slice_mut::<f32, Complex32>(data);
        unsafe { ffi::fftwf_execute_dft(handle.plan.0, buffer.as_mut_ptr(), buffer.as_mut_ptr()) };
        Ok(())
    }
}
