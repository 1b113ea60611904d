//! Batched transforms with the pure Rust `rustfft` library.
use std::sync::Arc;

use num_complex::Complex;
use rayon::prelude::*;
use rustfft::{Fft, FftNum, FftPlanner};

use crate::traits::fft::Local1dTransform;
use crate::traits::types::{ComplexLayout, Direction, Fft3dError, FftScalar, Result};

/// Batches holding at least this many complex elements are split over the rayon thread pool.
pub const PARALLEL_THRESHOLD: usize = 1 << 15;

/// Backend wrapping `rustfft`, operating directly on interleaved complex data.
#[derive(Clone, Copy, Debug, Default)]
pub struct RustFft;

/// A planned `rustfft` transform together with its scratch space.
pub struct RustFftHandle<T: FftNum> {
    fft: Arc<dyn Fft<T>>,
    length: usize,
    batch: usize,
    scratch: Vec<Complex<T>>,
}

impl<T: FftScalar + FftNum> Local1dTransform<T> for RustFft {
    const LAYOUT: ComplexLayout = ComplexLayout::Interleaved;

    type Handle = RustFftHandle<T>;

    fn prepare(direction: Direction, length: usize, batch: usize) -> Result<RustFftHandle<T>> {
        let mut planner = FftPlanner::new();
        let fft = match direction {
            Direction::Forward => planner.plan_fft_forward(length),
            Direction::Inverse => planner.plan_fft_inverse(length),
        };
        let scratch = vec![Complex::new(T::zero(), T::zero()); fft.get_inplace_scratch_len()];

        Ok(RustFftHandle {
            fft,
            length,
            batch,
            scratch,
        })
    }

    fn run(handle: &mut RustFftHandle<T>, data: &mut [T]) -> Result<()> {
        let total = handle.length * handle.batch;
        if data.len() != 2 * total {
            return Err(Fft3dError::Backend(format!(
                "expected {} scalars, found {}",
                2 * total,
                data.len()
            )));
        }
        if total == 0 {
            return Ok(());
        }

        let buffer = bytemuck::cast_slice_mut::<T, Complex<T>>(data);

        if total >= PARALLEL_THRESHOLD && handle.batch > 1 {
            let fft = &handle.fft;
            let scratch_len = handle.scratch.len();
            let per_task = (PARALLEL_THRESHOLD / handle.length).max(1) * handle.length;

            buffer.par_chunks_mut(per_task).for_each_init(
                || vec![Complex::new(T::zero(), T::zero()); scratch_len],
                |scratch, chunk| fft.process_with_scratch(chunk, scratch),
            );
        } else {
            handle
                .fft
                .process_with_scratch(buffer, &mut handle.scratch);
        }

        Ok(())
    }
}
