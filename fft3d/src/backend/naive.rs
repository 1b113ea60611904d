//! Direct evaluation of the DFT sum, a slow reference backend storing data in planar form.
use crate::traits::fft::Local1dTransform;
use crate::traits::types::{ComplexLayout, Direction, Fft3dError, FftScalar, Result};

/// Reference backend evaluating each length `n` transform in `O(n^2)` operations.
#[derive(Clone, Copy, Debug, Default)]
pub struct NaiveDft;

/// Twiddle table and workspace of a [`NaiveDft`] transform.
#[derive(Debug)]
pub struct NaiveHandle<T> {
    length: usize,
    batch: usize,
    cos: Vec<T>,
    sin: Vec<T>,
    work: Vec<T>,
}

impl<T: FftScalar> Local1dTransform<T> for NaiveDft {
    const LAYOUT: ComplexLayout = ComplexLayout::Planar;

    type Handle = NaiveHandle<T>;

    fn prepare(direction: Direction, length: usize, batch: usize) -> Result<NaiveHandle<T>> {
        let sign = match direction {
            Direction::Forward => -T::one(),
            Direction::Inverse => T::one(),
        };

        let n = T::from_usize(length)
            .ok_or_else(|| Fft3dError::Backend(format!("length {} not representable", length)))?;

        let (cos, sin): (Vec<T>, Vec<T>) = (0..length)
            .map(|k| {
                let theta = sign * T::TAU() * T::from_usize(k).unwrap_or_else(T::zero) / n;
                (theta.cos(), theta.sin())
            })
            .unzip();

        Ok(NaiveHandle {
            length,
            batch,
            cos,
            sin,
            work: vec![T::zero(); 2 * length],
        })
    }

    fn run(handle: &mut NaiveHandle<T>, data: &mut [T]) -> Result<()> {
        let n = handle.length;
        let total = n * handle.batch;
        if data.len() != 2 * total {
            return Err(Fft3dError::Backend(format!(
                "expected {} scalars, found {}",
                2 * total,
                data.len()
            )));
        }

        let (re, im) = data.split_at_mut(total);
        let (work_re, work_im) = handle.work.split_at_mut(n);

        for (seg_re, seg_im) in re.chunks_exact_mut(n).zip(im.chunks_exact_mut(n)) {
            for k in 0..n {
                let mut acc_re = T::zero();
                let mut acc_im = T::zero();
                for j in 0..n {
                    let w = (j * k) % n;
                    let (c, s) = (handle.cos[w], handle.sin[w]);
                    acc_re += seg_re[j] * c - seg_im[j] * s;
                    acc_im += seg_re[j] * s + seg_im[j] * c;
                }
                work_re[k] = acc_re;
                work_im[k] = acc_im;
            }
            seg_re.copy_from_slice(work_re);
            seg_im.copy_from_slice(work_im);
        }

        Ok(())
    }
}
