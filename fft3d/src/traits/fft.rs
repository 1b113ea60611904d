//! Local 1D transform backend interface
use crate::traits::types::{ComplexLayout, Direction, FftScalar, Result};

/// A library computing batches of in-place one dimensional complex DFTs.
///
/// Implementors are marker types, the functions are associated so that a plan dispatches to its
/// backend statically. Handles are owned by the plan that prepared them and released when it is
/// dropped.
///
/// # Example usage
///
/// ```rust
/// use fft3d::backend::RustFft;
/// use fft3d::traits::fft::Local1dTransform;
/// use fft3d::traits::types::Direction;
///
/// // Two transforms of length 4, interleaved storage
/// let mut data = vec![0f64; 2 * 4 * 2];
/// data[0] = 1.0;
/// data[8] = 1.0;
///
/// let mut handle = <RustFft as Local1dTransform<f64>>::prepare(Direction::Forward, 4, 2).unwrap();
/// <RustFft as Local1dTransform<f64>>::run(&mut handle, &mut data).unwrap();
///
/// // A unit impulse transforms to a constant
/// assert!(data.chunks(2).all(|c| c[0] == 1.0 && c[1] == 0.0));
/// ```
pub trait Local1dTransform<T: FftScalar> {
    /// Memory layout of the complex numbers handed to [`run`](Local1dTransform::run)
    const LAYOUT: ComplexLayout;

    /// Backend specific transform plan
    type Handle: Send;

    /// Prepare a handle transforming `batch` contiguous segments of `length` complex elements.
    ///
    /// # Arguments
    /// * `direction` - Sign of the exponent, both directions are unnormalised.
    /// * `length` - Length of each 1D transform.
    /// * `batch` - Number of transforms computed per call.
    fn prepare(direction: Direction, length: usize, batch: usize) -> Result<Self::Handle>;

    /// Transform `batch` segments in place.
    ///
    /// # Arguments
    /// * `handle` - Handle returned by [`prepare`](Local1dTransform::prepare).
    /// * `data` - `2 * length * batch` scalars stored in [`LAYOUT`](Local1dTransform::LAYOUT).
    fn run(handle: &mut Self::Handle, data: &mut [T]) -> Result<()>;
}
