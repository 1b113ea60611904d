//! Data redistribution interface
use num_complex::Complex;

use crate::grid::Layout;
use crate::traits::comm::Communicator;
use crate::traits::types::{FftScalar, Result};

/// Redistributes a distributed 3D complex array from one set of per-process layouts to another.
///
/// A descriptor is computed once per pair of layouts and reused for every execution. Both
/// [`build_descriptor`](RemapEngine::build_descriptor) and [`exchange`](RemapEngine::exchange)
/// are collective over [`comm`](RemapEngine::comm): all ranks must be executing the same remap
/// step at the same time.
pub trait RemapEngine {
    /// Communicator carrying the exchange
    type Comm: Communicator;

    /// Precomputed communication pattern
    type Descriptor;

    /// Communicator this engine exchanges over.
    fn comm(&self) -> &Self::Comm;

    /// Compute the pattern moving data from `from` on every rank to `to` on every rank.
    ///
    /// # Arguments
    /// * `from` - Source layout of the calling rank.
    /// * `to` - Destination layout of the calling rank.
    fn build_descriptor(&self, from: &Layout, to: &Layout) -> Result<Self::Descriptor>;

    /// Number of complex elements of scratch space required by `descriptor`.
    fn scratch_len(descriptor: &Self::Descriptor) -> usize;

    /// Collective half of a remap, reads `src` and leaves every element destined for this rank in
    /// `scratch`.
    ///
    /// # Arguments
    /// * `descriptor` - Pattern from [`build_descriptor`](RemapEngine::build_descriptor).
    /// * `src` - Local data in the source layout.
    /// * `scratch` - At least [`scratch_len`](RemapEngine::scratch_len) elements.
    fn exchange<T: FftScalar>(
        &self,
        descriptor: &Self::Descriptor,
        src: &[Complex<T>],
        scratch: &mut [Complex<T>],
    ) -> Result<()>;

    /// Local half of a remap, writes the elements received by
    /// [`exchange`](RemapEngine::exchange) into `dst` in the destination layout.
    fn unpack<T: FftScalar>(
        &self,
        descriptor: &Self::Descriptor,
        scratch: &[Complex<T>],
        dst: &mut [Complex<T>],
    );

    /// Full remap of `src` into `dst`.
    fn execute<T: FftScalar>(
        &self,
        descriptor: &Self::Descriptor,
        src: &[Complex<T>],
        dst: &mut [Complex<T>],
        scratch: &mut [Complex<T>],
    ) -> Result<()> {
        self.exchange(descriptor, src, scratch)?;
        self.unpack(descriptor, scratch, dst);
        Ok(())
    }
}
