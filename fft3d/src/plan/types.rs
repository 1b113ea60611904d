//! Data structures for plans and their configuration.
use std::marker::PhantomData;

use num_complex::Complex;

use crate::backend::DefaultBackend;
use crate::grid::{AxisOrder, Block, Grid, Layout};
use crate::traits::fft::Local1dTransform;
use crate::traits::remap::RemapEngine;
use crate::traits::types::FftScalar;

/// Tiling of the grid used by the three intermediate, axis contiguous, layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Decomposition {
    /// Pencils over a near square `P1 x P2` processor grid
    #[default]
    Pencil,

    /// Slabs, every process holds whole planes of the grid
    Slab,
}

/// Local storage order of the output block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OutputOrder {
    /// Fast axis varies fastest, the same convention as the input
    #[default]
    Natural,

    /// Mid axis varies fastest, then slow, then fast
    MidFirst,

    /// Slow axis varies fastest, then fast, then mid
    SlowFirst,
}

impl OutputOrder {
    /// Corresponding storage order.
    pub fn axis_order(&self) -> AxisOrder {
        match self {
            OutputOrder::Natural => AxisOrder::FAST_FIRST,
            OutputOrder::MidFirst => AxisOrder::MID_FIRST,
            OutputOrder::SlowFirst => AxisOrder::SLOW_FIRST,
        }
    }
}

/// Options recognised when building a plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Config {
    /// Normalise inverse transforms by `1/(Nfast*Nmid*Nslow)`
    pub scaled: bool,

    /// Allow in-place execution when no pre-remap is required
    pub permit_in_place: bool,

    /// Tiling of the intermediate layouts
    pub decomposition: Decomposition,

    /// Storage order of the output block
    pub output_order: OutputOrder,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scaled: true,
            permit_in_place: true,
            decomposition: Decomposition::Pencil,
            output_order: OutputOrder::Natural,
        }
    }
}

/// Buffer a remap writes its result into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    /// The plan owned copy buffer
    Copy,

    /// The caller's output buffer
    Output,
}

/// A remap step of the pipeline and the buffer receiving its result.
#[derive(Clone, Debug)]
pub struct RemapStage<D> {
    /// Communication pattern
    pub descriptor: D,

    /// Destination buffer
    pub target: Target,
}

/// Parameters and backend handles of one batched 1D transform pass.
pub struct AxisTransform<H> {
    /// Length of each transform, the global extent of the axis
    pub length: usize,

    /// Number of transforms computed locally
    pub batch: usize,

    /// Forward handle, absent when the batch is empty
    pub forward: Option<H>,

    /// Inverse handle, absent when the batch is empty
    pub inverse: Option<H>,
}

/// A distributed 3D FFT over a fixed grid and partitioning.
///
/// Owns the remap descriptors, the backend handles of the three transform passes and the copy,
/// scratch and staging buffers reused by every execution. A plan is not shared between
/// concurrent executions, every executor method takes `&mut self`.
pub struct Plan<T, B, R>
where
    T: FftScalar,
    B: Local1dTransform<T>,
    R: RemapEngine,
{
    pub(crate) grid: Grid,
    pub(crate) input: Layout,
    pub(crate) output: Layout,

    /// Fast, mid and slow axis contiguous layouts
    pub(crate) layouts: [Layout; 3],

    pub(crate) pre: Option<RemapStage<R::Descriptor>>,
    pub(crate) mid1: Option<RemapStage<R::Descriptor>>,
    pub(crate) mid2: Option<RemapStage<R::Descriptor>>,
    pub(crate) post: Option<RemapStage<R::Descriptor>>,

    /// Where the input is copied before the fast pass of an out-of-place execution without
    /// pre-remap
    pub(crate) fast_target: Target,

    pub(crate) axes: [AxisTransform<B::Handle>; 3],

    pub(crate) copy: Vec<Complex<T>>,
    pub(crate) scratch: Vec<Complex<T>>,

    /// Planar workspace, empty for interleaved backends
    pub(crate) staging: Vec<T>,

    pub(crate) scaled: bool,
    pub(crate) permit_in_place: bool,
    pub(crate) norm: T,
    pub(crate) norm_count: usize,

    pub(crate) engine: R,
}

/// Builder for [`Plan`], collects the grid, the local blocks and the configuration.
///
/// Every rank of the communicator must call [`build`](PlanBuilder::build) with the same grid and
/// configuration, and its own input and output blocks.
pub struct PlanBuilder<T, B = DefaultBackend> {
    pub(crate) grid: Option<[usize; 3]>,
    pub(crate) input: Option<Block>,
    pub(crate) output: Option<Block>,
    pub(crate) config: Config,
    pub(crate) scalar: PhantomData<(T, B)>,
}
