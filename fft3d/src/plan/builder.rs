//! Builder objects to construct plans
use std::marker::PhantomData;

use num_complex::Complex;
use tracing::{debug, info};

use crate::backend::DefaultBackend;
use crate::grid::helpers::{bifactor, split};
use crate::grid::{AxisOrder, Block, Grid, Layout};
use crate::plan::types::{
    AxisTransform, Config, Decomposition, OutputOrder, Plan, PlanBuilder, RemapStage, Target,
};
use crate::remap::BlockRemap;
use crate::traits::comm::Communicator;
use crate::traits::fft::Local1dTransform;
use crate::traits::remap::RemapEngine;
use crate::traits::types::{ComplexLayout, Direction, Fft3dError, FftScalar, Result};

/// Allocate a zeroed buffer, reporting failure instead of aborting.
fn allocate<X: Clone + Default>(name: &'static str, len: usize) -> Result<Vec<X>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| Fft3dError::Allocation { name, len })?;
    buffer.resize(len, X::default());
    Ok(buffer)
}

/// Whether `local` holds on every rank.
fn all_ranks<C: Communicator>(comm: &C, local: bool) -> Result<bool> {
    Ok(comm.all_reduce_max(i64::from(!local))? == 0)
}

/// The fast, mid and slow axis contiguous pencils owned by `rank`, over a `np1 x np2` processor
/// grid.
fn pencils(grid: &Grid, np1: usize, np2: usize, rank: usize) -> [Block; 3] {
    let (ip1, ip2) = (rank % np1, rank / np1);
    let last = |axis: usize| grid.n[axis] as i64 - 1;

    let (j1lo, j1hi) = split(grid.n[1], np1, ip1);
    let (k2lo, k2hi) = split(grid.n[2], np2, ip2);
    let (i1lo, i1hi) = split(grid.n[0], np1, ip1);
    let (j2lo, j2hi) = split(grid.n[1], np2, ip2);

    [
        Block::new([0, j1lo, k2lo], [last(0), j1hi, k2hi]),
        Block::new([i1lo, 0, k2lo], [i1hi, last(1), k2hi]),
        Block::new([i1lo, j2lo, 0], [i1hi, j2hi, last(2)]),
    ]
}

/// Prepare the forward and inverse handles of a pass over `layout` along `axis`.
fn axis_transform<T, B>(
    grid: &Grid,
    layout: &Layout,
    axis: usize,
) -> Result<AxisTransform<B::Handle>>
where
    T: FftScalar,
    B: Local1dTransform<T>,
{
    let length = grid.n[axis];
    let batch = layout.volume() / length;

    let (forward, inverse) = if batch > 0 {
        (
            Some(B::prepare(Direction::Forward, length, batch)?),
            Some(B::prepare(Direction::Inverse, length, batch)?),
        )
    } else {
        (None, None)
    };

    Ok(AxisTransform {
        length,
        batch,
        forward,
        inverse,
    })
}

impl<T: FftScalar> PlanBuilder<T, DefaultBackend> {
    /// Constructor, using the default backend and configuration.
    pub fn new() -> Self {
        PlanBuilder {
            grid: None,
            input: None,
            output: None,
            config: Config::default(),
            scalar: PhantomData,
        }
    }
}

impl<T: FftScalar> Default for PlanBuilder<T, DefaultBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, B> PlanBuilder<T, B>
where
    T: FftScalar,
    B: Local1dTransform<T>,
{
    /// Select the 1D transform backend.
    pub fn backend<B2: Local1dTransform<T>>(self) -> PlanBuilder<T, B2> {
        PlanBuilder {
            grid: self.grid,
            input: self.input,
            output: self.output,
            config: self.config,
            scalar: PhantomData,
        }
    }

    /// Global extents `[Nfast, Nmid, Nslow]`.
    pub fn grid(mut self, n: [usize; 3]) -> Self {
        self.grid = Some(n);
        self
    }

    /// Block of the input owned by this rank, stored with the fast axis varying fastest.
    pub fn input(mut self, block: Block) -> Self {
        self.input = Some(block);
        self
    }

    /// Block of the output owned by this rank.
    pub fn output(mut self, block: Block) -> Self {
        self.output = Some(block);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Normalise inverse transforms.
    pub fn scaled(mut self, scaled: bool) -> Self {
        self.config.scaled = scaled;
        self
    }

    /// Allow in-place execution.
    pub fn permit_in_place(mut self, permit: bool) -> Self {
        self.config.permit_in_place = permit;
        self
    }

    /// Tiling of the intermediate layouts.
    pub fn decomposition(mut self, decomposition: Decomposition) -> Self {
        self.config.decomposition = decomposition;
        self
    }

    /// Storage order of the output block.
    pub fn output_order(mut self, order: OutputOrder) -> Self {
        self.config.output_order = order;
        self
    }

    /// Build the plan, remapping with [`BlockRemap`] over `comm`. Collective.
    pub fn build<C: Communicator>(self, comm: C) -> Result<Plan<T, B, BlockRemap<C>>> {
        self.build_with_engine(BlockRemap::new(comm))
    }

    /// Build the plan over any remap engine. Collective over the engine's communicator.
    pub fn build_with_engine<R: RemapEngine>(self, engine: R) -> Result<Plan<T, B, R>> {
        let n = self.grid.ok_or_else(|| {
            Fft3dError::Configuration("grid extents must be set before building".to_string())
        })?;
        let in_block = self.input.ok_or_else(|| {
            Fft3dError::Configuration("input block must be set before building".to_string())
        })?;
        let out_block = self.output.ok_or_else(|| {
            Fft3dError::Configuration("output block must be set before building".to_string())
        })?;

        let config = self.config;
        let comm = engine.comm();
        let size = comm.size();
        let rank = comm.rank();

        // Agree on the validity of every rank's arguments before any descriptor is built
        let local = Grid::new(n).and_then(|grid| {
            in_block.validate(&grid)?;
            out_block.validate(&grid)?;
            Ok(grid)
        });
        let valid = all_ranks(comm, local.is_ok())?;
        let grid = local?;
        if !valid {
            return Err(Fft3dError::Configuration(
                "grid or block bounds rejected on another rank".to_string(),
            ));
        }

        let input = Layout::new(in_block, AxisOrder::FAST_FIRST);
        let output = Layout::new(out_block, config.output_order.axis_order());

        let (np1, np2) = match config.decomposition {
            Decomposition::Pencil => bifactor(size),
            Decomposition::Slab => (1, size),
        };
        let [fast, mid, slow] = pencils(&grid, np1, np2, rank);

        // Input already contiguous along the fast axis is transformed where it lies
        let pre_needed = !all_ranks(comm, in_block.is_empty() || in_block.spans(&grid, 0))?;
        let fast = if pre_needed {
            Layout::new(fast, AxisOrder::FAST_FIRST)
        } else {
            Layout::new(in_block, AxisOrder::FAST_FIRST)
        };

        let mid = Layout::new(mid, AxisOrder::MID_FIRST);

        // Output contiguous along the slow axis, stored in the same arrangement, receives the
        // slow pass directly
        let slow_output = Layout::new(out_block, AxisOrder::SLOW_FIRST);
        let post_needed = !all_ranks(
            comm,
            out_block.is_empty()
                || (out_block.spans(&grid, 2) && slow_output.same_arrangement(&output)),
        )?;
        let slow = if post_needed {
            Layout::new(slow, AxisOrder::SLOW_FIRST)
        } else {
            slow_output
        };

        let mid1_needed = !all_ranks(comm, fast.same_arrangement(&mid))?;
        let mid2_needed = !all_ranks(comm, mid.same_arrangement(&slow))?;

        // Only the last data movement of the pipeline writes to the output buffer
        let needed = [pre_needed, mid1_needed, mid2_needed, post_needed];
        let last = needed.iter().rposition(|&x| x);
        let target = |step: usize| {
            if Some(step) == last {
                Target::Output
            } else {
                Target::Copy
            }
        };
        let fast_target = if last.is_some() && last != Some(0) {
            Target::Copy
        } else {
            Target::Output
        };

        let pairs = [(&input, &fast), (&fast, &mid), (&mid, &slow), (&slow, &output)];
        let mut stages = Vec::with_capacity(4);
        for (step, (from, to)) in pairs.iter().enumerate() {
            stages.push(if needed[step] {
                Some(RemapStage {
                    descriptor: engine.build_descriptor(from, to)?,
                    target: target(step),
                })
            } else {
                None
            });
        }
        let mut stages = stages.into_iter();
        let (pre, mid1, mid2, post) = (
            stages.next().flatten(),
            stages.next().flatten(),
            stages.next().flatten(),
            stages.next().flatten(),
        );

        // Layouts which may occupy the copy buffer
        let mut copy_len = 0;
        for (stage, layout) in [(&pre, &fast), (&mid1, &mid), (&mid2, &slow)] {
            if let Some(RemapStage {
                target: Target::Copy,
                ..
            }) = stage
            {
                copy_len = copy_len.max(layout.volume());
            }
        }
        if pre.is_none() && fast_target == Target::Copy {
            copy_len = copy_len.max(fast.volume());
        }

        let scratch_len = [&pre, &mid1, &mid2, &post]
            .iter()
            .filter_map(|stage| stage.as_ref())
            .map(|stage| R::scratch_len(&stage.descriptor))
            .max()
            .unwrap_or(0);

        let layouts = [fast, mid, slow];
        let staging_len = match B::LAYOUT {
            ComplexLayout::Interleaved => 0,
            ComplexLayout::Planar => 2 * layouts.iter().map(|l| l.volume()).max().unwrap_or(0),
        };

        let axes = [
            axis_transform::<T, B>(&grid, &layouts[0], 0)?,
            axis_transform::<T, B>(&grid, &layouts[1], 1)?,
            axis_transform::<T, B>(&grid, &layouts[2], 2)?,
        ];

        let norm = T::from_usize(grid.size())
            .map(|n| T::one() / n)
            .ok_or_else(|| {
                Fft3dError::Configuration(format!(
                    "grid size {} is not representable as a scalar",
                    grid.size()
                ))
            })?;

        let copy: Vec<Complex<T>> = allocate("copy", copy_len)?;
        let scratch: Vec<Complex<T>> = allocate("scratch", scratch_len)?;
        let staging: Vec<T> = allocate("staging", staging_len)?;

        debug!(
            rank,
            pre = needed[0],
            mid1 = needed[1],
            mid2 = needed[2],
            post = needed[3],
            targets = ?[&pre, &mid1, &mid2, &post].map(|s| s.as_ref().map(|s| s.target)),
            copy_len,
            scratch_len,
            lengths = ?[axes[0].length, axes[1].length, axes[2].length],
            batches = ?[axes[0].batch, axes[1].batch, axes[2].batch],
            "built plan"
        );
        if rank == 0 {
            info!(
                grid = ?grid.n,
                processes = size,
                processor_grid = ?(np1, np2),
                precision = ?T::PRECISION,
                "created distributed 3D FFT plan"
            );
        }

        Ok(Plan {
            grid,
            input,
            output,
            layouts,
            pre,
            mid1,
            mid2,
            post,
            fast_target,
            axes,
            copy,
            scratch,
            staging,
            scaled: config.scaled,
            permit_in_place: config.permit_in_place,
            norm,
            norm_count: output.volume(),
            engine,
        })
    }
}
