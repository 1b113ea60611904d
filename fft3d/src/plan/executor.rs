//! Execution of plans.
use num_complex::Complex;
use tracing::{trace, trace_span};

use crate::backend::layout::{deinterleave, interleave};
use crate::grid::{Grid, Layout};
use crate::plan::types::{AxisTransform, Plan, RemapStage, Target};
use crate::traits::comm::Communicator;
use crate::traits::fft::Local1dTransform;
use crate::traits::remap::RemapEngine;
use crate::traits::types::{
    ComplexLayout, Direction, Fft3dError, FftScalar, Precision, Result,
};

/// Run one batched 1D pass over the front of `data`.
fn transform<T, B>(
    axis: &mut AxisTransform<B::Handle>,
    direction: Direction,
    data: &mut [Complex<T>],
    staging: &mut [T],
) -> Result<()>
where
    T: FftScalar,
    B: Local1dTransform<T>,
{
    let n = axis.length * axis.batch;
    if n == 0 {
        return Ok(());
    }

    let handle = match direction {
        Direction::Forward => axis.forward.as_mut(),
        Direction::Inverse => axis.inverse.as_mut(),
    }
    .ok_or_else(|| Fft3dError::Backend(format!("no {:?} handle prepared", direction)))?;

    match B::LAYOUT {
        ComplexLayout::Interleaved => {
            B::run(handle, bytemuck::cast_slice_mut::<Complex<T>, T>(&mut data[..n]))
        }
        ComplexLayout::Planar => {
            let planar = &mut staging[..2 * n];
            deinterleave(&data[..n], planar);
            B::run(handle, planar)?;
            interleave(planar, &mut data[..n]);
            Ok(())
        }
    }
}

/// Move the data held in `from` into the target of `stage`.
fn remap<T, R>(
    engine: &R,
    stage: &RemapStage<R::Descriptor>,
    from: Target,
    copy: &mut [Complex<T>],
    output: &mut [Complex<T>],
    scratch: &mut [Complex<T>],
) -> Result<Target>
where
    T: FftScalar,
    R: RemapEngine,
{
    let src: &[Complex<T>] = match from {
        Target::Copy => &*copy,
        Target::Output => &*output,
    };
    engine.exchange(&stage.descriptor, src, scratch)?;

    let dst = match stage.target {
        Target::Copy => copy,
        Target::Output => output,
    };
    engine.unpack(&stage.descriptor, scratch, dst);

    Ok(stage.target)
}

impl<T, B, R> Plan<T, B, R>
where
    T: FftScalar,
    B: Local1dTransform<T>,
    R: RemapEngine,
{
    /// Out of place transform of `input` into `output`. Collective.
    ///
    /// # Arguments
    /// * `input` - Local input block, fast axis varying fastest. Not modified.
    /// * `output` - Local output block, in the configured output order.
    /// * `direction` - Transform direction.
    pub fn execute(
        &mut self,
        input: &[Complex<T>],
        output: &mut [Complex<T>],
        direction: Direction,
    ) -> Result<()> {
        check_len("input", input.len(), self.input.volume())?;
        check_len("output", output.len(), self.output.volume())?;

        let _span = trace_span!("fft3d", ?direction).entered();

        let location = match &self.pre {
            Some(stage) => {
                self.engine
                    .exchange(&stage.descriptor, input, &mut self.scratch)?;
                let dst = match stage.target {
                    Target::Copy => &mut self.copy[..],
                    Target::Output => &mut output[..],
                };
                self.engine.unpack(&stage.descriptor, &self.scratch, dst);
                stage.target
            }
            None => {
                let n = self.layouts[0].volume();
                let dst = match self.fast_target {
                    Target::Copy => &mut self.copy[..],
                    Target::Output => &mut output[..],
                };
                dst[..n].copy_from_slice(&input[..n]);
                self.fast_target
            }
        };

        self.pipeline(location, output, direction)
    }

    /// In place transform of `data`, holding the input block on entry and the output block on
    /// return. Collective.
    ///
    /// Requires a plan built with in-place execution permitted whose input needs no pre-remap.
    /// `data` must hold the larger of the input and output blocks.
    pub fn execute_in_place(
        &mut self,
        data: &mut [Complex<T>],
        direction: Direction,
    ) -> Result<()> {
        if !self.permit_in_place {
            return Err(Fft3dError::InPlaceNotPermitted(
                "plan was built without permit_in_place".to_string(),
            ));
        }
        if self.pre.is_some() {
            return Err(Fft3dError::InPlaceNotPermitted(
                "input blocks require a pre-remap".to_string(),
            ));
        }
        check_len(
            "in-place",
            data.len(),
            self.input.volume().max(self.output.volume()),
        )?;

        let _span = trace_span!("fft3d_in_place", ?direction).entered();
        self.pipeline(Target::Output, data, direction)
    }

    /// Run the three batched 1D passes on `data` without moving it between processes, then apply
    /// the scaling rule. Local, only useful for timing the transform kernels.
    pub fn execute_local_only(
        &mut self,
        data: &mut [Complex<T>],
        direction: Direction,
    ) -> Result<()> {
        let required = self.layouts.iter().map(|l| l.volume()).max().unwrap_or(0);
        check_len("data", data.len(), required.max(self.norm_count))?;

        for axis in self.axes.iter_mut() {
            transform::<T, B>(axis, direction, data, &mut self.staging)?;
        }
        self.scale(data, direction);
        Ok(())
    }

    /// Release the plan, its buffers and its backend handles.
    pub fn destroy(self) {
        trace!(rank = self.engine.comm().rank(), "destroying plan");
    }

    /// Stages two to eight, starting with the data in `location` laid out for the fast pass.
    fn pipeline(
        &mut self,
        mut location: Target,
        output: &mut [Complex<T>],
        direction: Direction,
    ) -> Result<()> {
        let stages = [&self.mid1, &self.mid2];

        for (step, axis) in self.axes.iter_mut().enumerate() {
            if step > 0 {
                if let Some(stage) = stages[step - 1] {
                    location = remap(
                        &self.engine,
                        stage,
                        location,
                        &mut self.copy,
                        output,
                        &mut self.scratch,
                    )?;
                }
            }

            let data = match location {
                Target::Copy => &mut self.copy[..],
                Target::Output => &mut output[..],
            };
            let _span = trace_span!("fft_1d", axis = step, batch = axis.batch).entered();
            transform::<T, B>(axis, direction, data, &mut self.staging)?;
        }

        if let Some(stage) = &self.post {
            location = remap(
                &self.engine,
                stage,
                location,
                &mut self.copy,
                output,
                &mut self.scratch,
            )?;
        }

        debug_assert_eq!(location, Target::Output);
        self.scale(output, direction);
        Ok(())
    }

    fn scale(&self, data: &mut [Complex<T>], direction: Direction) {
        if self.scaled && direction == Direction::Inverse {
            let norm = self.norm;
            for value in data[..self.norm_count].iter_mut() {
                *value = value.scale(norm);
            }
        }
    }

    /// Global grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Layout of the local input block.
    pub fn input(&self) -> &Layout {
        &self.input
    }

    /// Layout of the local output block.
    pub fn output(&self) -> &Layout {
        &self.output
    }

    /// Fast, mid and slow axis contiguous layouts the passes run on.
    pub fn layouts(&self) -> &[Layout; 3] {
        &self.layouts
    }

    /// Precision of the grid elements.
    pub fn precision(&self) -> Precision {
        T::PRECISION
    }

    /// Complex storage expected by the backend.
    pub fn layout(&self) -> ComplexLayout {
        B::LAYOUT
    }

    /// Whether inverse transforms are normalised.
    pub fn is_scaled(&self) -> bool {
        self.scaled
    }

    /// Whether in-place execution was permitted at build time.
    pub fn permits_in_place(&self) -> bool {
        self.permit_in_place
    }

    /// Normalisation factor `1/(Nfast*Nmid*Nslow)`.
    pub fn norm(&self) -> T {
        self.norm
    }

    /// Number of local elements scaled, the volume of the output block.
    pub fn norm_count(&self) -> usize {
        self.norm_count
    }

    /// Which of the pre, mid1, mid2 and post remaps are performed.
    pub fn remap_stages(&self) -> [bool; 4] {
        self.targets().map(|t| t.is_some())
    }

    /// Destination buffer of the pre, mid1, mid2 and post remaps, `None` for elided steps.
    pub fn targets(&self) -> [Option<Target>; 4] {
        [&self.pre, &self.mid1, &self.mid2, &self.post].map(|s| s.as_ref().map(|s| s.target))
    }

    /// Transform length and local batch count of the fast (0), mid (1) or slow (2) pass.
    pub fn axis(&self, i: usize) -> (usize, usize) {
        (self.axes[i].length, self.axes[i].batch)
    }

    /// Length of the plan owned copy buffer.
    pub fn copy_len(&self) -> usize {
        self.copy.len()
    }

    /// Length of the plan owned remap scratch buffer.
    pub fn scratch_len(&self) -> usize {
        self.scratch.len()
    }

    /// Remap engine executing the data movement.
    pub fn engine(&self) -> &R {
        &self.engine
    }
}

fn check_len(name: &'static str, len: usize, required: usize) -> Result<()> {
    if len < required {
        return Err(Fft3dError::BufferTooSmall {
            name,
            len,
            required,
        });
    }
    Ok(())
}
