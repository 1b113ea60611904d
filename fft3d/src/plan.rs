//! # Plan
//!
//! A [`Plan`] fixes, for one grid and one partitioning of it, the sequence of remaps and batched
//! 1D transforms making up a distributed 3D FFT. Plans are created with a [`PlanBuilder`] and may
//! be executed any number of times, in either direction.
pub mod types;

mod builder;
mod executor;

pub use types::{
    AxisTransform, Config, Decomposition, OutputOrder, Plan, PlanBuilder, RemapStage, Target,
};

#[cfg(test)]
mod test {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;
    use num_complex::{Complex, Complex32, Complex64};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use crate::backend::NaiveDft;
    use crate::comm::{SingleProcess, ThreadComm};
    use crate::grid::{Block, Grid, Layout};
    use crate::plan::{Config, Decomposition, OutputOrder, PlanBuilder, Target};
    use crate::traits::comm::Communicator;
    use crate::traits::types::{ComplexLayout, Direction, Fft3dError, Precision};

    fn random(n: [usize; 3], seed: u64) -> Vec<Complex64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n.iter().product())
            .map(|_| Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
            .collect()
    }

    /// Global DFT of naturally ordered data, one axis at a time.
    fn reference(n: [usize; 3], data: &[Complex64], direction: Direction) -> Vec<Complex64> {
        let sign = match direction {
            Direction::Forward => -1.0,
            Direction::Inverse => 1.0,
        };
        let strides = [1, n[0], n[0] * n[1]];

        let mut result = data.to_vec();
        for axis in 0..3 {
            let src = result.clone();
            for (idx, value) in result.iter_mut().enumerate() {
                let k = (idx / strides[axis]) % n[axis];
                let base = idx - k * strides[axis];
                *value = (0..n[axis])
                    .map(|j| {
                        let theta = sign * 2.0 * PI * ((j * k) % n[axis]) as f64 / n[axis] as f64;
                        src[base + j * strides[axis]] * Complex64::from_polar(1.0, theta)
                    })
                    .sum();
            }
        }
        result
    }

    /// Local buffer holding `layout` of naturally ordered global data.
    fn extract<T: Copy + Default>(
        n: [usize; 3],
        global: &[Complex<T>],
        layout: &Layout,
    ) -> Vec<Complex<T>> {
        let mut local = vec![Complex::<T>::default(); layout.volume()];
        let b = layout.block;
        for k in b.lo[2]..=b.hi[2] {
            for j in b.lo[1]..=b.hi[1] {
                for i in b.lo[0]..=b.hi[0] {
                    let g = i as usize + n[0] * (j as usize + n[1] * k as usize);
                    local[layout.offset([i, j, k])] = global[g];
                }
            }
        }
        local
    }

    fn assert_close(found: &[Complex64], expected: &[Complex64], epsilon: f64) {
        assert_eq!(found.len(), expected.len());
        for (a, b) in found.iter().zip(expected.iter()) {
            assert_relative_eq!(a.re, b.re, epsilon = epsilon);
            assert_relative_eq!(a.im, b.im, epsilon = epsilon);
        }
    }

    /// Forward transform over `size` threads, returning the output and the expected output of
    /// every rank.
    fn distributed(
        n: [usize; 3],
        size: usize,
        in_procs: [usize; 3],
        out_procs: [usize; 3],
        config: Config,
    ) -> Vec<(Vec<Complex64>, Vec<Complex64>)> {
        let global = random(n, 42);
        let transformed = reference(n, &global, Direction::Forward);

        ThreadComm::run(size, |comm| {
            let rank = comm.rank();
            let grid = Grid::new(n).unwrap();
            let peer = comm.clone();

            let mut plan = PlanBuilder::<f64>::new()
                .grid(n)
                .input(grid.brick(in_procs, rank))
                .output(grid.brick(out_procs, rank))
                .config(config)
                .build(comm)
                .unwrap();

            let input = extract(n, &global, plan.input());
            let mut output = vec![Complex64::default(); plan.output().volume()];
            plan.execute(&input, &mut output, Direction::Forward).unwrap();

            // The inverse recovers the input on every rank
            let mut back = vec![Complex64::default(); input.len()];
            let mut inverse = PlanBuilder::<f64>::new()
                .grid(n)
                .input(grid.brick(out_procs, rank))
                .output(grid.brick(in_procs, rank))
                .build(peer)
                .unwrap();
            if config.output_order == OutputOrder::Natural {
                inverse.execute(&output, &mut back, Direction::Inverse).unwrap();
                assert_close(&back, &input, 1e-12);
            }

            (output, extract(n, &transformed, plan.output()))
        })
    }

    #[test]
    fn test_dc_impulse() {
        let grid = Grid::new([4, 4, 4]).unwrap();
        let mut plan = PlanBuilder::<f64>::new()
            .grid(grid.n)
            .input(grid.full())
            .output(grid.full())
            .scaled(true)
            .build(SingleProcess)
            .unwrap();

        let mut impulse = vec![Complex64::default(); 64];
        impulse[0] = Complex64::new(1.0, 0.0);

        let mut spectrum = vec![Complex64::default(); 64];
        plan.execute(&impulse, &mut spectrum, Direction::Forward)
            .unwrap();
        assert_close(&spectrum, &vec![Complex64::new(1.0, 0.0); 64], 1e-14);

        let mut back = vec![Complex64::default(); 64];
        plan.execute(&spectrum, &mut back, Direction::Inverse)
            .unwrap();
        assert_close(&back, &impulse, 1e-14);

        // One process owning the whole grid never needs a pre-remap
        assert_eq!(plan.remap_stages(), [false, true, true, true]);
        assert_eq!(
            plan.targets(),
            [None, Some(Target::Copy), Some(Target::Copy), Some(Target::Output)]
        );
        assert_eq!(plan.axis(0), (4, 16));
        assert_eq!(plan.axis(2), (4, 16));
        assert_eq!(plan.copy_len(), 64);
        assert_eq!(plan.scratch_len(), 128);
        assert_eq!(plan.norm_count(), 64);
        assert_relative_eq!(plan.norm(), 1.0 / 64.0);
        plan.destroy();
    }

    #[test]
    fn test_round_trip() {
        let n = [5, 6, 7];
        let grid = Grid::new(n).unwrap();
        let data = random(n, 0);

        let mut plan = PlanBuilder::<f64>::new()
            .grid(n)
            .input(grid.full())
            .output(grid.full())
            .build(SingleProcess)
            .unwrap();

        let mut spectrum = vec![Complex64::default(); data.len()];
        let mut back = vec![Complex64::default(); data.len()];
        plan.execute(&data, &mut spectrum, Direction::Forward)
            .unwrap();
        assert_close(&spectrum, &reference(n, &data, Direction::Forward), 1e-10);

        plan.execute(&spectrum, &mut back, Direction::Inverse)
            .unwrap();
        assert_close(&back, &data, 1e-12);

        // Executions are independent of each other
        plan.execute(&data, &mut spectrum, Direction::Forward)
            .unwrap();
        assert_close(&spectrum, &reference(n, &data, Direction::Forward), 1e-10);
    }

    #[test]
    fn test_tiling_invariance() {
        let n = [6, 5, 4];
        let cases = [
            (2, [2, 1, 1], [1, 1, 2]),
            (3, [1, 3, 1], [3, 1, 1]),
            (4, [2, 2, 1], [1, 2, 2]),
            (4, [1, 1, 4], [4, 1, 1]),
        ];

        for (size, in_procs, out_procs) in cases {
            for (found, expected) in distributed(n, size, in_procs, out_procs, Config::default()) {
                assert_close(&found, &expected, 1e-10);
            }
        }
    }

    #[test]
    fn test_slab_decomposition() {
        let config = Config {
            decomposition: Decomposition::Slab,
            ..Config::default()
        };

        for (found, expected) in distributed([4, 6, 8], 4, [2, 2, 1], [1, 1, 4], config) {
            assert_close(&found, &expected, 1e-10);
        }
    }

    #[test]
    fn test_empty_blocks() {
        // Rank 2 owns no input, rank 0 no output, and the unit mid axis leaves pencils empty
        let n = [3, 1, 4];
        let global = random(n, 7);
        let transformed = reference(n, &global, Direction::Forward);

        let results = ThreadComm::run(3, |comm| {
            let rank = comm.rank();
            let grid = Grid::new(n).unwrap();
            let input = grid.brick([1, 1, 2], rank);
            let output = match rank {
                0 => Block::empty(),
                r => grid.brick([2, 1, 1], r - 1),
            };

            let mut plan = PlanBuilder::<f64>::new()
                .grid(n)
                .input(input)
                .output(output)
                .build(comm)
                .unwrap();

            let local = extract(n, &global, plan.input());
            let mut result = vec![Complex64::default(); plan.output().volume()];
            plan.execute(&local, &mut result, Direction::Forward)
                .unwrap();
            (result, extract(n, &transformed, plan.output()))
        });

        assert!(results[0].0.is_empty());
        for (found, expected) in results {
            assert_close(&found, &expected, 1e-12);
        }
    }

    #[test]
    fn test_in_place_matches_out_of_place() {
        let n = [4, 6, 5];
        let global = random(n, 3);

        ThreadComm::run(2, |comm| {
            let grid = Grid::new(n).unwrap();
            // Blocks spanning the fast axis need no pre-remap
            let block = grid.brick([1, 2, 1], comm.rank());
            let mut plan = PlanBuilder::<f64>::new()
                .grid(n)
                .input(block)
                .output(block)
                .build(comm)
                .unwrap();
            assert!(!plan.remap_stages()[0]);

            let input = extract(n, &global, plan.input());
            for direction in [Direction::Forward, Direction::Inverse] {
                let mut separate = vec![Complex64::default(); input.len()];
                plan.execute(&input, &mut separate, direction).unwrap();

                let mut data = input.clone();
                plan.execute_in_place(&mut data, direction).unwrap();
                assert_eq!(data, separate);
            }
        });
    }

    #[test]
    fn test_in_place_rejected() {
        let n = [4, 4, 4];

        let results = ThreadComm::run(2, |comm| {
            let grid = Grid::new(n).unwrap();
            let block = grid.brick([2, 1, 1], comm.rank());
            let mut plan = PlanBuilder::<f64>::new()
                .grid(n)
                .input(block)
                .output(block)
                .build(comm)
                .unwrap();

            let mut data = vec![Complex64::default(); block.volume()];
            plan.execute_in_place(&mut data, Direction::Forward)
        });

        for result in results {
            assert!(matches!(result, Err(Fft3dError::InPlaceNotPermitted(_))));
        }

        let grid = Grid::new(n).unwrap();
        let mut plan = PlanBuilder::<f64>::new()
            .grid(n)
            .input(grid.full())
            .output(grid.full())
            .permit_in_place(false)
            .build(SingleProcess)
            .unwrap();
        let mut data = vec![Complex64::default(); 64];
        assert!(matches!(
            plan.execute_in_place(&mut data, Direction::Forward),
            Err(Fft3dError::InPlaceNotPermitted(_))
        ));
    }

    #[test]
    fn test_scaling_gating() {
        let n = [4, 3, 5];
        let grid = Grid::new(n).unwrap();
        let data = random(n, 11);

        let build = |scaled| {
            PlanBuilder::<f64>::new()
                .grid(n)
                .input(grid.full())
                .output(grid.full())
                .scaled(scaled)
                .build(SingleProcess)
                .unwrap()
        };
        let mut scaled = build(true);
        let mut unscaled = build(false);
        assert!(scaled.is_scaled());
        assert!(!unscaled.is_scaled());

        let mut a = vec![Complex64::default(); data.len()];
        let mut b = vec![Complex64::default(); data.len()];

        // Forward transforms are never scaled
        scaled.execute(&data, &mut a, Direction::Forward).unwrap();
        unscaled.execute(&data, &mut b, Direction::Forward).unwrap();
        assert_eq!(a, b);

        scaled.execute(&data, &mut a, Direction::Inverse).unwrap();
        unscaled.execute(&data, &mut b, Direction::Inverse).unwrap();
        let norm = scaled.norm();
        assert!(a.iter().zip(b.iter()).all(|(x, y)| *x == y.scale(norm)));
        assert_close(&b, &reference(n, &data, Direction::Inverse), 1e-10);
    }

    #[test]
    fn test_output_orders() {
        let n = [4, 5, 6];

        for order in [OutputOrder::MidFirst, OutputOrder::SlowFirst] {
            let config = Config {
                output_order: order,
                ..Config::default()
            };
            for (found, expected) in distributed(n, 2, [1, 2, 1], [2, 1, 1], config) {
                assert_close(&found, &expected, 1e-10);
            }
        }

        // Output spanning the slow axis in slow-first order is written by the slow pass
        let stages = ThreadComm::run(2, |comm| {
            let grid = Grid::new(n).unwrap();
            let plan = PlanBuilder::<f64>::new()
                .grid(n)
                .input(grid.brick([1, 2, 1], comm.rank()))
                .output(grid.brick([2, 1, 1], comm.rank()))
                .output_order(OutputOrder::SlowFirst)
                .build(comm)
                .unwrap();
            (plan.remap_stages(), plan.targets())
        });
        for (stages, targets) in stages {
            assert!(!stages[3]);
            assert_eq!(targets[2], Some(Target::Output));
        }
    }

    #[test]
    fn test_all_remaps_elided() {
        let n = [1, 1, 8];
        let grid = Grid::new(n).unwrap();
        let data = random(n, 5);

        let mut plan = PlanBuilder::<f64>::new()
            .grid(n)
            .input(grid.full())
            .output(grid.full())
            .build(SingleProcess)
            .unwrap();
        assert_eq!(plan.remap_stages(), [false; 4]);
        assert_eq!(plan.copy_len(), 0);
        assert_eq!(plan.scratch_len(), 0);

        let mut result = vec![Complex64::default(); 8];
        plan.execute(&data, &mut result, Direction::Forward)
            .unwrap();
        assert_close(&result, &reference(n, &data, Direction::Forward), 1e-12);

        let mut in_place = data.clone();
        plan.execute_in_place(&mut in_place, Direction::Forward)
            .unwrap();
        assert_eq!(in_place, result);

        let mut local = data.clone();
        plan.execute_local_only(&mut local, Direction::Forward)
            .unwrap();
        assert_eq!(local, result);
    }

    #[test]
    fn test_single_precision() {
        let n = [8, 4, 4];
        let grid = Grid::new(n).unwrap();
        let data: Vec<Complex32> = random(n, 1)
            .iter()
            .map(|z| Complex32::new(z.re as f32, z.im as f32))
            .collect();

        let mut plan = PlanBuilder::<f32>::new()
            .grid(n)
            .input(grid.full())
            .output(grid.full())
            .build(SingleProcess)
            .unwrap();
        assert_eq!(plan.precision(), Precision::Single);

        let mut spectrum = vec![Complex32::default(); data.len()];
        let mut back = vec![Complex32::default(); data.len()];
        plan.execute(&data, &mut spectrum, Direction::Forward)
            .unwrap();
        plan.execute(&spectrum, &mut back, Direction::Inverse)
            .unwrap();

        for (a, b) in back.iter().zip(data.iter()) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-5);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_planar_backend() {
        let n = [3, 4, 5];
        let global = random(n, 9);
        let transformed = reference(n, &global, Direction::Forward);

        let results = ThreadComm::run(2, |comm| {
            let grid = Grid::new(n).unwrap();
            let mut plan = PlanBuilder::<f64>::new()
                .backend::<NaiveDft>()
                .grid(n)
                .input(grid.brick([1, 1, 2], comm.rank()))
                .output(grid.brick([1, 2, 1], comm.rank()))
                .build(comm)
                .unwrap();
            assert_eq!(plan.layout(), ComplexLayout::Planar);

            let input = extract(n, &global, plan.input());
            let mut output = vec![Complex64::default(); plan.output().volume()];
            plan.execute(&input, &mut output, Direction::Forward)
                .unwrap();
            (output, extract(n, &transformed, plan.output()))
        });

        for (found, expected) in results {
            assert_close(&found, &expected, 1e-10);
        }
    }

    #[test]
    fn test_configuration_errors() {
        let build = |n: [usize; 3], input: Block, output: Block| {
            PlanBuilder::<f64>::new()
                .grid(n)
                .input(input)
                .output(output)
                .build(SingleProcess)
        };
        let full = Block::new([0, 0, 0], [3, 3, 3]);

        assert!(matches!(
            build([4, 0, 4], full, full),
            Err(Fft3dError::Configuration(_))
        ));
        assert!(matches!(
            build([4, 4, 4], Block::new([0, 0, 0], [4, 3, 3]), full),
            Err(Fft3dError::Configuration(_))
        ));
        assert!(matches!(
            build([4, 4, 4], full, Block::new([2, 0, 0], [0, 3, 3])),
            Err(Fft3dError::Configuration(_))
        ));
        assert!(matches!(
            PlanBuilder::<f64>::new().input(full).output(full).build(SingleProcess),
            Err(Fft3dError::Configuration(_))
        ));

        // Bounds at the edge of the index range are rejected rather than overflowing
        assert!(matches!(
            build([4, 4, 4], Block::new([1, 0, 0], [i64::MIN, 3, 3]), full),
            Err(Fft3dError::Configuration(_))
        ));
        assert!(matches!(
            build([4, 4, 4], full, Block::new([i64::MIN, 0, 0], [i64::MAX, 3, 3])),
            Err(Fft3dError::Configuration(_))
        ));
        assert!(matches!(
            build([1 << 40, 1 << 40, 1 << 40], full, full),
            Err(Fft3dError::Configuration(_))
        ));

        // A bad block on one rank fails the build on every rank
        let results = ThreadComm::run(2, |comm| {
            let input = if comm.rank() == 1 {
                Block::new([0, 0, 0], [9, 9, 9])
            } else {
                full
            };
            PlanBuilder::<f64>::new()
                .grid([4, 4, 4])
                .input(input)
                .output(full)
                .build(comm)
                .is_err()
        });
        assert_eq!(results, vec![true, true]);
    }

    #[test]
    fn test_buffer_too_small() {
        let grid = Grid::new([4, 4, 4]).unwrap();
        let mut plan = PlanBuilder::<f64>::new()
            .grid(grid.n)
            .input(grid.full())
            .output(grid.full())
            .build(SingleProcess)
            .unwrap();

        let input = vec![Complex64::default(); 63];
        let mut output = vec![Complex64::default(); 64];
        assert!(matches!(
            plan.execute(&input, &mut output, Direction::Forward),
            Err(Fft3dError::BufferTooSmall { required: 64, .. })
        ));
    }
}
