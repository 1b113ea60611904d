//? mpirun -n {{NPROCESSES}} --features "mpi"

#[cfg(feature = "mpi")]
mod mpi {
    use fft3d::grid::helpers::bifactor;
    use fft3d::grid::{Block, Grid};
    use fft3d::plan::Decomposition;
    use fft3d::traits::comm::Communicator;
    use fft3d::traits::types::Direction;
    use fft3d::PlanBuilder;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::Communicator as MpiCommunicator;
    use num_complex::Complex64;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    /// Element value at a global index, identical on every rank
    fn value(idx: [i64; 3]) -> Complex64 {
        let mut rng = StdRng::seed_from_u64((idx[0] + 1000 * idx[1] + 1000000 * idx[2]) as u64);
        Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
    }

    fn fill(block: &Block, f: impl Fn([i64; 3]) -> Complex64) -> Vec<Complex64> {
        let mut data = Vec::with_capacity(block.volume());
        for k in block.lo[2]..=block.hi[2] {
            for j in block.lo[1]..=block.hi[1] {
                for i in block.lo[0]..=block.hi[0] {
                    data.push(f([i, j, k]));
                }
            }
        }
        data
    }

    fn test_impulse(comm: &SimpleCommunicator, decomposition: Decomposition) {
        let rank = Communicator::rank(comm);
        let size = Communicator::size(comm);
        let grid = Grid::new([16, 12, 10]).unwrap();

        // Bricks on input, slabs of the slow axis on output
        let (p1, p2) = bifactor(size);
        let input = grid.brick([p1, p2, 1], rank);
        let output = grid.brick([1, 1, size], rank);

        let mut plan = PlanBuilder::<f64>::new()
            .grid(grid.n)
            .input(input)
            .output(output)
            .decomposition(decomposition)
            .build(comm.duplicate())
            .unwrap();

        let impulse = fill(&input, |idx| {
            if idx == [0, 0, 0] {
                Complex64::new(1.0, 0.0)
            } else {
                Complex64::default()
            }
        });
        let mut spectrum = vec![Complex64::default(); output.volume()];
        plan.execute(&impulse, &mut spectrum, Direction::Forward)
            .unwrap();

        for z in spectrum.iter() {
            assert!((z - Complex64::new(1.0, 0.0)).norm() < 1e-12);
        }

        if rank == 0 {
            println!("...test_impulse_{:?} passed", decomposition)
        }
    }

    fn test_round_trip(comm: &SimpleCommunicator) {
        let rank = Communicator::rank(comm);
        let size = Communicator::size(comm);
        let grid = Grid::new([9, 14, 11]).unwrap();

        let input = grid.brick([size, 1, 1], rank);
        let output = grid.brick([1, size, 1], rank);

        let mut forward = PlanBuilder::<f64>::new()
            .grid(grid.n)
            .input(input)
            .output(output)
            .build(comm.duplicate())
            .unwrap();

        let mut inverse = PlanBuilder::<f64>::new()
            .grid(grid.n)
            .input(output)
            .output(input)
            .build(comm.duplicate())
            .unwrap();

        let data = fill(&input, value);
        let mut spectrum = vec![Complex64::default(); output.volume()];
        let mut back = vec![Complex64::default(); input.volume()];

        forward
            .execute(&data, &mut spectrum, Direction::Forward)
            .unwrap();
        inverse
            .execute(&spectrum, &mut back, Direction::Inverse)
            .unwrap();

        for (a, b) in back.iter().zip(data.iter()) {
            assert!((a - b).norm() < 1e-12);
        }

        if rank == 0 {
            println!("...test_round_trip passed")
        }
    }

    pub fn main() {
        // Setup MPI
        let universe = mpi::initialize().unwrap();
        let world = universe.world();
        let comm = world.duplicate();

        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();

        test_impulse(&comm, Decomposition::Pencil);
        test_impulse(&comm, Decomposition::Slab);
        test_round_trip(&comm);
    }
}

#[cfg(feature = "mpi")]
use mpi::main;

#[cfg(not(feature = "mpi"))]
fn main() {}
