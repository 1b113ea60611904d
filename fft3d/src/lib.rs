//! # Distributed 3D Fast Fourier Transform
//!
//! Complex-to-complex FFTs of an `Nfast x Nmid x Nslow` grid partitioned over a group of
//! cooperating processes, each owning an arbitrary rectangular block of the input and, separately,
//! of the output.
//!
//! A transform interleaves batched 1D FFTs along each axis with global redistributions (remaps)
//! so that every 1D pass runs on data which is locally contiguous along the axis transformed.
//! Which remaps are needed, and which of them may write straight into the caller's output buffer,
//! is decided once when a [`Plan`] is built.
//!
//! Notable features of this library are:
//! * Pencil and slab intermediate decompositions, with remaps elided whenever the caller's blocks
//!   already have the right shape.
//! * Interchangeable 1D backends selected statically, `rustfft` by default and FFTW 3 with the
//!   `fftw` feature.
//! * Single and multi-process execution, over MPI with the `mpi` feature or over threads of one
//!   process for testing.
//!
//! ## Example
//!
//! ```rust
//! use fft3d::comm::SingleProcess;
//! use fft3d::grid::Grid;
//! use fft3d::traits::types::Direction;
//! use fft3d::PlanBuilder;
//! use num_complex::Complex64;
//!
//! let grid = Grid::new([4, 4, 4]).unwrap();
//! let mut plan = PlanBuilder::<f64>::new()
//!     .grid(grid.n)
//!     .input(grid.full())
//!     .output(grid.full())
//!     .build(SingleProcess)
//!     .unwrap();
//!
//! let mut input = vec![Complex64::default(); 64];
//! input[0] = Complex64::new(1.0, 0.0);
//! let mut output = vec![Complex64::default(); 64];
//! plan.execute(&input, &mut output, Direction::Forward).unwrap();
//!
//! assert!(output.iter().all(|z| (z - Complex64::new(1.0, 0.0)).norm() < 1e-12));
//! ```
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod backend;
pub mod comm;
pub mod grid;
pub mod plan;
pub mod remap;
pub mod traits;

// Public API
#[doc(inline)]
pub use plan::types::Plan;
#[doc(inline)]
pub use plan::types::PlanBuilder;
#[doc(inline)]
pub use plan::types::Config;
#[doc(inline)]
pub use traits::types::Fft3dError;
