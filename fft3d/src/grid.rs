//! # Grid Geometry
//!
//! The global `Nfast x Nmid x Nslow` grid, the rectangular blocks of it owned by each process and
//! the local storage layouts of those blocks.
pub mod helpers;
pub mod types;

mod block;
mod layout;

pub use types::{AxisOrder, Block, Grid, Layout};
