//! # Remap
//!
//! Redistribution of a distributed 3D array between two sets of per-process layouts. Each rank
//! intersects its source block with the destination blocks of every rank (and its destination
//! block with every source block), packs the overlaps into contiguous runs, and exchanges them in
//! a single all-to-all.
pub mod types;

mod block_remap;
mod pack;

pub use types::{BlockRemap, RemapDescriptor, Transfer};
