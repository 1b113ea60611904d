//! Data structures describing the global grid and its per-process blocks.

/// Global extents of the logical grid, indexed `[fast, mid, slow]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    /// Number of points along each axis
    pub n: [usize; 3],
}

/// An axis-aligned sub-range of a [`Grid`] owned by a single process.
///
/// Bounds are inclusive and indexed `[fast, mid, slow]`. A block with `hi = lo - 1` along any
/// axis is empty, the owning process holds no elements but still takes part in every collective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Block {
    /// Lowest global index owned along each axis
    pub lo: [i64; 3],

    /// Highest global index owned along each axis
    pub hi: [i64; 3],
}

/// Storage order of a local array, global axes listed from fastest to slowest varying.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AxisOrder(pub [usize; 3]);

/// A block together with the order in which its elements are stored locally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Layout {
    /// Elements owned by this process
    pub block: Block,

    /// Local storage order
    pub order: AxisOrder,
}
