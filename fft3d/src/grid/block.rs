//! Constructors and set operations for grids and blocks.
use crate::grid::helpers::split;
use crate::grid::types::{Block, Grid};
use crate::traits::types::{Fft3dError, Result};

impl Grid {
    /// Constructor for a grid, every extent must be positive.
    ///
    /// # Arguments
    /// * `n` - Number of points along the fast, mid and slow axes.
    pub fn new(n: [usize; 3]) -> Result<Self> {
        if n.iter().any(|&x| x == 0) {
            return Err(Fft3dError::Configuration(format!(
                "grid extents must be positive, found {:?}",
                n
            )));
        }

        let total = n.iter().try_fold(1usize, |acc, &x| acc.checked_mul(x));
        if n.iter().any(|&x| x > i64::MAX as usize) || total.is_none() {
            return Err(Fft3dError::Configuration(format!(
                "grid extents {:?} exceed the addressable index range",
                n
            )));
        }

        Ok(Grid { n })
    }

    /// Total number of grid points.
    pub fn size(&self) -> usize {
        self.n.iter().product()
    }

    /// The block covering the whole grid.
    pub fn full(&self) -> Block {
        Block {
            lo: [0, 0, 0],
            hi: [
                self.n[0] as i64 - 1,
                self.n[1] as i64 - 1,
                self.n[2] as i64 - 1,
            ],
        }
    }

    /// Block owned by `rank` in a regular brick decomposition over a `procs[0] x procs[1] x procs[2]`
    /// processor grid, the fast processor index varying fastest. Ranks beyond the processor grid, and
    /// ranks whose share of an axis is empty, receive empty blocks.
    ///
    /// # Arguments
    /// * `procs` - Number of processors along each axis.
    /// * `rank` - Rank of the calling process.
    pub fn brick(&self, procs: [usize; 3], rank: usize) -> Block {
        let n_procs: usize = procs.iter().product();
        if rank >= n_procs {
            return Block::empty();
        }

        let coords = [
            rank % procs[0],
            (rank / procs[0]) % procs[1],
            rank / (procs[0] * procs[1]),
        ];

        let mut lo = [0i64; 3];
        let mut hi = [0i64; 3];
        for axis in 0..3 {
            (lo[axis], hi[axis]) = split(self.n[axis], procs[axis], coords[axis]);
        }

        Block { lo, hi }
    }
}

impl Block {
    /// Constructor from inclusive bounds.
    pub fn new(lo: [i64; 3], hi: [i64; 3]) -> Self {
        Block { lo, hi }
    }

    /// The canonical empty block.
    pub fn empty() -> Self {
        Block {
            lo: [0, 0, 0],
            hi: [-1, -1, -1],
        }
    }

    /// Number of indices owned along `axis`.
    pub fn extent(&self, axis: usize) -> usize {
        let length = self.hi[axis] as i128 - self.lo[axis] as i128 + 1;
        length.clamp(0, usize::MAX as i128) as usize
    }

    /// Number of indices owned along each axis.
    pub fn extents(&self) -> [usize; 3] {
        [self.extent(0), self.extent(1), self.extent(2)]
    }

    /// Number of elements owned.
    pub fn volume(&self) -> usize {
        self.extents().iter().product()
    }

    /// Whether the block owns no elements.
    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.extent(axis) == 0)
    }

    /// Whether the block owns every index of `axis`.
    pub fn spans(&self, grid: &Grid, axis: usize) -> bool {
        self.lo[axis] == 0 && self.hi[axis] == grid.n[axis] as i64 - 1
    }

    /// Intersection with another block, `None` if they do not overlap.
    pub fn intersection(&self, other: &Block) -> Option<Block> {
        let mut lo = [0i64; 3];
        let mut hi = [0i64; 3];
        for axis in 0..3 {
            lo[axis] = self.lo[axis].max(other.lo[axis]);
            hi[axis] = self.hi[axis].min(other.hi[axis]);
            if hi[axis] < lo[axis] {
                return None;
            }
        }
        Some(Block { lo, hi })
    }

    /// Check that the bounds are acceptable for `grid`.
    ///
    /// `hi = lo - 1` marks an empty axis, anything shorter is rejected. A non-empty block must lie
    /// inside the grid. Overlap with the blocks of other processes is not checked here.
    pub fn validate(&self, grid: &Grid) -> Result<()> {
        for axis in 0..3 {
            if (self.hi[axis] as i128) - (self.lo[axis] as i128) + 1 < 0 {
                return Err(Fft3dError::Configuration(format!(
                    "block bounds [{}, {}] along axis {} have negative length",
                    self.lo[axis], self.hi[axis], axis
                )));
            }
        }

        if self.is_empty() {
            return Ok(());
        }

        for axis in 0..3 {
            if self.lo[axis] < 0 || self.hi[axis] >= grid.n[axis] as i64 {
                return Err(Fft3dError::Configuration(format!(
                    "block bounds [{}, {}] along axis {} lie outside the grid extent {}",
                    self.lo[axis], self.hi[axis], axis, grid.n[axis]
                )));
            }
        }

        Ok(())
    }
}
