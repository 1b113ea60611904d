//! Local storage layouts of blocks.
use itertools::Itertools;

use crate::grid::types::{AxisOrder, Block, Layout};

impl AxisOrder {
    /// Fast axis varies fastest, the natural order of input and output data.
    pub const FAST_FIRST: AxisOrder = AxisOrder([0, 1, 2]);

    /// Mid axis varies fastest, followed by the slow and then the fast axis.
    pub const MID_FIRST: AxisOrder = AxisOrder([1, 2, 0]);

    /// Slow axis varies fastest, followed by the fast and then the mid axis.
    pub const SLOW_FIRST: AxisOrder = AxisOrder([2, 0, 1]);
}

impl Layout {
    /// Constructor.
    pub fn new(block: Block, order: AxisOrder) -> Self {
        Layout { block, order }
    }

    /// Number of elements stored locally.
    pub fn volume(&self) -> usize {
        self.block.volume()
    }

    /// Local stride of each global axis, indexed `[fast, mid, slow]`.
    pub fn strides(&self) -> [usize; 3] {
        let mut strides = [0usize; 3];
        let mut stride = 1;
        for &axis in self.order.0.iter() {
            strides[axis] = stride;
            stride *= self.block.extent(axis);
        }
        strides
    }

    /// Local offset of the element with global index `idx`, which must lie inside the block.
    pub fn offset(&self, idx: [i64; 3]) -> usize {
        let strides = self.strides();
        (0..3)
            .map(|axis| (idx[axis] - self.block.lo[axis]) as usize * strides[axis])
            .sum()
    }

    /// Whether both layouts store the same global elements at the same local offsets.
    ///
    /// Axes of extent one do not affect the arrangement, so storage orders only need to agree
    /// once those are removed.
    pub fn same_arrangement(&self, other: &Layout) -> bool {
        match (self.block.is_empty(), other.block.is_empty()) {
            (true, true) => return true,
            (true, false) | (false, true) => return false,
            (false, false) => {}
        }

        if self.block != other.block {
            return false;
        }

        let significant = |layout: &Layout| {
            layout
                .order
                .0
                .iter()
                .copied()
                .filter(|&axis| layout.block.extent(axis) > 1)
                .collect_vec()
        };

        significant(self) == significant(other)
    }
}

#[cfg(test)]
mod test {
    use crate::grid::types::{AxisOrder, Block, Layout};

    #[test]
    fn test_strides_and_offsets() {
        let block = Block::new([1, 2, 3], [4, 3, 5]);

        let natural = Layout::new(block, AxisOrder::FAST_FIRST);
        assert_eq!(natural.strides(), [1, 4, 8]);
        assert_eq!(natural.offset([1, 2, 3]), 0);
        assert_eq!(natural.offset([2, 3, 4]), 1 + 4 + 8);

        let mid = Layout::new(block, AxisOrder::MID_FIRST);
        assert_eq!(mid.strides(), [6, 1, 2]);
        assert_eq!(mid.offset([4, 3, 5]), 23);

        let slow = Layout::new(block, AxisOrder::SLOW_FIRST);
        assert_eq!(slow.strides(), [3, 12, 1]);
        assert_eq!(slow.offset([2, 2, 4]), 3 + 1);
    }

    #[test]
    fn test_same_arrangement() {
        let block = Block::new([0, 0, 0], [3, 3, 3]);
        let natural = Layout::new(block, AxisOrder::FAST_FIRST);
        let slow = Layout::new(block, AxisOrder::SLOW_FIRST);
        assert!(natural.same_arrangement(&natural));
        assert!(!natural.same_arrangement(&slow));

        // Only the slow axis has extent > 1, every order stores it identically
        let pencil = Block::new([2, 1, 0], [2, 1, 7]);
        assert!(Layout::new(pencil, AxisOrder::FAST_FIRST)
            .same_arrangement(&Layout::new(pencil, AxisOrder::SLOW_FIRST)));

        // Differing blocks
        let other = Layout::new(Block::new([0, 0, 0], [3, 3, 1]), AxisOrder::FAST_FIRST);
        assert!(!natural.same_arrangement(&other));

        // Empty blocks hold nothing to rearrange
        let empty_a = Layout::new(Block::empty(), AxisOrder::FAST_FIRST);
        let empty_b = Layout::new(Block::new([3, 0, 0], [2, 3, 3]), AxisOrder::MID_FIRST);
        assert!(empty_a.same_arrangement(&empty_b));
        assert!(!empty_a.same_arrangement(&natural));
    }
}
