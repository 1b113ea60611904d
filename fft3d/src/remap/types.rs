//! Data structures describing a remap.
use crate::grid::{AxisOrder, Block, Layout};

/// A block of elements exchanged with one peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    /// Peer rank
    pub rank: usize,

    /// Global indices exchanged, the intersection of the two blocks involved
    pub overlap: Block,

    /// Order in which the overlap is serialised, the storage order of the receiving layout
    pub order: AxisOrder,
}

impl Transfer {
    /// Number of elements exchanged.
    pub fn volume(&self) -> usize {
        self.overlap.volume()
    }
}

/// Precomputed communication pattern of a remap, as seen by the calling rank.
#[derive(Clone, Debug)]
pub struct RemapDescriptor {
    /// Layout the data is read from
    pub from: Layout,

    /// Layout the data is written to
    pub to: Layout,

    /// Blocks sent, in ascending peer rank, non-empty only
    pub sends: Vec<Transfer>,

    /// Blocks received, in ascending peer rank, non-empty only
    pub recvs: Vec<Transfer>,

    /// Complex elements sent to each rank
    pub send_counts: Vec<usize>,

    /// Complex elements received from each rank
    pub recv_counts: Vec<usize>,
}

impl RemapDescriptor {
    /// Total complex elements sent.
    pub fn send_len(&self) -> usize {
        self.send_counts.iter().sum()
    }

    /// Total complex elements received.
    pub fn recv_len(&self) -> usize {
        self.recv_counts.iter().sum()
    }
}

/// Remap engine exchanging intersections of rectangular blocks over a communicator.
#[derive(Clone, Debug)]
pub struct BlockRemap<C> {
    pub(crate) comm: C,
}

impl<C> BlockRemap<C> {
    /// Constructor.
    pub fn new(comm: C) -> Self {
        BlockRemap { comm }
    }
}
