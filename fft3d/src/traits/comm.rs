//! Collective communication interface
use crate::traits::types::{FftScalar, Result};

/// Collective operations over the group of processes sharing a distributed grid.
///
/// Every method is collective: all ranks of the group must call it, in the same order, before
/// any of them returns. Nothing in this crate adds its own barriers, the lockstep protocol of the
/// transform pipeline rests entirely on this contract.
pub trait Communicator {
    /// Rank of the calling process, in `0..size()`.
    fn rank(&self) -> usize;

    /// Number of processes in the group.
    fn size(&self) -> usize;

    /// Gather an equal length record from every rank, concatenated in rank order.
    ///
    /// # Arguments
    /// * `local` - Record contributed by this rank, every rank must pass the same length.
    fn all_gather(&self, local: &[i64]) -> Result<Vec<i64>>;

    /// Maximum of a value over all ranks.
    fn all_reduce_max(&self, local: i64) -> Result<i64> {
        let all = self.all_gather(&[local])?;
        Ok(all.into_iter().max().unwrap_or(local))
    }

    /// Personalised all-to-all exchange of variable length runs of scalars.
    ///
    /// Run `r` of `send` (runs stored back to back in rank order, lengths `send_counts`) is
    /// delivered to rank `r`, the run received from rank `r` is written to `recv` at the offset
    /// given by the prefix sum of `recv_counts`.
    ///
    /// # Arguments
    /// * `send` - Outgoing runs.
    /// * `send_counts` - Number of scalars sent to each rank.
    /// * `recv` - Incoming runs.
    /// * `recv_counts` - Number of scalars received from each rank.
    fn all_to_all_varcount<T: FftScalar>(
        &self,
        send: &[T],
        send_counts: &[usize],
        recv: &mut [T],
        recv_counts: &[usize],
    ) -> Result<()>;
}
