//! Trivial communicator for a group of one.
use crate::comm::check_varcount;
use crate::traits::comm::Communicator;
use crate::traits::types::{Fft3dError, FftScalar, Result};

/// The group consisting of the calling process alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleProcess;

impl Communicator for SingleProcess {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_gather(&self, local: &[i64]) -> Result<Vec<i64>> {
        Ok(local.to_vec())
    }

    fn all_to_all_varcount<T: FftScalar>(
        &self,
        send: &[T],
        send_counts: &[usize],
        recv: &mut [T],
        recv_counts: &[usize],
    ) -> Result<()> {
        check_varcount(1, send, send_counts, recv, recv_counts)?;
        if send_counts[0] != recv_counts[0] {
            return Err(Fft3dError::Communication(format!(
                "sending {} elements to self but expecting {}",
                send_counts[0], recv_counts[0]
            )));
        }

        let n = send_counts[0];
        recv[..n].copy_from_slice(&send[..n]);
        Ok(())
    }
}
