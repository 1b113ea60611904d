//! MPI communicators.
use mpi::{
    datatype::{Partition, PartitionMut},
    topology::SimpleCommunicator,
    traits::{Communicator as MpiCommunicator, CommunicatorCollectives},
    Count,
};

use crate::comm::{check_varcount, displacements};
use crate::traits::comm::Communicator;
use crate::traits::types::{Fft3dError, FftScalar, Result};

fn to_counts(values: &[usize]) -> Result<Vec<Count>> {
    values
        .iter()
        .map(|&x| {
            Count::try_from(x).map_err(|_| {
                Fft3dError::Communication(format!(
                    "{} elements exceed the MPI count range",
                    x
                ))
            })
        })
        .collect()
}

impl Communicator for SimpleCommunicator {
    fn rank(&self) -> usize {
        MpiCommunicator::rank(self) as usize
    }

    fn size(&self) -> usize {
        MpiCommunicator::size(self) as usize
    }

    fn all_gather(&self, local: &[i64]) -> Result<Vec<i64>> {
        let mut result = vec![0i64; local.len() * Communicator::size(self)];
        self.all_gather_into(local, &mut result[..]);
        Ok(result)
    }

    fn all_to_all_varcount<T: FftScalar>(
        &self,
        send: &[T],
        send_counts: &[usize],
        recv: &mut [T],
        recv_counts: &[usize],
    ) -> Result<()> {
        check_varcount(
            Communicator::size(self),
            send,
            send_counts,
            recv,
            recv_counts,
        )?;

        let counts_snd = to_counts(send_counts)?;
        let displs_snd = to_counts(&displacements(send_counts))?;
        let counts_recv = to_counts(recv_counts)?;
        let displs_recv = to_counts(&displacements(recv_counts))?;

        let n_send = send_counts.iter().sum::<usize>();
        let n_recv = recv_counts.iter().sum::<usize>();

        let partition_snd = Partition::new(&send[..n_send], counts_snd, &displs_snd[..]);
        let mut partition_received: PartitionMut<[T], Vec<Count>, &[Count]> =
            PartitionMut::new(&mut recv[..n_recv], counts_recv, &displs_recv[..]);

        self.all_to_all_varcount_into(&partition_snd, &mut partition_received);

        Ok(())
    }
}
