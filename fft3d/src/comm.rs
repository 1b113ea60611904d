//! # Communicators
//!
//! Implementations of [`Communicator`](crate::traits::comm::Communicator) for a single process, for
//! a group of threads within one process, and (behind the `mpi` feature) for MPI communicators.
#[cfg(feature = "mpi")]
mod mpi_comm;
mod single;
mod thread;

pub use single::SingleProcess;
pub use thread::ThreadComm;

use itertools::Itertools;

use crate::traits::types::{Fft3dError, Result};

/// Offset of each run in a buffer holding runs of length `counts` back to back.
pub(crate) fn displacements(counts: &[usize]) -> Vec<usize> {
    counts
        .iter()
        .scan(0, |acc, &x| {
            let tmp = *acc;
            *acc += x;
            Some(tmp)
        })
        .collect_vec()
}

/// Check the arguments of an all-to-all exchange against the group size.
pub(crate) fn check_varcount<T>(
    size: usize,
    send: &[T],
    send_counts: &[usize],
    recv: &[T],
    recv_counts: &[usize],
) -> Result<()> {
    if send_counts.len() != size || recv_counts.len() != size {
        return Err(Fft3dError::Communication(format!(
            "expected {} send and receive counts, found {} and {}",
            size,
            send_counts.len(),
            recv_counts.len()
        )));
    }

    let n_send: usize = send_counts.iter().sum();
    let n_recv: usize = recv_counts.iter().sum();
    if send.len() < n_send || recv.len() < n_recv {
        return Err(Fft3dError::Communication(format!(
            "exchange of {} sent and {} received elements does not fit buffers of {} and {}",
            n_send,
            n_recv,
            send.len(),
            recv.len()
        )));
    }

    Ok(())
}
