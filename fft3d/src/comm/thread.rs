//! Communicator connecting a group of threads of the same process.
//!
//! Every collective is a write to shared mailboxes followed by a barrier, a read, and a second
//! barrier so that no rank overwrites a mailbox another rank has yet to read.
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use crate::comm::{check_varcount, displacements};
use crate::traits::comm::Communicator;
use crate::traits::types::{Fft3dError, FftScalar, Result};

struct Shared {
    size: usize,
    barrier: Barrier,
    /// `size * size` byte buffers, slot `src * size + dst` carries data from `src` to `dst`
    mailboxes: Mutex<Vec<Vec<u8>>>,
}

/// Handle of one rank in a group of cooperating threads.
///
/// Handles are created together by [`ThreadComm::group`] and each must be moved to its own thread,
/// collectives block until every rank of the group has entered them.
///
/// # Example usage
///
/// ```rust
/// use fft3d::comm::ThreadComm;
/// use fft3d::traits::comm::Communicator;
///
/// let gathered = ThreadComm::run(3, |comm| comm.all_gather(&[comm.rank() as i64]).unwrap());
/// assert!(gathered.iter().all(|g| g == &vec![0, 1, 2]));
/// ```
#[derive(Clone)]
pub struct ThreadComm {
    rank: usize,
    shared: Arc<Shared>,
}

impl ThreadComm {
    /// Create the handles of a group of `size` ranks, in rank order.
    pub fn group(size: usize) -> Vec<ThreadComm> {
        let size = size.max(1);
        let shared = Arc::new(Shared {
            size,
            barrier: Barrier::new(size),
            mailboxes: Mutex::new(vec![Vec::new(); size * size]),
        });

        (0..size)
            .map(|rank| ThreadComm {
                rank,
                shared: Arc::clone(&shared),
            })
            .collect()
    }

    /// Run `f` on `size` scoped threads, one per rank, and collect the results in rank order.
    pub fn run<F, R>(size: usize, f: F) -> Vec<R>
    where
        F: Fn(ThreadComm) -> R + Sync,
        R: Send,
    {
        let f = &f;
        thread::scope(|s| {
            let handles: Vec<_> = ThreadComm::group(size)
                .into_iter()
                .map(|comm| s.spawn(move || f(comm)))
                .collect();

            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(result) => result,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }

    fn with_mailboxes<R>(&self, f: impl FnOnce(&mut Vec<Vec<u8>>) -> R) -> Result<R> {
        let mut guard = self
            .shared
            .mailboxes
            .lock()
            .map_err(|_| Fft3dError::Communication("a peer thread panicked".to_string()))?;
        Ok(f(&mut guard))
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn all_gather(&self, local: &[i64]) -> Result<Vec<i64>> {
        let size = self.size();
        let bytes = bytemuck::cast_slice::<i64, u8>(local).to_vec();
        // A rank that fails to post still joins both barriers so its peers are not left waiting
        let posted = self.with_mailboxes(|boxes| boxes[self.rank * size + self.rank] = bytes);
        self.shared.barrier.wait();

        let result = posted.and_then(|_| {
            self.with_mailboxes(|boxes| {
                let mut result = vec![0i64; local.len() * size];
                for (src, chunk) in result.chunks_mut(local.len().max(1)).enumerate() {
                    let bytes = &boxes[src * size + src];
                    if bytes.len() != std::mem::size_of_val(chunk) {
                        return Err(Fft3dError::Communication(format!(
                            "rank {} gathered {} bytes, expected {}",
                            src,
                            bytes.len(),
                            std::mem::size_of_val(chunk)
                        )));
                    }
                    bytemuck::cast_slice_mut::<i64, u8>(chunk).copy_from_slice(bytes);
                }
                Ok(result)
            })?
        });

        self.shared.barrier.wait();
        result
    }

    fn all_to_all_varcount<T: FftScalar>(
        &self,
        send: &[T],
        send_counts: &[usize],
        recv: &mut [T],
        recv_counts: &[usize],
    ) -> Result<()> {
        let size = self.size();
        // A rank with bad arguments still joins both barriers so its peers are not left waiting
        let valid = check_varcount(size, send, send_counts, recv, recv_counts);

        let posted = match valid {
            Ok(()) => {
                let send_displs = displacements(send_counts);
                self.with_mailboxes(|boxes| {
                    for dst in 0..size {
                        let run = &send[send_displs[dst]..send_displs[dst] + send_counts[dst]];
                        boxes[self.rank * size + dst] = bytemuck::cast_slice::<T, u8>(run).to_vec();
                    }
                })
            }
            Err(e) => Err(e),
        };
        self.shared.barrier.wait();

        let received = posted.and_then(|_| {
            let recv_displs = displacements(recv_counts);
            self.with_mailboxes(|boxes| {
                for src in 0..size {
                    let bytes = std::mem::take(&mut boxes[src * size + self.rank]);
                    let run = &mut recv[recv_displs[src]..recv_displs[src] + recv_counts[src]];
                    if bytes.len() != std::mem::size_of_val(run) {
                        return Err(Fft3dError::Communication(format!(
                            "rank {} received {} bytes from rank {}, expected {}",
                            self.rank,
                            bytes.len(),
                            src,
                            std::mem::size_of_val(run)
                        )));
                    }
                    bytemuck::cast_slice_mut::<T, u8>(run).copy_from_slice(&bytes);
                }
                Ok(())
            })?
        });

        self.shared.barrier.wait();
        received
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use std::thread;

    use super::ThreadComm;
    use crate::traits::comm::Communicator;
    use crate::traits::types::Fft3dError;

    #[test]
    fn test_all_gather() {
        let gathered = ThreadComm::run(4, |comm| {
            let r = comm.rank() as i64;
            comm.all_gather(&[r, 10 * r]).unwrap()
        });

        for g in gathered {
            assert_eq!(g, vec![0, 0, 1, 10, 2, 20, 3, 30]);
        }
    }

    #[test]
    fn test_all_reduce_max() {
        let maxima =
            ThreadComm::run(3, |comm| comm.all_reduce_max(5 - comm.rank() as i64).unwrap());
        assert_eq!(maxima, vec![5, 5, 5]);
    }

    #[test]
    fn test_all_to_all_varcount() {
        // Rank r sends r + 1 copies of (10 * r + dst) to each dst
        let size = 3;
        let received = ThreadComm::run(size, |comm| {
            let r = comm.rank();
            let send_counts = vec![r + 1; size];
            let send: Vec<f64> = (0..size)
                .flat_map(|dst| std::iter::repeat((10 * r + dst) as f64).take(r + 1))
                .collect();

            let recv_counts: Vec<usize> = (0..size).map(|src| src + 1).collect();
            let mut recv = vec![0f64; recv_counts.iter().sum()];
            comm.all_to_all_varcount(&send, &send_counts, &mut recv, &recv_counts)
                .unwrap();
            recv
        });

        for (r, recv) in received.iter().enumerate() {
            let expected: Vec<f64> = (0..size)
                .flat_map(|src| std::iter::repeat((10 * src + r) as f64).take(src + 1))
                .collect();
            assert_eq!(recv, &expected);
        }
    }

    #[test]
    fn test_mismatched_counts() {
        let results = ThreadComm::run(2, |comm| {
            let send = vec![1f32; 2];
            let mut recv = vec![0f32; 3];
            // Every rank expects one more element from rank 0 than it sends
            comm.all_to_all_varcount(&send, &[1, 1], &mut recv, &[2, 1])
        });

        assert!(results.iter().all(|r| r.is_err()));
    }

    #[test]
    fn test_poisoned_mailboxes() {
        let comms = ThreadComm::group(3);

        // Poison the shared mailboxes from a thread that panics while holding the lock
        let shared = Arc::clone(&comms[0].shared);
        let poisoned = thread::spawn(move || {
            let _guard = shared.mailboxes.lock().unwrap();
            panic!("poison");
        })
        .join();
        assert!(poisoned.is_err());

        let results: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = comms
                .into_iter()
                .map(|comm| {
                    s.spawn(move || {
                        let gathered = comm.all_gather(&[comm.rank() as i64]);
                        let mut recv = vec![0f64; 3];
                        let exchanged = comm.all_to_all_varcount(
                            &[1.0, 2.0, 3.0],
                            &[1, 1, 1],
                            &mut recv,
                            &[1, 1, 1],
                        );
                        (gathered, exchanged)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for (gathered, exchanged) in results {
            assert!(matches!(gathered, Err(Fft3dError::Communication(_))));
            assert!(matches!(exchanged, Err(Fft3dError::Communication(_))));
        }
    }

    #[test]
    fn test_repeated_collectives() {
        let sums = ThreadComm::run(4, |comm| {
            let mut total = 0;
            for round in 0..10 {
                let g = comm.all_gather(&[round * comm.rank() as i64]).unwrap();
                total += g.iter().sum::<i64>();
            }
            total
        });

        // sum over rounds of round * (0 + 1 + 2 + 3)
        assert!(sums.iter().all(|&s| s == 45 * 6));
    }
}
