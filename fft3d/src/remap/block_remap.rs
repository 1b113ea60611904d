//! Remap engine over rectangular block intersections.
use num_complex::Complex;
use tracing::{debug, trace_span};

use crate::grid::{AxisOrder, Block, Layout};
use crate::remap::pack::{pack, unpack};
use crate::remap::types::{BlockRemap, RemapDescriptor, Transfer};
use crate::traits::comm::Communicator;
use crate::traits::remap::RemapEngine;
use crate::traits::types::{Fft3dError, FftScalar, Result};

/// Number of integers describing a layout when gathered, bounds followed by storage order.
const LAYOUT_RECORD: usize = 9;

fn encode(layout: &Layout, record: &mut Vec<i64>) {
    record.extend_from_slice(&layout.block.lo);
    record.extend_from_slice(&layout.block.hi);
    record.extend(layout.order.0.iter().map(|&a| a as i64));
}

fn decode(record: &[i64]) -> Result<Layout> {
    let lo = [record[0], record[1], record[2]];
    let hi = [record[3], record[4], record[5]];

    let mut order = [0usize; 3];
    let mut seen = [false; 3];
    for (o, &a) in order.iter_mut().zip(&record[6..9]) {
        if !(0..3).contains(&a) || seen[a as usize] {
            return Err(Fft3dError::Configuration(format!(
                "storage order {:?} is not a permutation of the three axes",
                &record[6..9]
            )));
        }
        seen[a as usize] = true;
        *o = a as usize;
    }

    Ok(Layout::new(Block::new(lo, hi), AxisOrder(order)))
}

/// Number of elements of `block` covered by the blocks of `others`.
fn covered(block: &Block, others: &[Layout]) -> usize {
    others
        .iter()
        .filter_map(|other| block.intersection(&other.block))
        .map(|overlap| overlap.volume())
        .sum()
}

impl<C: Communicator> RemapEngine for BlockRemap<C> {
    type Comm = C;
    type Descriptor = RemapDescriptor;

    fn comm(&self) -> &C {
        &self.comm
    }

    fn build_descriptor(&self, from: &Layout, to: &Layout) -> Result<RemapDescriptor> {
        let size = self.comm.size();
        let rank = self.comm.rank();

        let mut record = Vec::with_capacity(2 * LAYOUT_RECORD);
        encode(from, &mut record);
        encode(to, &mut record);
        let gathered = self.comm.all_gather(&record)?;

        let mut froms = Vec::with_capacity(size);
        let mut tos = Vec::with_capacity(size);
        for chunk in gathered.chunks_exact(2 * LAYOUT_RECORD) {
            froms.push(decode(&chunk[..LAYOUT_RECORD])?);
            tos.push(decode(&chunk[LAYOUT_RECORD..])?);
        }

        // Every rank checks every block so that all ranks agree on the outcome
        for r in 0..size {
            if !froms[r].block.is_empty() && covered(&froms[r].block, &tos) != froms[r].volume() {
                return Err(Fft3dError::Configuration(format!(
                    "source block {:?} of rank {} is not covered exactly once by the destination blocks",
                    froms[r].block, r
                )));
            }
            if !tos[r].block.is_empty() && covered(&tos[r].block, &froms) != tos[r].volume() {
                return Err(Fft3dError::Configuration(format!(
                    "destination block {:?} of rank {} is not covered exactly once by the source blocks",
                    tos[r].block, r
                )));
            }
        }

        let mut sends = Vec::new();
        let mut recvs = Vec::new();
        let mut send_counts = vec![0usize; size];
        let mut recv_counts = vec![0usize; size];

        for peer in 0..size {
            if let Some(overlap) = from.block.intersection(&tos[peer].block) {
                send_counts[peer] = overlap.volume();
                sends.push(Transfer {
                    rank: peer,
                    overlap,
                    order: tos[peer].order,
                });
            }

            if let Some(overlap) = to.block.intersection(&froms[peer].block) {
                recv_counts[peer] = overlap.volume();
                recvs.push(Transfer {
                    rank: peer,
                    overlap,
                    order: to.order,
                });
            }
        }

        let descriptor = RemapDescriptor {
            from: *from,
            to: *to,
            sends,
            recvs,
            send_counts,
            recv_counts,
        };

        debug!(
            rank,
            peers_send = descriptor.sends.len(),
            peers_recv = descriptor.recvs.len(),
            send_len = descriptor.send_len(),
            recv_len = descriptor.recv_len(),
            "built remap descriptor"
        );

        Ok(descriptor)
    }

    fn scratch_len(descriptor: &RemapDescriptor) -> usize {
        descriptor.send_len() + descriptor.recv_len()
    }

    fn exchange<T: FftScalar>(
        &self,
        descriptor: &RemapDescriptor,
        src: &[Complex<T>],
        scratch: &mut [Complex<T>],
    ) -> Result<()> {
        let _span = trace_span!("remap_exchange", rank = self.comm.rank()).entered();

        if src.len() < descriptor.from.volume() {
            return Err(Fft3dError::BufferTooSmall {
                name: "remap source",
                len: src.len(),
                required: descriptor.from.volume(),
            });
        }

        let required = Self::scratch_len(descriptor);
        if scratch.len() < required {
            return Err(Fft3dError::BufferTooSmall {
                name: "remap scratch",
                len: scratch.len(),
                required,
            });
        }

        let (send_buf, rest) = scratch.split_at_mut(descriptor.send_len());
        let recv_buf = &mut rest[..descriptor.recv_len()];

        let mut n = 0;
        for transfer in descriptor.sends.iter() {
            n += pack(
                src,
                &descriptor.from,
                &transfer.overlap,
                transfer.order,
                &mut send_buf[n..],
            );
        }

        // Complex numbers travel as interleaved pairs of scalars
        let send_counts = descriptor
            .send_counts
            .iter()
            .map(|c| 2 * c)
            .collect::<Vec<_>>();
        let recv_counts = descriptor
            .recv_counts
            .iter()
            .map(|c| 2 * c)
            .collect::<Vec<_>>();

        self.comm.all_to_all_varcount(
            bytemuck::cast_slice::<Complex<T>, T>(&*send_buf),
            &send_counts,
            bytemuck::cast_slice_mut::<Complex<T>, T>(recv_buf),
            &recv_counts,
        )
    }

    fn unpack<T: FftScalar>(
        &self,
        descriptor: &RemapDescriptor,
        scratch: &[Complex<T>],
        dst: &mut [Complex<T>],
    ) {
        let recv_buf = &scratch[descriptor.send_len()..];

        let mut n = 0;
        for transfer in descriptor.recvs.iter() {
            n += unpack(
                &recv_buf[n..],
                &descriptor.to,
                &transfer.overlap,
                transfer.order,
                dst,
            );
        }
    }
}
