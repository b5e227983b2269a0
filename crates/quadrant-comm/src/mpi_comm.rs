// ─────────────────────────────────────────────────────────────────────
// SCPN Quadrant Residual — MPI Communicator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! MPI-backed communicator, one quadrant rank per process.
//!
//! Requires the `distributed` feature and an MPI installation. The caller
//! initializes MPI and keeps the universe alive for as long as the
//! communicator is used:
//!
//! ```ignore
//! let universe = mpi::initialize().expect("MPI init failed");
//! let comm = MpiComm::from_world(universe.world());
//! ```
//!
//! `isend`/`irecv` map to `MPI_Isend`/`MPI_Irecv` with `Tag::raw()` as the
//! MPI tag. The payload of each immediate operation lives in a heap buffer
//! owned by the communicator until the matching `wait_send`/`wait_recv`
//! completes the request and releases it.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use log::{trace, warn};
use mpi::collective::SystemOperation;
use mpi::point_to_point::Status;
use mpi::request::StaticScope;
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;
use quadrant_types::error::{QuadrantError, QuadrantResult};

use crate::communicator::{Communicator, RecvRequest, SendRequest, Tag};

/// Blocks until one immediate request completes.
type Completion = Box<dyn FnOnce() -> Status>;

/// An immediate operation and the buffer it reads from or writes into.
struct InFlight {
    complete: Completion,
    buffer: *mut [f64],
}

impl InFlight {
    fn finish(self) -> (Status, Vec<f64>) {
        let status = (self.complete)();
        // SAFETY: `buffer` comes from `Box::into_raw` in `MpiComm::isend` or
        // `MpiComm::irecv`. The only other reference to it was held by the
        // request, which has just completed and been consumed.
        let data = unsafe { Box::from_raw(self.buffer) }.into_vec();
        (status, data)
    }
}

/// Communicator over an MPI communicator (normally the world).
pub struct MpiComm {
    world: SimpleCommunicator,
    next_slot: Cell<usize>,
    in_flight: RefCell<HashMap<usize, InFlight>>,
}

impl MpiComm {
    /// Wrap the world communicator. MPI must already be initialized.
    pub fn new() -> Self {
        Self::from_world(SimpleCommunicator::world())
    }

    pub fn from_world(world: SimpleCommunicator) -> Self {
        MpiComm {
            world,
            next_slot: Cell::new(0),
            in_flight: RefCell::new(HashMap::new()),
        }
    }

    /// Number of immediate operations posted but not yet waited on.
    pub fn pending(&self) -> usize {
        self.in_flight.borrow().len()
    }

    fn check_peer(&self, peer: usize) -> QuadrantResult<()> {
        if peer >= self.size() {
            return Err(QuadrantError::InvalidRank {
                rank: peer,
                size: self.size(),
            });
        }
        Ok(())
    }

    fn track(&self, op: InFlight) -> usize {
        let slot = self.next_slot.get();
        self.next_slot.set(slot.wrapping_add(1));
        self.in_flight.borrow_mut().insert(slot, op);
        slot
    }

    fn take(&self, slot: usize) -> QuadrantResult<InFlight> {
        self.in_flight.borrow_mut().remove(&slot).ok_or_else(|| {
            QuadrantError::Config(format!("no in-flight MPI request in slot {slot}"))
        })
    }
}

impl Default for MpiComm {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MpiComm {
    fn drop(&mut self) {
        let abandoned = self.in_flight.get_mut().len();
        if abandoned > 0 {
            // Waiting here could block forever on an unmatched receive, and
            // freeing a buffer MPI may still touch is unsound: leak both.
            warn!(
                "rank {}: dropping communicator with {abandoned} incomplete requests",
                self.world.rank()
            );
            for (_, op) in self.in_flight.get_mut().drain() {
                std::mem::forget(op);
            }
        }
    }
}

impl Communicator for MpiComm {
    fn rank(&self) -> usize {
        self.world.rank() as usize
    }

    fn size(&self) -> usize {
        self.world.size() as usize
    }

    fn isend(&self, dest: usize, tag: Tag, data: Vec<f64>) -> QuadrantResult<SendRequest> {
        self.check_peer(dest)?;
        trace!(
            "rank {} -> rank {dest}: {tag}, {} values",
            self.rank(),
            data.len()
        );
        let buffer = Box::into_raw(data.into_boxed_slice());
        // SAFETY: the allocation is only released by `InFlight::finish`,
        // after the request borrowing it has completed.
        let view: &'static [f64] = unsafe { &*buffer };
        let request = self
            .world
            .process_at_rank(dest as i32)
            .immediate_send_with_tag(StaticScope, view, tag.raw() as i32);
        let slot = self.track(InFlight {
            complete: Box::new(move || request.wait()),
            buffer,
        });
        Ok(SendRequest::with_slot(dest, tag, slot))
    }

    fn irecv(&self, source: usize, tag: Tag, len: usize) -> QuadrantResult<RecvRequest> {
        self.check_peer(source)?;
        let buffer = Box::into_raw(vec![0.0; len].into_boxed_slice());
        // SAFETY: as in `isend`; MPI is the only writer until completion.
        let view: &'static mut [f64] = unsafe { &mut *buffer };
        let request = self
            .world
            .process_at_rank(source as i32)
            .immediate_receive_into_with_tag(StaticScope, view, tag.raw() as i32);
        let slot = self.track(InFlight {
            complete: Box::new(move || request.wait()),
            buffer,
        });
        Ok(RecvRequest::with_slot(source, tag, len, slot))
    }

    fn wait_send(&self, request: SendRequest) -> QuadrantResult<()> {
        self.take(request.slot())?.finish();
        Ok(())
    }

    fn wait_recv(&self, request: RecvRequest) -> QuadrantResult<Vec<f64>> {
        let (status, data) = self.take(request.slot())?.finish();
        let got = usize::try_from(status.count(f64::equivalent_datatype())).unwrap_or(0);
        if got != request.len() {
            return Err(QuadrantError::LengthMismatch {
                peer: request.source(),
                expected: request.len(),
                got,
            });
        }
        trace!(
            "rank {} <- rank {}: {}, {got} values",
            self.rank(),
            request.source(),
            request.tag()
        );
        Ok(data)
    }

    fn all_reduce_sum(&self, local: f64) -> QuadrantResult<f64> {
        let mut global = 0.0f64;
        self.world.all_reduce_into(&local, &mut global, SystemOperation::sum());
        Ok(global)
    }
}
