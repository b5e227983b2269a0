// ─────────────────────────────────────────────────────────────────────
// SCPN Quadrant Residual — Communicator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Process-group abstraction: point-to-point transfers and a sum reduction.

use std::fmt;

use quadrant_types::error::QuadrantResult;

/// Logical message tag. Each exchange phase has its own tag so that a
/// message can only be matched by a receive posted for the same phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Inset phi lines travelling from sender quadrants to combiners.
    Halo,
    /// Finalized edge residuals travelling from combiners back to senders.
    Boundary,
    /// Partial sums of the collective norm reduction.
    NormReduce,
}

impl Tag {
    pub fn raw(self) -> u32 {
        match self {
            Tag::Halo => 1,
            Tag::Boundary => 2,
            Tag::NormReduce => 3,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.raw())
    }
}

/// Handle of a posted non-blocking send. Consumed by `wait_send`.
#[derive(Debug)]
#[must_use = "a posted send must be completed with Communicator::wait_send"]
pub struct SendRequest {
    dest: usize,
    tag: Tag,
    slot: usize,
}

impl SendRequest {
    pub fn new(dest: usize, tag: Tag) -> Self {
        Self::with_slot(dest, tag, 0)
    }

    /// Handle that also names backend-side state (an in-flight buffer).
    pub fn with_slot(dest: usize, tag: Tag, slot: usize) -> Self {
        SendRequest { dest, tag, slot }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn dest(&self) -> usize {
        self.dest
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }
}

/// Handle of a posted non-blocking receive. The payload only becomes
/// readable through `wait_recv`, which consumes the handle.
#[derive(Debug)]
#[must_use = "a posted receive must be completed with Communicator::wait_recv"]
pub struct RecvRequest {
    source: usize,
    tag: Tag,
    len: usize,
    slot: usize,
}

impl RecvRequest {
    pub fn new(source: usize, tag: Tag, len: usize) -> Self {
        Self::with_slot(source, tag, len, 0)
    }

    pub fn with_slot(source: usize, tag: Tag, len: usize, slot: usize) -> Self {
        RecvRequest {
            source,
            tag,
            len,
            slot,
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn source(&self) -> usize {
        self.source
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A fixed group of ranks exchanging `f64` buffers.
///
/// Messages between one (source, destination) pair are non-overtaking.
/// Any error is fatal for the calling operation; there is no retry.
pub trait Communicator {
    /// This worker's rank in `0..size()`.
    fn rank(&self) -> usize;

    /// Number of ranks in the group.
    fn size(&self) -> usize;

    /// Start sending `data` to `dest`. Returns without waiting for the
    /// matching receive.
    fn isend(&self, dest: usize, tag: Tag, data: Vec<f64>) -> QuadrantResult<SendRequest>;

    /// Post a receive of exactly `len` values from `source`.
    fn irecv(&self, source: usize, tag: Tag, len: usize) -> QuadrantResult<RecvRequest>;

    /// Block until the send is complete and its buffer may be reused.
    fn wait_send(&self, request: SendRequest) -> QuadrantResult<()>;

    /// Block until the receive has completed and return its payload.
    fn wait_recv(&self, request: RecvRequest) -> QuadrantResult<Vec<f64>>;

    /// Blocking send.
    fn send(&self, dest: usize, tag: Tag, data: &[f64]) -> QuadrantResult<()> {
        let request = self.isend(dest, tag, data.to_vec())?;
        self.wait_send(request)
    }

    /// Blocking receive.
    fn recv(&self, source: usize, tag: Tag, len: usize) -> QuadrantResult<Vec<f64>> {
        let request = self.irecv(source, tag, len)?;
        self.wait_recv(request)
    }

    /// Sum a local scalar across all ranks. Every rank gets the same value.
    fn all_reduce_sum(&self, local: f64) -> QuadrantResult<f64>;
}
