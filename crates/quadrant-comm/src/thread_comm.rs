// ─────────────────────────────────────────────────────────────────────
// SCPN Quadrant Residual — Thread-Backed Communicator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! In-process communicator: one channel per ordered rank pair.
//!
//! Each rank owns the sending ends of the channels towards every peer and
//! the receiving ends of the channels from every peer, so no memory is
//! shared between ranks beyond the messages themselves. Sends are buffered
//! and complete immediately; receives block (optionally with a timeout).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use log::trace;
use quadrant_types::config::CommConfig;
use quadrant_types::error::{QuadrantError, QuadrantResult};

use crate::communicator::{Communicator, RecvRequest, SendRequest, Tag};

#[derive(Debug)]
struct Envelope {
    tag: Tag,
    data: Vec<f64>,
}

/// One rank's endpoint of an in-process group.
pub struct ThreadComm {
    rank: usize,
    /// outboxes[dest]: channel rank -> dest.
    outboxes: Vec<Sender<Envelope>>,
    /// inboxes[source]: channel source -> rank.
    inboxes: Vec<Receiver<Envelope>>,
    /// Messages that arrived ahead of a receive for their tag, per source.
    stash: RefCell<Vec<VecDeque<Envelope>>>,
    timeout: Option<Duration>,
}

impl ThreadComm {
    /// Build a fully connected group of `size` endpoints, in rank order.
    pub fn world(size: usize, cfg: &CommConfig) -> QuadrantResult<Vec<ThreadComm>> {
        if size == 0 {
            return Err(QuadrantError::Config(
                "communicator group needs at least one rank".to_string(),
            ));
        }
        let mut outboxes: Vec<Vec<Sender<Envelope>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();
        let mut inboxes: Vec<Vec<Receiver<Envelope>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();
        for src in 0..size {
            for dst in 0..size {
                let (tx, rx) = mpsc::channel();
                outboxes[src].push(tx);
                inboxes[dst].push(rx);
            }
        }
        let timeout = cfg.recv_timeout();
        Ok(outboxes
            .into_iter()
            .zip(inboxes)
            .enumerate()
            .map(|(rank, (outboxes, inboxes))| ThreadComm {
                rank,
                outboxes,
                inboxes,
                stash: RefCell::new((0..size).map(|_| VecDeque::new()).collect()),
                timeout,
            })
            .collect())
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

    fn receive_raw(&self, source: usize, tag: Tag) -> QuadrantResult<Envelope> {
        let inbox = &self.inboxes[source];
        match self.timeout {
            Some(limit) => inbox.recv_timeout(limit).map_err(|e| match e {
                RecvTimeoutError::Timeout => QuadrantError::Timeout {
                    peer: source,
                    tag: tag.raw(),
                },
                RecvTimeoutError::Disconnected => {
                    QuadrantError::PeerDisconnected { peer: source }
                }
            }),
            None => inbox
                .recv()
                .map_err(|_| QuadrantError::PeerDisconnected { peer: source }),
        }
    }

    /// Oldest message from `source` carrying `tag`. Messages with other
    /// tags that arrive first are stashed for later receives.
    fn take_matching(&self, source: usize, tag: Tag) -> QuadrantResult<Envelope> {
        let mut stash = self.stash.borrow_mut();
        let queue = &mut stash[source];
        if let Some(pos) = queue.iter().position(|env| env.tag == tag) {
            if let Some(env) = queue.remove(pos) {
                return Ok(env);
            }
        }
        loop {
            let env = self.receive_raw(source, tag)?;
            if env.tag == tag {
                return Ok(env);
            }
            trace!(
                "rank {} stashing {} from rank {} while waiting for {tag}",
                self.rank,
                env.tag,
                source
            );
            queue.push_back(env);
        }
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.outboxes.len()
    }

    fn isend(&self, dest: usize, tag: Tag, data: Vec<f64>) -> QuadrantResult<SendRequest> {
        self.check_peer(dest)?;
        trace!(
            "rank {} -> rank {dest}: {tag}, {} values",
            self.rank,
            data.len()
        );
        self.outboxes[dest]
            .send(Envelope { tag, data })
            .map_err(|_| QuadrantError::PeerDisconnected { peer: dest })?;
        Ok(SendRequest::new(dest, tag))
    }

    fn irecv(&self, source: usize, tag: Tag, len: usize) -> QuadrantResult<RecvRequest> {
        self.check_peer(source)?;
        Ok(RecvRequest::new(source, tag, len))
    }

    fn wait_send(&self, request: SendRequest) -> QuadrantResult<()> {
        // Channel sends are buffered: the payload left this rank in isend.
        self.check_peer(request.dest())
    }

    fn wait_recv(&self, request: RecvRequest) -> QuadrantResult<Vec<f64>> {
        let env = self.take_matching(request.source(), request.tag())?;
        if env.data.len() != request.len() {
            return Err(QuadrantError::LengthMismatch {
                peer: request.source(),
                expected: request.len(),
                got: env.data.len(),
            });
        }
        trace!(
            "rank {} <- rank {}: {}, {} values",
            self.rank,
            request.source(),
            request.tag(),
            env.data.len()
        );
        Ok(env.data)
    }

    fn all_reduce_sum(&self, local: f64) -> QuadrantResult<f64> {
        for dest in (0..self.size()).filter(|&r| r != self.rank) {
            self.send(dest, Tag::NormReduce, &[local])?;
        }
        // Fixed summation order keeps the result bit-identical on every rank.
        let mut total = 0.0;
        for source in 0..self.size() {
            if source == self.rank {
                total += local;
            } else {
                let contribution = self.recv(source, Tag::NormReduce, 1)?;
                total += contribution[0];
            }
        }
        Ok(total)
    }
}

/// Run `work` once per rank of a fresh `size`-rank group, each on its own
/// scoped thread, and return the results in rank order.
pub fn run_world<T, F>(size: usize, cfg: &CommConfig, work: F) -> QuadrantResult<Vec<T>>
where
    F: Fn(&ThreadComm) -> T + Sync,
    T: Send,
{
    let comms = ThreadComm::world(size, cfg)?;
    let work = &work;
    let joined: Vec<thread::Result<T>> = thread::scope(|scope| {
        let handles: Vec<_> = comms
            .into_iter()
            .map(|comm| scope.spawn(move || work(&comm)))
            .collect();
        handles.into_iter().map(|h| h.join()).collect()
    });
    joined
        .into_iter()
        .enumerate()
        .map(|(rank, result)| result.map_err(|_| QuadrantError::WorkerPanicked { rank }))
        .collect()
}
