// ─────────────────────────────────────────────────────────────────────
// SCPN Quadrant Residual — Halo Exchange
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Non-blocking exchange of the phi lines adjacent to each shared side.
//!
//! Senders pack the line one cell inside each shared side and post a send
//! to the combiner across it. Combiners post one receive per shared side.
//! The transfers stay in flight while the interior stencil runs; ghost
//! values are only reachable through `PostedHalo::complete`, which waits on
//! every request first.

use log::debug;
use ndarray::Array2;
use quadrant_comm::{Communicator, RecvRequest, SendRequest, Tag};
use quadrant_types::error::{QuadrantError, QuadrantResult};

use crate::quadrant::{Duty, Quadrant, Side};
use crate::stencil::GhostLines;

/// Copy the cells lying on `side`.
pub fn side_line(grid: &Array2<f64>, side: Side) -> Vec<f64> {
    let n = grid.nrows();
    (0..n).map(|k| grid[side.cell(n, k)]).collect()
}

/// Copy the cells one step inward from `side`.
pub fn inset_line(grid: &Array2<f64>, side: Side) -> Vec<f64> {
    let n = grid.nrows();
    (0..n).map(|k| grid[side.inset_cell(n, k)]).collect()
}

/// Overwrite the cells on `side` with `values`.
pub fn store_side_line(grid: &mut Array2<f64>, side: Side, values: &[f64]) -> QuadrantResult<()> {
    let n = grid.nrows();
    if values.len() != n {
        return Err(QuadrantError::InvalidGrid(format!(
            "{side:?} line has {} values, grid side is {n}",
            values.len()
        )));
    }
    for (k, v) in values.iter().enumerate() {
        grid[side.cell(n, k)] = *v;
    }
    Ok(())
}

/// Transfers started by `post_halo`, one per shared side.
#[derive(Debug)]
#[must_use = "posted halo transfers must be completed"]
pub enum PostedHalo {
    /// Combiner: receives in flight.
    Receiving(Vec<(Side, RecvRequest)>),
    /// Sender: inset lines in flight towards both combiners.
    Sending(Vec<SendRequest>),
}

/// Start this quadrant's halo transfers without blocking.
pub fn post_halo<C: Communicator>(
    quadrant: Quadrant,
    phi: &Array2<f64>,
    comm: &C,
) -> QuadrantResult<PostedHalo> {
    let n = phi.nrows();
    match quadrant.duty() {
        Duty::Combiner => {
            let mut pending = Vec::with_capacity(2);
            for link in quadrant.links() {
                let req = comm.irecv(link.peer.rank(), Tag::Halo, n)?;
                pending.push((link.side, req));
            }
            debug!("{quadrant:?}: posted {} halo receives", pending.len());
            Ok(PostedHalo::Receiving(pending))
        }
        Duty::Sender => {
            let mut pending = Vec::with_capacity(2);
            for link in quadrant.links() {
                let line = inset_line(phi, link.side);
                pending.push(comm.isend(link.peer.rank(), Tag::Halo, line)?);
            }
            debug!("{quadrant:?}: posted {} halo sends", pending.len());
            Ok(PostedHalo::Sending(pending))
        }
    }
}

impl PostedHalo {
    /// Wait on every outstanding transfer. Combiners get their ghost lines;
    /// senders get an empty set once both sends have completed.
    pub fn complete<C: Communicator>(self, comm: &C) -> QuadrantResult<GhostLines> {
        let mut ghosts = GhostLines::new();
        match self {
            PostedHalo::Receiving(pending) => {
                for (side, req) in pending {
                    ghosts.insert(side, comm.wait_recv(req)?);
                }
            }
            PostedHalo::Sending(pending) => {
                for req in pending {
                    comm.wait_send(req)?;
                }
            }
        }
        Ok(ghosts)
    }
}
