// ─────────────────────────────────────────────────────────────────────
// SCPN Quadrant Residual — Boundary Reconciliation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Residuals on the shared sides and at the center point.
//!
//! Combiners own the residuals of both their shared sides and forward them
//! to the sender across each side. Senders never evaluate a shared-side
//! cell: they copy what the combiner sends. Every shared-side cell is thus
//! computed on exactly one rank.

use log::debug;
use ndarray::Array2;
use quadrant_comm::{Communicator, Tag};
use quadrant_types::error::QuadrantResult;

use crate::halo::{side_line, store_side_line, PostedHalo};
use crate::quadrant::Quadrant;
use crate::stencil::GhostLines;

/// Finish the halo exchange and settle every shared-side cell of `out`.
/// Returns the sum of squared residuals this rank is authoritative for
/// beyond its interior (zero on sender quadrants).
pub fn reconcile_boundary<C: Communicator>(
    quadrant: Quadrant,
    posted: PostedHalo,
    phi: &Array2<f64>,
    f: &Array2<f64>,
    out: &mut Array2<f64>,
    h2: f64,
    comm: &C,
) -> QuadrantResult<f64> {
    match posted {
        receiving @ PostedHalo::Receiving(_) => {
            let ghosts = receiving.complete(comm)?;
            let sum_sq = finalize_owned_sides(quadrant, &ghosts, phi, f, out, h2)?;
            forward_owned_sides(quadrant, out, comm)?;
            Ok(sum_sq)
        }
        sending @ PostedHalo::Sending(_) => {
            // Both outgoing halo sends must be done before the finalized
            // lines are received back.
            sending.complete(comm)?;
            receive_finalized_sides(quadrant, out, comm)?;
            Ok(0.0)
        }
    }
}

/// Evaluate the interior cells of both shared sides plus the center point.
pub fn finalize_owned_sides(
    quadrant: Quadrant,
    ghosts: &GhostLines,
    phi: &Array2<f64>,
    f: &Array2<f64>,
    out: &mut Array2<f64>,
    h2: f64,
) -> QuadrantResult<f64> {
    let n = phi.nrows();
    let mut sum_sq = 0.0;
    for link in quadrant.links() {
        for k in 1..n - 1 {
            let (i, j) = link.side.cell(n, k);
            let res = ghosts.boundary_point(phi, f, i, j, h2)?;
            out[[i, j]] = res;
            sum_sq += res * res;
        }
    }
    let (ci, cj) = quadrant.center_cell(n);
    let center = ghosts.boundary_point(phi, f, ci, cj, h2)?;
    out[[ci, cj]] = center;
    if quadrant.counts_center() {
        sum_sq += center * center;
    }
    debug!("{quadrant:?}: finalized shared sides, center residual {center:e}");
    Ok(sum_sq)
}

fn forward_owned_sides<C: Communicator>(
    quadrant: Quadrant,
    out: &Array2<f64>,
    comm: &C,
) -> QuadrantResult<()> {
    for link in quadrant.links() {
        comm.send(link.peer.rank(), Tag::Boundary, &side_line(out, link.side))?;
    }
    Ok(())
}

fn receive_finalized_sides<C: Communicator>(
    quadrant: Quadrant,
    out: &mut Array2<f64>,
    comm: &C,
) -> QuadrantResult<()> {
    let n = out.nrows();
    for link in quadrant.links() {
        let line = comm.recv(link.peer.rank(), Tag::Boundary, n)?;
        store_side_line(out, link.side, &line)?;
    }
    debug!("{quadrant:?}: stored finalized shared sides");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quadrant::Side;

    #[test]
    fn test_finalize_touches_only_shared_sides() {
        let n = 4;
        let phi = Array2::from_elem((n, n), 2.0);
        let f = Array2::from_elem((n, n), 1.0);
        let mut ghosts = GhostLines::new();
        ghosts.insert(Side::South, vec![2.0; n]);
        ghosts.insert(Side::West, vec![2.0; n]);
        let mut out = Array2::zeros((n, n));

        let sum_sq =
            finalize_owned_sides(Quadrant::NorthEast, &ghosts, &phi, &f, &mut out, 0.5).unwrap();

        // Constant phi: every finalized residual equals f = 1.
        for k in 1..n - 1 {
            assert_eq!(out[[0, k]], 1.0);
            assert_eq!(out[[k, 0]], 1.0);
        }
        assert_eq!(out[[0, 0]], 1.0);
        // Outer-boundary ends of the shared sides stay zero.
        assert_eq!(out[[0, n - 1]], 0.0);
        assert_eq!(out[[n - 1, 0]], 0.0);
        // NorthEast does not count the center.
        assert_eq!(sum_sq, (2 * (n - 2)) as f64);
    }

    #[test]
    fn test_southwest_counts_center() {
        let n = 3;
        let phi = Array2::zeros((n, n));
        let f = Array2::from_elem((n, n), 1.0);
        let mut ghosts = GhostLines::new();
        ghosts.insert(Side::North, vec![0.0; n]);
        ghosts.insert(Side::East, vec![0.0; n]);
        let mut out = Array2::zeros((n, n));
        let sum_sq =
            finalize_owned_sides(Quadrant::SouthWest, &ghosts, &phi, &f, &mut out, 1.0).unwrap();
        // Two side cells plus the center.
        assert_eq!(sum_sq, 3.0);
        assert_eq!(out[[2, 2]], 1.0);
    }
}
