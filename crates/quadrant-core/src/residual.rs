// ─────────────────────────────────────────────────────────────────────
// SCPN Quadrant Residual — Distributed Residual
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-rank entry point of the four-quadrant residual evaluation.

use log::debug;
use ndarray::Array2;
use quadrant_comm::Communicator;
use quadrant_types::config::ResidualConfig;
use quadrant_types::constants::{MIN_LOCAL_N, QUADRANT_COUNT};
use quadrant_types::error::{QuadrantError, QuadrantResult};

use crate::halo::post_halo;
use crate::norm::NormAccumulator;
use crate::quadrant::Quadrant;
use crate::reconcile::reconcile_boundary;
use crate::stencil::interior_residual;

/// Compute this rank's residual block into `out` and return the global L2
/// norm of the residual, identical on all four ranks.
///
/// Must be called by all four ranks of `comm` with n×n blocks of the same
/// n. `out` may hold anything on entry; every cell is overwritten. Order of
/// work: post halo transfers, evaluate the interior while they are in
/// flight, wait and reconcile the shared sides, then reduce the norm.
///
/// Shapes and group size are checked before any message is posted. A rank
/// whose inputs differ from its peers' leaves them blocked in the exchange.
pub fn compute_residual<C: Communicator>(
    phi: &Array2<f64>,
    out: &mut Array2<f64>,
    f: &Array2<f64>,
    comm: &C,
    cfg: &ResidualConfig,
) -> QuadrantResult<f64> {
    let n = validate_inputs(phi, out, f, comm)?;
    let quadrant = Quadrant::from_rank(comm.rank())?;
    let h = cfg.mesh_spacing(n)?;
    let h2 = h * h;

    out.fill(0.0);

    let posted = post_halo(quadrant, phi, comm)?;

    let mut norm = NormAccumulator::new();
    norm.add(interior_residual(phi, f, out, h2));
    norm.add(reconcile_boundary(quadrant, posted, phi, f, out, h2, comm)?);

    let global = norm.reduce(comm)?;
    debug!("{quadrant:?}: n={n}, global residual norm {global:e}");
    Ok(global)
}

fn validate_inputs<C: Communicator>(
    phi: &Array2<f64>,
    out: &Array2<f64>,
    f: &Array2<f64>,
    comm: &C,
) -> QuadrantResult<usize> {
    if comm.size() != QUADRANT_COUNT {
        return Err(QuadrantError::Config(format!(
            "quadrant residual needs exactly {QUADRANT_COUNT} ranks, group has {}",
            comm.size()
        )));
    }
    let (n, ncols) = phi.dim();
    if n != ncols {
        return Err(QuadrantError::InvalidGrid(format!(
            "phi must be square, got {n}x{ncols}"
        )));
    }
    if n < MIN_LOCAL_N {
        return Err(QuadrantError::InvalidGrid(format!(
            "local grid needs n >= {MIN_LOCAL_N}, got {n}"
        )));
    }
    if f.dim() != (n, n) {
        return Err(QuadrantError::InvalidGrid(format!(
            "phi/f shape mismatch: {:?} vs {:?}",
            phi.dim(),
            f.dim()
        )));
    }
    if out.dim() != (n, n) {
        return Err(QuadrantError::InvalidGrid(format!(
            "phi/residual shape mismatch: {:?} vs {:?}",
            phi.dim(),
            out.dim()
        )));
    }
    Ok(n)
}
