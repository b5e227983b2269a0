// ─────────────────────────────────────────────────────────────────────
// SCPN Quadrant Residual — Threaded Driver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Runs the four ranks of one residual evaluation on scoped threads.

use ndarray::Array2;
use quadrant_comm::{run_world, Communicator};
use quadrant_types::config::{CommConfig, ResidualConfig};
use quadrant_types::constants::QUADRANT_COUNT;
use quadrant_types::error::{QuadrantError, QuadrantResult};

use crate::decomposition::{split_quadrants, stitch_quadrants};
use crate::residual::compute_residual;

/// Outcome of one four-rank evaluation. Only `evaluate_blocks` builds
/// one, so it always holds exactly one block and one norm per rank.
#[derive(Debug, Clone)]
pub struct DistributedResidual {
    blocks: Vec<Array2<f64>>,
    norms: Vec<f64>,
}

impl DistributedResidual {
    /// Residual block of each rank, in rank order.
    pub fn blocks(&self) -> &[Array2<f64>] {
        &self.blocks
    }

    /// Norm returned on each rank, in rank order.
    pub fn norms(&self) -> &[f64] {
        &self.norms
    }

    /// The global norm as seen by rank 0.
    pub fn norm(&self) -> f64 {
        self.norms.first().copied().unwrap_or(0.0)
    }

    /// Residual blocks reassembled into the global grid.
    pub fn stitched(&self) -> QuadrantResult<Array2<f64>> {
        stitch_quadrants(&self.blocks)
    }
}

/// Evaluate the residual of per-rank blocks. `out_blocks` are the residual
/// buffers handed to each rank (their contents are irrelevant).
pub fn evaluate_blocks(
    phi_blocks: &[Array2<f64>],
    f_blocks: &[Array2<f64>],
    out_blocks: Vec<Array2<f64>>,
    cfg: &ResidualConfig,
    comm_cfg: &CommConfig,
) -> QuadrantResult<DistributedResidual> {
    for (name, len) in [
        ("phi", phi_blocks.len()),
        ("f", f_blocks.len()),
        ("residual", out_blocks.len()),
    ] {
        if len != QUADRANT_COUNT {
            return Err(QuadrantError::InvalidGrid(format!(
                "expected {QUADRANT_COUNT} {name} blocks, got {len}"
            )));
        }
    }
    let per_rank = run_world(QUADRANT_COUNT, comm_cfg, |comm| {
        let rank = comm.rank();
        let mut out = out_blocks[rank].clone();
        let norm = compute_residual(&phi_blocks[rank], &mut out, &f_blocks[rank], comm, cfg)?;
        Ok::<_, QuadrantError>((out, norm))
    })?;

    let mut blocks = Vec::with_capacity(QUADRANT_COUNT);
    let mut norms = Vec::with_capacity(QUADRANT_COUNT);
    for result in per_rank {
        let (block, norm) = result?;
        blocks.push(block);
        norms.push(norm);
    }
    Ok(DistributedResidual { blocks, norms })
}

/// Split global phi and f into quadrants and evaluate with zeroed buffers.
pub fn evaluate_global(
    phi: &Array2<f64>,
    f: &Array2<f64>,
    cfg: &ResidualConfig,
    comm_cfg: &CommConfig,
) -> QuadrantResult<DistributedResidual> {
    if phi.dim() != f.dim() {
        return Err(QuadrantError::InvalidGrid(format!(
            "phi/f shape mismatch: {:?} vs {:?}",
            phi.dim(),
            f.dim()
        )));
    }
    let phi_blocks = split_quadrants(phi)?;
    let f_blocks = split_quadrants(f)?;
    let out_blocks = phi_blocks.iter().map(|b| Array2::zeros(b.dim())).collect();
    evaluate_blocks(&phi_blocks, &f_blocks, out_blocks, cfg, comm_cfg)
}
