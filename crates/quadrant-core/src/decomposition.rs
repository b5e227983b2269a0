// ─────────────────────────────────────────────────────────────────────
// SCPN Quadrant Residual — Quadrant Decomposition
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Mapping between a (2n-1)×(2n-1) global grid and its four n×n quadrant
//! blocks, which overlap on the middle row and column.
//!
//! Also holds the serial reference residual the distributed result is
//! checked against.

use ndarray::{s, Array2};
use quadrant_types::constants::{MIN_LOCAL_N, QUADRANT_COUNT};
use quadrant_types::error::{QuadrantError, QuadrantResult};

use crate::quadrant::Quadrant;
use crate::stencil::five_point;

/// Global side length for local blocks of side n.
pub fn global_side(n: usize) -> usize {
    2 * n - 1
}

/// Local block side for a global grid of side m (m must be odd).
pub fn local_side(m: usize) -> QuadrantResult<usize> {
    if m % 2 == 0 || m < global_side(MIN_LOCAL_N) {
        return Err(QuadrantError::InvalidGrid(format!(
            "global side must be odd and >= {}, got {m}",
            global_side(MIN_LOCAL_N)
        )));
    }
    Ok((m + 1) / 2)
}

/// Cut a global grid into the four quadrant blocks, in rank order.
pub fn split_quadrants(global: &Array2<f64>) -> QuadrantResult<Vec<Array2<f64>>> {
    let (m, mc) = global.dim();
    if m != mc {
        return Err(QuadrantError::InvalidGrid(format!(
            "global grid must be square, got {m}x{mc}"
        )));
    }
    let n = local_side(m)?;
    Ok(Quadrant::ALL
        .iter()
        .map(|q| {
            let (r0, c0) = q.global_origin(n);
            global.slice(s![r0..r0 + n, c0..c0 + n]).to_owned()
        })
        .collect())
}

/// Reassemble four quadrant blocks (rank order) into the global grid.
/// Shared lines are written by several blocks; the last writer wins.
pub fn stitch_quadrants(blocks: &[Array2<f64>]) -> QuadrantResult<Array2<f64>> {
    if blocks.len() != QUADRANT_COUNT {
        return Err(QuadrantError::InvalidGrid(format!(
            "expected {QUADRANT_COUNT} blocks, got {}",
            blocks.len()
        )));
    }
    let n = blocks[0].nrows();
    if n < MIN_LOCAL_N {
        return Err(QuadrantError::InvalidGrid(format!(
            "blocks need n >= {MIN_LOCAL_N}, got {n}"
        )));
    }
    if let Some(bad) = blocks.iter().find(|b| b.dim() != (n, n)) {
        return Err(QuadrantError::InvalidGrid(format!(
            "block shape {:?} differs from ({n}, {n})",
            bad.dim()
        )));
    }
    let m = global_side(n);
    let mut global = Array2::zeros((m, m));
    for (q, block) in Quadrant::ALL.iter().zip(blocks) {
        let (r0, c0) = q.global_origin(n);
        global.slice_mut(s![r0..r0 + n, c0..c0 + n]).assign(block);
    }
    Ok(global)
}

/// Serial five-point residual over the whole global grid with mesh spacing
/// `h`. Outer-boundary cells are zero. Returns the residual grid and its L2
/// norm.
pub fn reference_residual(
    phi: &Array2<f64>,
    f: &Array2<f64>,
    h: f64,
) -> QuadrantResult<(Array2<f64>, f64)> {
    if phi.dim() != f.dim() {
        return Err(QuadrantError::InvalidGrid(format!(
            "phi/f shape mismatch: {:?} vs {:?}",
            phi.dim(),
            f.dim()
        )));
    }
    if !h.is_finite() || h <= 0.0 {
        return Err(QuadrantError::Config(format!(
            "mesh spacing must be finite > 0, got {h}"
        )));
    }
    let (rows, cols) = phi.dim();
    let h2 = h * h;
    let mut out = Array2::zeros((rows, cols));
    let mut sum_sq = 0.0;
    for i in 1..rows.saturating_sub(1) {
        for j in 1..cols.saturating_sub(1) {
            let res = five_point(
                f[[i, j]],
                phi[[i, j - 1]],
                phi[[i - 1, j]],
                phi[[i + 1, j]],
                phi[[i, j + 1]],
                phi[[i, j]],
                h2,
            );
            out[[i, j]] = res;
            sum_sq += res * res;
        }
    }
    Ok((out, sum_sq.sqrt()))
}
