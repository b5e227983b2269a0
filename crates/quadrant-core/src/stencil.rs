// ─────────────────────────────────────────────────────────────────────
// SCPN Quadrant Residual — Five-Point Stencil
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Residual of the discrete Poisson equation:
//!
//!   r_ij = f_ij + (φ_{i,j-1} + φ_{i-1,j} + φ_{i+1,j} + φ_{i,j+1} - 4 φ_ij) / h²
//!
//! Neighbours are always summed west, south, north, east so that the same
//! cell evaluated on two different ranks yields bit-identical values.

use ndarray::Array2;
use quadrant_types::error::{QuadrantError, QuadrantResult};

use crate::quadrant::Side;

/// Five-point residual of one cell from its neighbour values.
#[inline(always)]
pub fn five_point(
    f: f64,
    west: f64,
    south: f64,
    north: f64,
    east: f64,
    center: f64,
    h2: f64,
) -> f64 {
    f + (west + south + north + east - 4.0 * center) / h2
}

/// Fill the strictly interior cells (1 ≤ i, j ≤ n-2) of `out` and return
/// the sum of their squared residuals. Needs no data from other ranks.
pub fn interior_residual(
    phi: &Array2<f64>,
    f: &Array2<f64>,
    out: &mut Array2<f64>,
    h2: f64,
) -> f64 {
    let n = phi.nrows();
    let mut sum_sq = 0.0;
    for i in 1..n - 1 {
        for j in 1..n - 1 {
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
    sum_sq
}

/// Neighbour lines received from adjacent ranks, keyed by the local side
/// they lie beyond.
#[derive(Debug, Clone, Default)]
pub struct GhostLines {
    lines: Vec<(Side, Vec<f64>)>,
}

impl GhostLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, side: Side, values: Vec<f64>) {
        self.lines.retain(|(s, _)| *s != side);
        self.lines.push((side, values));
    }

    pub fn get(&self, side: Side) -> Option<&[f64]> {
        self.lines
            .iter()
            .find(|(s, _)| *s == side)
            .map(|(_, v)| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Value of the neighbour of (i, j) in direction `towards`, reading the
    /// ghost line when the step leaves the block.
    fn neighbour(
        &self,
        phi: &Array2<f64>,
        i: usize,
        j: usize,
        towards: Side,
    ) -> QuadrantResult<f64> {
        let n = phi.nrows();
        if towards.contains(n, i, j) {
            let line = self.get(towards).ok_or_else(|| {
                QuadrantError::InvalidGrid(format!(
                    "cell ({i}, {j}) needs a {towards:?} ghost line that was not received"
                ))
            })?;
            let k = towards.along(i, j);
            return line.get(k).copied().ok_or_else(|| {
                QuadrantError::InvalidGrid(format!(
                    "{towards:?} ghost line has {} values, cell needs index {k}",
                    line.len()
                ))
            });
        }
        let (ni, nj) = match towards {
            Side::South => (i - 1, j),
            Side::North => (i + 1, j),
            Side::West => (i, j - 1),
            Side::East => (i, j + 1),
        };
        Ok(phi[[ni, nj]])
    }

    /// Five-point residual of a cell whose stencil may cross shared sides.
    pub fn boundary_point(
        &self,
        phi: &Array2<f64>,
        f: &Array2<f64>,
        i: usize,
        j: usize,
        h2: f64,
    ) -> QuadrantResult<f64> {
        Ok(five_point(
            f[[i, j]],
            self.neighbour(phi, i, j, Side::West)?,
            self.neighbour(phi, i, j, Side::South)?,
            self.neighbour(phi, i, j, Side::North)?,
            self.neighbour(phi, i, j, Side::East)?,
            phi[[i, j]],
            h2,
        ))
    }
}
