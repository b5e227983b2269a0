// ─────────────────────────────────────────────────────────────────────
// SCPN Quadrant Residual — Norm Reduction
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Global L2 norm from per-rank partial sums of squares.

use log::debug;
use quadrant_comm::Communicator;
use quadrant_types::error::QuadrantResult;

/// Local sum of squared residuals over the cells this rank owns.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NormAccumulator {
    partial: f64,
}

impl NormAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sum_sq: f64) {
        self.partial += sum_sq;
    }

    pub fn partial(&self) -> f64 {
        self.partial
    }

    /// Collective: every rank must call this exactly once per evaluation.
    pub fn reduce<C: Communicator>(self, comm: &C) -> QuadrantResult<f64> {
        let total = comm.all_reduce_sum(self.partial)?;
        debug!(
            "rank {}: partial {:e}, global sum {:e}",
            comm.rank(),
            self.partial,
            total
        );
        Ok(total.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadrant_comm::run_world;
    use quadrant_types::config::CommConfig;
    use std::time::Duration;

    #[test]
    fn test_accumulate() {
        let mut acc = NormAccumulator::new();
        acc.add(1.5);
        acc.add(2.5);
        assert_eq!(acc.partial(), 4.0);
    }

    #[test]
    fn test_reduce_over_four_ranks() {
        let cfg = CommConfig::with_timeout(Duration::from_secs(5));
        let norms = run_world(4, &cfg, |comm| {
            let mut acc = NormAccumulator::new();
            // 0 + 1 + 4 + 9, plus 2 on rank 0: sqrt(16)
            let r = comm.rank() as f64;
            acc.add(r * r);
            if comm.rank() == 0 {
                acc.add(2.0);
            }
            acc.reduce(comm)
        })
        .expect("run_world");
        for norm in norms {
            assert_eq!(norm.expect("reduce"), 4.0);
        }
    }
}
