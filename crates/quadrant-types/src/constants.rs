// ─────────────────────────────────────────────────────────────────────
// SCPN Quadrant Residual — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

/// Number of workers in the fixed 2×2 decomposition.
pub const QUADRANT_COUNT: usize = 4;

/// Side length of one quadrant when the global domain is the unit square.
pub const DEFAULT_SUBDOMAIN_LENGTH: f64 = 0.5;

/// Smallest local grid with at least one interior cell.
pub const MIN_LOCAL_N: usize = 3;
