// ─────────────────────────────────────────────────────────────────────
// SCPN Quadrant Residual — Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Distributed five-point Poisson residual over a fixed 2×2 decomposition.
//!
//! Each of four ranks owns one quadrant. `residual::compute_residual` is
//! the per-rank entry point; `driver` runs all four ranks on threads.

pub mod decomposition;
pub mod driver;
pub mod halo;
pub mod norm;
pub mod quadrant;
pub mod reconcile;
pub mod residual;
pub mod stencil;

pub use residual::compute_residual;
