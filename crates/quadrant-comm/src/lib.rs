// ─────────────────────────────────────────────────────────────────────
// SCPN Quadrant Residual — Communication
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Message passing between the four quadrant workers.
//!
//! `Communicator` is the process-group seam the residual kernel is written
//! against; `ThreadComm` backs it with in-process channels so each rank can
//! run on its own thread. With the `distributed` feature, `MpiComm` backs
//! it with an MPI world communicator, one rank per process.

pub mod communicator;
#[cfg(feature = "distributed")]
pub mod mpi_comm;
pub mod thread_comm;

pub use communicator::{Communicator, RecvRequest, SendRequest, Tag};
#[cfg(feature = "distributed")]
pub use mpi_comm::MpiComm;
pub use thread_comm::{run_world, ThreadComm};
