// ─────────────────────────────────────────────────────────────────────
// SCPN Quadrant Residual — MPI Communicator Tests
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! MPI backend tests.
//!
//! These need MPI and the `distributed` feature. They pass on any world
//! size, including a plain single-process run:
//!
//!   cargo test -p quadrant-comm --features distributed --test mpi_comm_test
//!   mpirun -n 4 cargo test -p quadrant-comm --features distributed --test mpi_comm_test

#![cfg(feature = "distributed")]

use quadrant_comm::{Communicator, MpiComm, Tag};
use quadrant_types::error::QuadrantError;

// MPI can only be initialized once per process, so everything runs in a
// single test.
#[test]
fn mpi_backend_point_to_point_and_reduce() {
    let universe = mpi::initialize().expect("MPI init failed");
    let comm = MpiComm::from_world(universe.world());
    let rank = comm.rank();
    let size = comm.size();
    assert!(rank < size);

    // Receives match on tag, not posting order.
    let boundary = comm.isend(rank, Tag::Boundary, vec![4.0, 5.0]).unwrap();
    let halo = comm.isend(rank, Tag::Halo, vec![1.0, 2.0, 3.0]).unwrap();
    let got_halo = comm.irecv(rank, Tag::Halo, 3).unwrap();
    let got_boundary = comm.irecv(rank, Tag::Boundary, 2).unwrap();
    assert_eq!(comm.pending(), 4);
    assert_eq!(comm.wait_recv(got_halo).unwrap(), vec![1.0, 2.0, 3.0]);
    assert_eq!(comm.wait_recv(got_boundary).unwrap(), vec![4.0, 5.0]);
    comm.wait_send(boundary).unwrap();
    comm.wait_send(halo).unwrap();
    assert_eq!(comm.pending(), 0);

    // Short payload is reported, not padded.
    let short = comm.isend(rank, Tag::Halo, vec![9.0]).unwrap();
    match comm.recv(rank, Tag::Halo, 3) {
        Err(QuadrantError::LengthMismatch {
            expected: 3,
            got: 1,
            ..
        }) => {}
        other => panic!("Unexpected result: {other:?}"),
    }
    comm.wait_send(short).unwrap();

    // Out-of-range peers are rejected before anything is posted.
    assert!(matches!(
        comm.isend(size, Tag::Halo, vec![0.0]),
        Err(QuadrantError::InvalidRank { .. })
    ));
    assert!(matches!(
        comm.irecv(size, Tag::Halo, 1),
        Err(QuadrantError::InvalidRank { .. })
    ));
    assert_eq!(comm.pending(), 0);

    // Sum of 1..=size on every rank.
    let total = comm.all_reduce_sum((rank + 1) as f64).unwrap();
    assert_eq!(total, (size * (size + 1) / 2) as f64);
}
