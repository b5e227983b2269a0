// ─────────────────────────────────────────────────────────────────────
// SCPN Quadrant Residual — Quadrant Roles
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Fixed 2×2 role table.
//!
//! ```text
//!   +-----------+-----------+
//!   | NorthWest | NorthEast |
//!   |  rank 3   |  rank 2   |
//!   +-----------C-----------+
//!   | SouthWest | SouthEast |
//!   |  rank 0   |  rank 1   |
//!   +-----------+-----------+
//! ```
//!
//! Local row index grows northward, column index eastward. Each quadrant
//! shares two sides with two peers; `C` is the center point replicated in
//! all four blocks. SouthWest and NorthEast are combiners: they receive the
//! halo lines, finalize residuals on their shared sides and the center, and
//! forward those values. SouthEast and NorthWest only send halo lines and
//! store the finalized values they get back.

use quadrant_types::constants::QUADRANT_COUNT;
use quadrant_types::error::{QuadrantError, QuadrantResult};

/// One side of a local n×n block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    South,
    North,
    West,
    East,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::South => Side::North,
            Side::North => Side::South,
            Side::West => Side::East,
            Side::East => Side::West,
        }
    }

    /// True for the sides that are rows (South, North).
    pub fn is_row(self) -> bool {
        matches!(self, Side::South | Side::North)
    }

    /// Local (row, col) of the k-th cell on this side.
    pub fn cell(self, n: usize, k: usize) -> (usize, usize) {
        match self {
            Side::South => (0, k),
            Side::North => (n - 1, k),
            Side::West => (k, 0),
            Side::East => (k, n - 1),
        }
    }

    /// Local (row, col) of the k-th cell one step inward from this side.
    pub fn inset_cell(self, n: usize, k: usize) -> (usize, usize) {
        match self {
            Side::South => (1, k),
            Side::North => (n - 2, k),
            Side::West => (k, 1),
            Side::East => (k, n - 2),
        }
    }

    /// Position of local cell (i, j) along this side.
    pub fn along(self, i: usize, j: usize) -> usize {
        if self.is_row() {
            j
        } else {
            i
        }
    }

    /// Whether cell (i, j) lies on this side of an n×n block.
    pub fn contains(self, n: usize, i: usize, j: usize) -> bool {
        match self {
            Side::South => i == 0,
            Side::North => i == n - 1,
            Side::West => j == 0,
            Side::East => j == n - 1,
        }
    }
}

/// What a quadrant does during boundary reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duty {
    /// Receives halo lines and owns its shared-side residuals.
    Combiner,
    /// Sends halo lines and stores the combiners' finalized residuals.
    Sender,
}

/// A shared side and the quadrant on the other side of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub side: Side,
    pub peer: Quadrant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    SouthWest,
    SouthEast,
    NorthEast,
    NorthWest,
}

impl Quadrant {
    /// All quadrants in rank order.
    pub const ALL: [Quadrant; QUADRANT_COUNT] = [
        Quadrant::SouthWest,
        Quadrant::SouthEast,
        Quadrant::NorthEast,
        Quadrant::NorthWest,
    ];

    pub fn from_rank(rank: usize) -> QuadrantResult<Self> {
        Self::ALL
            .get(rank)
            .copied()
            .ok_or(QuadrantError::InvalidRank {
                rank,
                size: QUADRANT_COUNT,
            })
    }

    pub fn rank(self) -> usize {
        match self {
            Quadrant::SouthWest => 0,
            Quadrant::SouthEast => 1,
            Quadrant::NorthEast => 2,
            Quadrant::NorthWest => 3,
        }
    }

    pub fn duty(self) -> Duty {
        match self {
            Quadrant::SouthWest | Quadrant::NorthEast => Duty::Combiner,
            Quadrant::SouthEast | Quadrant::NorthWest => Duty::Sender,
        }
    }

    /// The two shared sides, row side first.
    pub fn links(self) -> [Link; 2] {
        use Quadrant::*;
        let (row, col) = match self {
            SouthWest => ((Side::North, NorthWest), (Side::East, SouthEast)),
            SouthEast => ((Side::North, NorthEast), (Side::West, SouthWest)),
            NorthEast => ((Side::South, SouthEast), (Side::West, NorthWest)),
            NorthWest => ((Side::South, SouthWest), (Side::East, NorthEast)),
        };
        [
            Link {
                side: row.0,
                peer: row.1,
            },
            Link {
                side: col.0,
                peer: col.1,
            },
        ]
    }

    /// Local index of the center point: the corner where both shared sides meet.
    pub fn center_cell(self, n: usize) -> (usize, usize) {
        let [row, col] = self.links();
        let (i, _) = row.side.cell(n, 0);
        let (_, j) = col.side.cell(n, 0);
        (i, j)
    }

    /// Only SouthWest adds the center residual to its norm contribution.
    pub fn counts_center(self) -> bool {
        self == Quadrant::SouthWest
    }

    /// Offset of this block's (0, 0) cell in the (2n-1)×(2n-1) global grid.
    pub fn global_origin(self, n: usize) -> (usize, usize) {
        match self {
            Quadrant::SouthWest => (0, 0),
            Quadrant::SouthEast => (0, n - 1),
            Quadrant::NorthEast => (n - 1, n - 1),
            Quadrant::NorthWest => (n - 1, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_roundtrip() {
        for (rank, q) in Quadrant::ALL.iter().enumerate() {
            assert_eq!(q.rank(), rank);
            assert_eq!(Quadrant::from_rank(rank).unwrap(), *q);
        }
        assert!(matches!(
            Quadrant::from_rank(4),
            Err(QuadrantError::InvalidRank { rank: 4, size: 4 })
        ));
    }

    #[test]
    fn test_links_are_symmetric() {
        for q in Quadrant::ALL {
            for link in q.links() {
                let back = link
                    .peer
                    .links()
                    .into_iter()
                    .find(|l| l.peer == q)
                    .expect("peer must link back");
                assert_eq!(back.side, link.side.opposite(), "{q:?} <-> {:?}", link.peer);
            }
        }
    }

    #[test]
    fn test_every_link_joins_a_combiner_and_a_sender() {
        for q in Quadrant::ALL {
            for link in q.links() {
                assert_ne!(q.duty(), link.peer.duty());
            }
        }
    }

    #[test]
    fn test_adjacency_table() {
        let peers = |q: Quadrant| {
            let mut ranks: Vec<usize> = q.links().iter().map(|l| l.peer.rank()).collect();
            ranks.sort_unstable();
            ranks
        };
        assert_eq!(peers(Quadrant::SouthWest), vec![1, 3]);
        assert_eq!(peers(Quadrant::NorthEast), vec![1, 3]);
        assert_eq!(peers(Quadrant::SouthEast), vec![0, 2]);
        assert_eq!(peers(Quadrant::NorthWest), vec![0, 2]);
    }

    #[test]
    fn test_exactly_one_quadrant_counts_center() {
        let owners: Vec<Quadrant> = Quadrant::ALL
            .into_iter()
            .filter(|q| q.counts_center())
            .collect();
        assert_eq!(owners, vec![Quadrant::SouthWest]);
        assert_eq!(owners[0].duty(), Duty::Combiner);
    }

    #[test]
    fn test_center_cell_maps_to_global_center() {
        let n = 5;
        for q in Quadrant::ALL {
            let (ci, cj) = q.center_cell(n);
            let (oi, oj) = q.global_origin(n);
            assert_eq!((oi + ci, oj + cj), (n - 1, n - 1), "{q:?}");
        }
    }

    #[test]
    fn test_shared_sides_coincide_globally() {
        let n = 6;
        for q in Quadrant::ALL {
            let (oi, oj) = q.global_origin(n);
            for link in q.links() {
                let (pi, pj) = link.peer.global_origin(n);
                let peer_side = link.side.opposite();
                for k in 0..n {
                    let (i, j) = link.side.cell(n, k);
                    let (a, b) = peer_side.cell(n, k);
                    assert_eq!((oi + i, oj + j), (pi + a, pj + b));
                }
            }
        }
    }

    #[test]
    fn test_side_geometry() {
        let n = 4;
        assert_eq!(Side::North.cell(n, 2), (3, 2));
        assert_eq!(Side::North.inset_cell(n, 2), (2, 2));
        assert_eq!(Side::West.cell(n, 1), (1, 0));
        assert_eq!(Side::West.inset_cell(n, 1), (1, 1));
        assert_eq!(Side::East.along(2, 3), 2);
        assert_eq!(Side::South.along(0, 3), 3);
        assert!(Side::East.contains(n, 1, 3));
        assert!(!Side::East.contains(n, 1, 2));
    }
}
