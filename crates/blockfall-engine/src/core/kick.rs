//! Super Rotation System wall-kick data.
//!
//! When a rotation would collide, the candidate offsets for the transition
//! are tried in order and the first placement that fits wins. The first
//! candidate is always `(0, 0)`, the in-place rotation.
//!
//! The tables below are written in the published "up is positive"
//! convention. [`to_board_space`] is the single place where they are
//! converted into the engine's downward-growing board space.

use arrayvec::ArrayVec;

use super::{
    coord::Coord,
    piece::{Rotation, RotationDelta, Shape},
};

/// Number of candidates tried per rotation step.
pub const KICK_CANDIDATES: usize = 5;

type KickRow = [Coord; KICK_CANDIDATES];

const fn row(offsets: [(i32, i32); KICK_CANDIDATES]) -> KickRow {
    let mut row = [Coord::ZERO; KICK_CANDIDATES];
    let mut i = 0;
    while i < KICK_CANDIDATES {
        row[i] = Coord::new(offsets[i].0, offsets[i].1);
        i += 1;
    }
    row
}

/// `[from][direction]`, direction `0` is clockwise and `1` counter-clockwise.
type KickTable = [[KickRow; 2]; 4];

const JLSTZ_KICKS: KickTable = [
    // R0 -> R1, R0 -> R3
    [
        row([(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)]),
        row([(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)]),
    ],
    // R1 -> R2, R1 -> R0
    [
        row([(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)]),
        row([(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)]),
    ],
    // R2 -> R3, R2 -> R1
    [
        row([(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)]),
        row([(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)]),
    ],
    // R3 -> R0, R3 -> R2
    [
        row([(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)]),
        row([(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)]),
    ],
];

const I_KICKS: KickTable = [
    // R0 -> R1, R0 -> R3
    [
        row([(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)]),
        row([(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)]),
    ],
    // R1 -> R2, R1 -> R0
    [
        row([(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)]),
        row([(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)]),
    ],
    // R2 -> R3, R2 -> R1
    [
        row([(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)]),
        row([(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)]),
    ],
    // R3 -> R0, R3 -> R2
    [
        row([(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)]),
        row([(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)]),
    ],
];

/// Converts an offset authored with "up is positive" into board space.
const fn to_board_space(offset: Coord) -> Coord {
    offset.flip_y()
}

/// Returns the ordered wall-kick candidates for rotating `shape` from `from` to `to`,
/// already converted to board space.
///
/// The result is empty when no kick search applies: the O shape never
/// rotates, and only single clockwise or counter-clockwise steps have kick
/// data (a half turn is performed as two counter-clockwise steps).
///
/// # Example
///
/// ```
/// use blockfall_engine::{Coord, Rotation, Shape, kick_candidates};
///
/// let kicks = kick_candidates(Shape::T, Rotation::R0, Rotation::R1);
/// assert_eq!(kicks.len(), 5);
/// assert_eq!(kicks[0], Coord::ZERO);
/// assert!(kick_candidates(Shape::O, Rotation::R0, Rotation::R1).is_empty());
/// ```
#[must_use]
pub fn kick_candidates(
    shape: Shape,
    from: Rotation,
    to: Rotation,
) -> ArrayVec<Coord, KICK_CANDIDATES> {
    let table = match shape {
        Shape::O => return ArrayVec::new(),
        Shape::I => &I_KICKS,
        Shape::S | Shape::Z | Shape::J | Shape::L | Shape::T => &JLSTZ_KICKS,
    };
    let direction = if to == from.rotated(RotationDelta::Cw) {
        0
    } else if to == from.rotated(RotationDelta::Ccw) {
        1
    } else {
        return ArrayVec::new();
    };
    table[from.index()][direction]
        .iter()
        .copied()
        .map(to_board_space)
        .collect()
}
