use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
use serde::{Deserialize, Serialize};

use super::coord::Coord;

/// A falling piece: shape, board position and rotation state.
///
/// Pieces are plain values. Movement and rotation return new `Piece`
/// instances and leave collision checking to the caller.
///
/// # Coordinate System
///
/// - `position` is the top-left corner of the shape's bounding box in board space
/// - Each shape occupies a 2×2, 3×3 or 4×4 bounding box that rotates in place
///
/// # Example
///
/// ```
/// use blockfall_engine::{Coord, Piece, Rotation, Shape};
///
/// let piece = Piece::new(Shape::T, Coord::new(3, 2));
/// let moved = piece.shifted(Coord::RIGHT);
/// assert_eq!(moved.position(), Coord::new(4, 2));
/// assert_eq!(moved.rotation(), Rotation::R0);
/// assert_eq!(moved.cells().len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    shape: Shape,
    position: Coord,
    rotation: Rotation,
}

impl Piece {
    /// Creates a piece in its spawn orientation at `position`.
    #[must_use]
    pub const fn new(shape: Shape, position: Coord) -> Self {
        Self {
            shape,
            position,
            rotation: Rotation::R0,
        }
    }

    /// Creates a piece at the shape's spawn position for a board of the given size.
    #[must_use]
    pub fn spawn(shape: Shape, columns: u16, buffer_rows: u16) -> Self {
        Self::new(shape, shape.spawn_position(columns, buffer_rows))
    }

    #[must_use]
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    #[must_use]
    pub const fn position(&self) -> Coord {
        self.position
    }

    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    #[must_use]
    pub const fn color(&self) -> Color {
        self.shape.color()
    }

    /// Returns the absolute board cells covered by this piece.
    #[must_use]
    pub fn cells(&self) -> [Coord; 4] {
        self.shape
            .cells(self.rotation)
            .map(|offset| self.position + offset)
    }

    #[must_use]
    pub fn shifted(self, offset: Coord) -> Self {
        Self {
            position: self.position + offset,
            ..self
        }
    }

    #[must_use]
    pub fn with_rotation(self, rotation: Rotation) -> Self {
        Self { rotation, ..self }
    }
}

/// Rotation state of a piece.
///
/// `R0` is the spawn orientation and each following state is a further
/// 90° clockwise turn. Arithmetic wraps modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    R0,
    R1,
    R2,
    R3,
}

impl Rotation {
    pub const ALL: [Self; 4] = [Self::R0, Self::R1, Self::R2, Self::R3];

    /// Applies a rotation step, wrapping modulo 4.
    ///
    /// ```
    /// use blockfall_engine::{Rotation, RotationDelta};
    ///
    /// assert_eq!(Rotation::R3.rotated(RotationDelta::Cw), Rotation::R0);
    /// assert_eq!(Rotation::R0.rotated(RotationDelta::Ccw), Rotation::R3);
    /// assert_eq!(Rotation::R1.rotated(RotationDelta::Half), Rotation::R3);
    /// ```
    #[must_use]
    pub const fn rotated(self, delta: RotationDelta) -> Self {
        Self::from_index(self.index() + delta.clockwise_steps())
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    const fn from_index(index: usize) -> Self {
        match index % 4 {
            0 => Self::R0,
            1 => Self::R1,
            2 => Self::R2,
            _ => Self::R3,
        }
    }
}

/// A requested rotation: one step clockwise, one step counter-clockwise, or a half turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationDelta {
    /// +1 (90° clockwise).
    Cw,
    /// +2 (180°).
    Half,
    /// -1 (90° counter-clockwise).
    Ccw,
}

impl RotationDelta {
    const fn clockwise_steps(self) -> usize {
        match self {
            Self::Cw => 1,
            Self::Half => 2,
            Self::Ccw => 3,
        }
    }
}

/// Display color tag of a shape, stored in settled board cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Cyan,
    Yellow,
    Green,
    Red,
    Blue,
    Orange,
    Purple,
}

/// The seven tetromino shapes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[repr(u8)]
pub enum Shape {
    I = 0,
    O = 1,
    S = 2,
    Z = 3,
    J = 4,
    L = 5,
    T = 6,
}

impl Distribution<Shape> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Shape {
        Shape::ALL[rng.random_range(0..Shape::LEN)]
    }
}

impl Shape {
    /// Number of shapes (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        Self::I,
        Self::O,
        Self::S,
        Self::Z,
        Self::J,
        Self::L,
        Self::T,
    ];

    /// Relative cells of this shape in the given rotation state.
    ///
    /// Offsets are measured from the top-left of the bounding box.
    #[must_use]
    pub const fn cells(self, rotation: Rotation) -> [Coord; 4] {
        SHAPE_CELLS[self as usize][rotation.index()]
    }

    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::I => Color::Cyan,
            Self::O => Color::Yellow,
            Self::S => Color::Green,
            Self::Z => Color::Red,
            Self::J => Color::Blue,
            Self::L => Color::Orange,
            Self::T => Color::Purple,
        }
    }

    /// Side length of the shape's bounding box.
    #[must_use]
    pub const fn size(self) -> u16 {
        match self {
            Self::I => 4,
            Self::O => 2,
            Self::S | Self::Z | Self::J | Self::L | Self::T => 3,
        }
    }

    /// Top-left reference coordinate of a freshly spawned piece.
    ///
    /// The bounding box is centred horizontally (rounding left) and its top
    /// row sits two rows above the visible field, so the spawn footprint is
    /// entirely inside the hidden buffer.
    #[must_use]
    pub fn spawn_position(self, columns: u16, buffer_rows: u16) -> Coord {
        let x = columns.saturating_sub(self.size()) / 2;
        let y = i32::from(buffer_rows) - 2;
        Coord::new(i32::from(x), y)
    }
}

/// Occupancy of a shape inside its bounding box, indexed as `[y][x]`.
type ShapeMatrix = [[bool; 4]; 4];

/// Generates all 4 rotation states of a matrix by rotating 90° clockwise.
///
/// # Arguments
///
/// * `size` - Effective size of the shape (3 for most shapes, 4 for I, 2 for O)
/// * `matrix` - Initial matrix at `R0`
const fn matrix_rotations(size: usize, matrix: ShapeMatrix) -> [ShapeMatrix; 4] {
    let mut rotates = [matrix; 4];
    let mut i = 1;
    while i < 4 {
        let mut new_matrix = [[false; 4]; 4];
        let mut y = 0;
        while y < size {
            let mut x = 0;
            while x < size {
                new_matrix[y][x] = rotates[i - 1][size - 1 - x][y];
                x += 1;
            }
            y += 1;
        }
        rotates[i] = new_matrix;
        i += 1;
    }
    rotates
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const fn matrix_cells(matrix: &ShapeMatrix) -> [Coord; 4] {
    let mut cells = [Coord::ZERO; 4];
    let mut count = 0;
    let mut y = 0;
    while y < 4 {
        let mut x = 0;
        while x < 4 {
            if matrix[y][x] {
                assert!(count < 4, "a tetromino has exactly four cells");
                cells[count] = Coord::new(x as i32, y as i32);
                count += 1;
            }
            x += 1;
        }
        y += 1;
    }
    assert!(count == 4, "a tetromino has exactly four cells");
    cells
}

const fn shape_cells(size: usize, matrix: ShapeMatrix) -> [[Coord; 4]; 4] {
    let rotates = matrix_rotations(size, matrix);
    [
        matrix_cells(&rotates[0]),
        matrix_cells(&rotates[1]),
        matrix_cells(&rotates[2]),
        matrix_cells(&rotates[3]),
    ]
}

/// Geometry table: `[shape][rotation]` → relative cells, evaluated at compile time.
const SHAPE_CELLS: [[[Coord; 4]; 4]; Shape::LEN] = {
    const C: bool = true;
    const E: bool = false;
    const EEEE: [bool; 4] = [E; 4];
    [
        // I
        shape_cells(4, [EEEE, [C, C, C, C], EEEE, EEEE]),
        // O
        shape_cells(2, [[C, C, E, E], [C, C, E, E], EEEE, EEEE]),
        // S
        shape_cells(3, [[E, C, C, E], [C, C, E, E], EEEE, EEEE]),
        // Z
        shape_cells(3, [[C, C, E, E], [E, C, C, E], EEEE, EEEE]),
        // J
        shape_cells(3, [[C, E, E, E], [C, C, C, E], EEEE, EEEE]),
        // L
        shape_cells(3, [[E, E, C, E], [C, C, C, E], EEEE, EEEE]),
        // T
        shape_cells(3, [[E, C, E, E], [C, C, C, E], EEEE, EEEE]),
    ]
};
