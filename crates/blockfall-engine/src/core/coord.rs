use serde::{Deserialize, Serialize};

/// Integer 2D vector used for board positions and cell offsets.
///
/// Board space has `x` growing to the right and `y` growing **downward**:
/// row `0` is the topmost hidden buffer row.
///
/// # Example
///
/// ```
/// use blockfall_engine::Coord;
///
/// let position = Coord::new(3, 2);
/// assert_eq!(position + Coord::DOWN, Coord::new(3, 3));
/// assert_eq!(position - Coord::new(1, 1), Coord::new(2, 1));
/// ```
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ZERO: Self = Self::new(0, 0);
    pub const LEFT: Self = Self::new(-1, 0);
    pub const RIGHT: Self = Self::new(1, 0);
    pub const DOWN: Self = Self::new(0, 1);

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Mirrors the vertical component.
    ///
    /// Converts between the "up is positive" convention of published
    /// rotation data and the engine's "down is positive" board space.
    #[must_use]
    pub const fn flip_y(self) -> Self {
        Self::new(self.x, -self.y)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_returns_new_values() {
        let a = Coord::new(2, -3);
        let b = Coord::new(-5, 7);
        assert_eq!(a + b, Coord::new(-3, 4));
        assert_eq!(a - b, Coord::new(7, -10));
        assert_eq!(a + b - b, a);
        assert_eq!(a, Coord::new(2, -3));
    }

    #[test]
    fn test_flip_y_is_an_involution() {
        let c = Coord::new(1, 2);
        assert_eq!(c.flip_y(), Coord::new(1, -2));
        assert_eq!(c.flip_y().flip_y(), c);
        assert_eq!(Coord::ZERO.flip_y(), Coord::ZERO);
    }
}
