use crate::Coord;

/// Horizontal movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    #[must_use]
    pub const fn offset(self) -> Coord {
        match self {
            Self::Left => Coord::LEFT,
            Self::Right => Coord::RIGHT,
        }
    }
}

/// Discrete input delivered to a [`Session`](crate::Session).
///
/// Hold-style inputs come as press/release pairs whose timestamps drive
/// delayed auto shift. The remaining commands act once per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum Command {
    MoveLeftPressed,
    MoveLeftReleased,
    MoveRightPressed,
    MoveRightReleased,
    SoftDropPressed,
    SoftDropReleased,
    RotateCw,
    RotateCcw,
    Rotate180,
    HardDrop,
    /// Ends the session. The engine ignores it; the driving loop stops ticking.
    Quit,
}
