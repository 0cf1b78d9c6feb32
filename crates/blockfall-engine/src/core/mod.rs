pub use self::{board::*, coord::*, kick::*, piece::*};

pub(crate) mod board;
pub(crate) mod coord;
pub(crate) mod kick;
pub(crate) mod piece;
