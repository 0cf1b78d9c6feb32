//! Game state machine and its inputs.
//!
//! - [`Session`] - Board, falling piece, timers and game-over state
//! - [`EngineConfig`] - Board dimensions and timing, validated up front
//! - [`Command`] - Discrete player inputs fed to [`Session::apply`]
//! - [`ShapeSource`] - Where new pieces come from ([`RandomShapes`], [`ShapeSequence`])
//! - [`SessionStats`] - Locked piece and cleared row counters
//!
//! # Tick Order
//!
//! The session never samples a clock. The driving loop reads its monotonic
//! clock once per tick and passes that timestamp to every call made during
//! the tick:
//!
//! 1. translate pending input into [`Command`]s and [`Session::apply`] them
//! 2. [`Session::fall_tick`]
//! 3. [`Session::lateral_autorepeat_tick`]
//! 4. render from [`Session::board`], [`Session::active_piece`] and friends
//!
//! # Example
//!
//! ```
//! use blockfall_engine::{Command, EngineConfig, Session};
//!
//! let mut session = Session::new(EngineConfig::default()).unwrap();
//!
//! let mut now = 0;
//! session.apply(Command::MoveLeftPressed, now);
//! session.apply(Command::MoveLeftReleased, now);
//! while !session.is_game_over() && session.stats().locked_pieces() < 3 {
//!     now += 16;
//!     session.apply(Command::HardDrop, now);
//!     session.fall_tick(now);
//!     session.lateral_autorepeat_tick(now);
//! }
//! assert_eq!(session.stats().locked_pieces(), 3);
//! ```

pub use self::{command::*, config::*, session::*, session_stats::*, shape_source::*};

mod command;
mod config;
mod lateral;
mod session;
mod session_stats;
mod shape_source;
