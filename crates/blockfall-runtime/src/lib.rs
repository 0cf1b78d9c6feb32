//! Terminal event loop for tick-driven games.
//!
//! [`Runtime`] owns the terminal and a monotonic [`Clock`]. It drives an
//! [`App`] with fixed-rate ticks, each stamped once with the elapsed
//! milliseconds since the runtime was created, and with throttled redraws.

pub use self::{app::App, clock::Clock, event_loop::RenderMode, runtime::Runtime};

mod app;
mod clock;
mod event;
mod event_loop;
mod runtime;
