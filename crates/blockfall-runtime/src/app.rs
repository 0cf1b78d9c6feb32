use crossterm::event::Event;
use ratatui::Frame;

use crate::Runtime;

/// Trait for applications driven by [`Runtime::run()`].
pub trait App {
    /// Called once before the terminal is set up. Configure tick rate,
    /// render mode and input reporting here.
    fn init(&mut self, runtime: &mut Runtime);

    /// Returns whether the application should exit.
    fn should_exit(&self) -> bool;

    /// Handles terminal events (key input, mouse, resize, etc.).
    ///
    /// Events arrive between ticks. Time-sensitive work belongs in
    /// [`App::update`], which receives the tick timestamp.
    fn handle_event(&mut self, runtime: &mut Runtime, event: Event);

    /// Advances the application by one tick.
    ///
    /// `now_ms` is sampled once per tick from the runtime's [`Clock`](crate::Clock).
    fn update(&mut self, runtime: &mut Runtime, now_ms: u64);

    /// Draws the screen.
    fn draw(&self, frame: &mut Frame);
}
