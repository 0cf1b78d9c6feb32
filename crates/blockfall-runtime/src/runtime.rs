use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, terminal,
};
use ratatui::DefaultTerminal;
use tracing::{debug, warn};

use crate::{
    App, Clock,
    event::TuiEvent,
    event_loop::{EventLoop, RenderMode},
};

/// Terminal application runtime.
///
/// Owns the event loop and the session clock, and executes applications
/// that implement the [`App`] trait.
#[derive(Debug)]
pub struct Runtime {
    events: EventLoop,
    clock: Clock,
    want_key_releases: bool,
    key_releases: bool,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// Creates a runtime whose clock starts now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: EventLoop::new(Instant::now()),
            clock: Clock::new(),
            want_key_releases: false,
            key_releases: false,
        }
    }

    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Sets the tick rate (Hz, ticks per second).
    pub fn set_tick_rate(&mut self, rate: Option<f64>) {
        self.set_tick_interval(rate.map(|rate| Duration::from_secs_f64(1.0 / rate)));
    }

    /// Sets the tick interval. `None` disables ticks.
    pub fn set_tick_interval(&mut self, interval: Option<Duration>) {
        self.events.set_tick_interval(interval);
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.events.set_render_mode(mode);
    }

    /// Asks the terminal to report key release and repeat events.
    ///
    /// Takes effect when [`Self::run`] sets up the terminal, and only on
    /// terminals that support the keyboard enhancement protocol. Check
    /// [`Self::key_releases_reported`] once running.
    pub fn request_key_releases(&mut self, enable: bool) {
        self.want_key_releases = enable;
    }

    /// Returns whether the terminal delivers key release events.
    #[must_use]
    pub fn key_releases_reported(&self) -> bool {
        self.key_releases
    }

    /// Runs the application.
    ///
    /// 1. Calls `app.init()` for initialization
    /// 2. Sets up the terminal, enabling key release reporting if requested
    /// 3. Runs the event loop until `app.should_exit()` returns true
    ///    - Tick: calls `app.update()` with the tick timestamp
    ///    - Render: calls `app.draw()`
    ///    - Terminal event: calls `app.handle_event()`
    pub fn run<A>(mut self, app: &mut A) -> io::Result<()>
    where
        A: App,
    {
        app.init(&mut self);

        ratatui::run(|terminal| {
            self.key_releases = self.want_key_releases && enable_key_releases();
            let result = self.event_loop(terminal, app);
            if self.key_releases {
                execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
            }
            result
        })
    }

    fn event_loop<A>(&mut self, terminal: &mut DefaultTerminal, app: &mut A) -> io::Result<()>
    where
        A: App,
    {
        while !app.should_exit() {
            match self.events.next()? {
                TuiEvent::Tick(at) => {
                    let now_ms = self.clock.millis_at(at);
                    app.update(self, now_ms);
                }
                TuiEvent::Render => {
                    terminal.draw(|f| app.draw(f))?;
                }
                TuiEvent::Crossterm(event) => {
                    app.handle_event(self, event);
                }
            }
        }
        Ok(())
    }
}

fn enable_key_releases() -> bool {
    match terminal::supports_keyboard_enhancement() {
        Ok(true) => {}
        Ok(false) => {
            debug!("terminal does not support keyboard enhancement");
            return false;
        }
        Err(err) => {
            warn!(%err, "failed to query keyboard enhancement support");
            return false;
        }
    }
    let flags = KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES;
    match execute!(io::stdout(), PushKeyboardEnhancementFlags(flags)) {
        Ok(()) => {
            debug!("key release reporting enabled");
            true
        }
        Err(err) => {
            warn!(%err, "failed to enable key release reporting");
            false
        }
    }
}
