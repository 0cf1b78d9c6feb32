use blockfall_engine::{Command, Millis, Session, ShapeSeed};
use blockfall_runtime::{App, RenderMode, Runtime};
use crossterm::event::Event;
use ratatui::Frame;
use tracing::{debug, info};

use super::input::KeyInput;
use crate::view::SessionView;

const FPS: f64 = 60.0;

#[derive(Debug)]
pub(crate) struct PlayApp {
    session: Session,
    seed: ShapeSeed,
    input: KeyInput,
    is_exiting: bool,
}

impl PlayApp {
    pub(crate) fn new(session: Session, seed: ShapeSeed) -> Self {
        Self {
            session,
            seed,
            input: KeyInput::default(),
            is_exiting: false,
        }
    }

    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    fn apply(&mut self, command: Command, now: Millis) {
        if command.is_quit() {
            info!("quit requested");
            self.is_exiting = true;
            return;
        }
        let changed = self.session.apply(command, now);
        debug!(?command, now, changed, "input applied");
    }
}

impl App for PlayApp {
    fn init(&mut self, runtime: &mut Runtime) {
        runtime.set_tick_rate(Some(FPS));
        runtime.set_render_mode(RenderMode::throttled_from_rate(FPS));
        runtime.request_key_releases(true);
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, runtime: &mut Runtime, event: Event) {
        let Some(key) = event.as_key_event() else {
            return;
        };
        self.input
            .set_releases_reported(runtime.key_releases_reported());
        let now = runtime.clock().now_ms();
        for command in self.input.translate(&key, now) {
            self.apply(command, now);
        }
    }

    fn update(&mut self, _runtime: &mut Runtime, now_ms: Millis) {
        if let Some(command) = self.input.expire(now_ms) {
            self.apply(command, now_ms);
        }
        self.session.fall_tick(now_ms);
        self.session.lateral_autorepeat_tick(now_ms);
    }

    fn draw(&self, frame: &mut Frame) {
        let snapshot = self.session.snapshot();
        frame.render_widget(
            SessionView::new(&snapshot, self.session.stats(), self.seed),
            frame.area(),
        );
    }
}
