use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::event;

use crate::event::TuiEvent;

/// When the screen is redrawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Redraw after every tick or terminal event.
    #[default]
    OnDirty,
    /// Redraw after changes, at most once per interval.
    ///
    /// Changes arriving faster than the interval are batched into one redraw.
    Throttled(Duration),
}

impl RenderMode {
    /// Creates `Throttled` mode from a frame rate (FPS).
    #[must_use]
    pub fn throttled_from_rate(rate: f64) -> Self {
        Self::Throttled(Duration::from_secs_f64(1.0 / rate))
    }
}

/// Schedules ticks and redraws between terminal events.
///
/// Ticks are scheduled on a fixed grid: a late tick does not push the
/// following ones back.
#[derive(Debug)]
pub(super) struct EventLoop {
    tick_interval: Option<Duration>,
    render_mode: RenderMode,
    next_tick: Instant,
    last_render: Option<Instant>,
    dirty: bool,
}

impl EventLoop {
    pub(super) fn new(now: Instant) -> Self {
        Self {
            tick_interval: None,
            render_mode: RenderMode::default(),
            next_tick: now,
            last_render: None,
            dirty: true,
        }
    }

    pub(super) fn set_tick_interval(&mut self, interval: Option<Duration>) {
        self.tick_interval = interval;
    }

    pub(super) fn set_render_mode(&mut self, render_mode: RenderMode) {
        self.render_mode = render_mode;
    }

    /// Returns the next event, blocking until a tick or redraw is due or a
    /// terminal event arrives.
    pub(super) fn next(&mut self) -> io::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if let Some(event) = self.due_event(now) {
                return Ok(event);
            }
            if let Some(timeout) = self.timeout(now)
                && !event::poll(timeout)?
            {
                continue;
            }
            self.dirty = true;
            return Ok(event::read()?.into());
        }
    }

    /// Returns the tick or redraw that is due at `now`, if any, and records it.
    fn due_event(&mut self, now: Instant) -> Option<TuiEvent> {
        if let Some(interval) = self.tick_interval
            && now >= self.next_tick
        {
            self.next_tick += interval;
            // Skip missed slots after a long stall instead of bursting through them
            if self.next_tick < now {
                self.next_tick = now + interval;
            }
            self.dirty = true;
            return Some(TuiEvent::Tick(now));
        }

        if self.dirty && self.render_allowed(now) {
            self.dirty = false;
            self.last_render = Some(now);
            return Some(TuiEvent::Render);
        }
        None
    }

    fn render_allowed(&self, now: Instant) -> bool {
        match (self.render_mode, self.last_render) {
            (RenderMode::OnDirty, _) | (_, None) => true,
            (RenderMode::Throttled(interval), Some(last)) => now.duration_since(last) >= interval,
        }
    }

    /// How long to wait for terminal input before the next tick or redraw is due.
    ///
    /// `None` means wait indefinitely.
    fn timeout(&self, now: Instant) -> Option<Duration> {
        let next_tick_at = self.tick_interval.map(|_| self.next_tick);
        let next_render_at = match (self.render_mode, self.last_render) {
            _ if !self.dirty => None,
            (RenderMode::OnDirty, _) | (_, None) => Some(now),
            (RenderMode::Throttled(interval), Some(last)) => Some(last + interval),
        };
        let next_at = [next_tick_at, next_render_at].into_iter().flatten().min()?;
        Some(next_at.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(16);

    fn ticking(start: Instant) -> EventLoop {
        let mut events = EventLoop::new(start);
        events.set_tick_interval(Some(TICK));
        events.set_render_mode(RenderMode::Throttled(Duration::from_millis(30)));
        events
    }

    #[test]
    fn test_first_tick_and_render_are_immediate() {
        let start = Instant::now();
        let mut events = ticking(start);
        assert_eq!(events.due_event(start), Some(TuiEvent::Tick(start)));
        assert_eq!(events.due_event(start), Some(TuiEvent::Render));
        assert_eq!(events.due_event(start), None);
    }

    #[test]
    fn test_ticks_follow_a_fixed_grid() {
        let start = Instant::now();
        let mut events = ticking(start);
        events.set_render_mode(RenderMode::OnDirty);
        events.due_event(start);
        events.due_event(start);

        let late = start + Duration::from_millis(20);
        assert!(events.due_event(late).is_some_and(|e| e.is_tick()));
        assert!(events.due_event(late).is_some_and(|e| e.is_render()));
        // The next slot is still 32ms after start, not 16ms after the late tick
        assert_eq!(events.timeout(late), Some(Duration::from_millis(12)));
    }

    #[test]
    fn test_render_is_throttled() {
        let start = Instant::now();
        let mut events = ticking(start);
        events.set_tick_interval(None);
        assert_eq!(events.due_event(start), Some(TuiEvent::Render));

        events.dirty = true;
        let soon = start + Duration::from_millis(10);
        assert_eq!(events.due_event(soon), None);
        assert_eq!(events.timeout(soon), Some(Duration::from_millis(20)));
        assert_eq!(
            events.due_event(start + Duration::from_millis(30)),
            Some(TuiEvent::Render)
        );
    }

    #[test]
    fn test_idle_loop_waits_for_input() {
        let start = Instant::now();
        let mut events = EventLoop::new(start);
        assert_eq!(events.due_event(start), Some(TuiEvent::Render));
        assert_eq!(events.timeout(start), None);
    }

    #[test]
    fn test_stall_skips_missed_ticks() {
        let start = Instant::now();
        let mut events = ticking(start);
        events.due_event(start);

        let stalled = start + Duration::from_secs(1);
        assert_eq!(events.due_event(stalled), Some(TuiEvent::Tick(stalled)));
        assert!(events.due_event(stalled).is_some_and(|e| e.is_render()));
        assert_eq!(events.due_event(stalled), None);
    }
}
