use super::{command::Direction, config::Millis};

/// Held-key state for sideways movement and its auto-repeat clock.
#[derive(Debug, Clone, Default)]
pub(crate) struct LateralInput {
    left_held: bool,
    right_held: bool,
    last_pressed: Option<Direction>,
    /// Time of the most recent press or release of either direction.
    edge_time: Millis,
    /// Auto-repeat shifts already reported since `edge_time`.
    repeats_done: u64,
}

impl LateralInput {
    pub(crate) fn press(&mut self, direction: Direction, now: Millis) {
        match direction {
            Direction::Left => self.left_held = true,
            Direction::Right => self.right_held = true,
        }
        self.last_pressed = Some(direction);
        self.edge(now);
    }

    pub(crate) fn release(&mut self, direction: Direction, now: Millis) {
        match direction {
            Direction::Left => self.left_held = false,
            Direction::Right => self.right_held = false,
        }
        self.edge(now);
    }

    fn edge(&mut self, now: Millis) {
        self.edge_time = now;
        self.repeats_done = 0;
    }

    /// Direction currently indicated by the held keys.
    ///
    /// With both keys held the most recently pressed one wins.
    pub(crate) fn direction(&self) -> Option<Direction> {
        match (self.left_held, self.right_held) {
            (true, true) => self.last_pressed,
            (true, false) => Some(Direction::Left),
            (false, true) => Some(Direction::Right),
            (false, false) => None,
        }
    }

    /// Counts the auto-repeat shifts that became due by `now` and advances the baseline past them.
    ///
    /// Nothing is due while no direction is held or before `das` has elapsed
    /// since the last edge. Repeat `n` (counting from zero) is due at
    /// `edge + das + n * arr`, so the first one fires exactly when DAS
    /// expires and later ones stay on that grid without drift.
    pub(crate) fn due_repeats(&mut self, now: Millis, das: Millis, arr: Millis) -> u64 {
        if self.direction().is_none() || now < self.edge_time || now - self.edge_time < das {
            return 0;
        }
        let total = (now - self.edge_time - das) / arr + 1;
        let due = total.saturating_sub(self.repeats_done);
        self.repeats_done = total.max(self.repeats_done);
        due
    }
}
