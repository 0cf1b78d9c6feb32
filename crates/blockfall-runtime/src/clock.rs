use std::time::Instant;

/// Monotonic millisecond clock anchored at its creation.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin: Instant,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Milliseconds from the clock origin to `instant`.
    ///
    /// Instants before the origin map to `0`.
    #[must_use]
    pub fn millis_at(&self, instant: Instant) -> u64 {
        let elapsed = instant.saturating_duration_since(self.origin);
        u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
    }

    /// Milliseconds elapsed since the clock origin.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.millis_at(Instant::now())
    }
}
