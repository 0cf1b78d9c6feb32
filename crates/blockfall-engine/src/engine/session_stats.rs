/// Counters tracked over a session.
///
/// These are informational only; the engine has no scoring or levels.
///
/// # Example
///
/// ```
/// use blockfall_engine::SessionStats;
///
/// let mut stats = SessionStats::new();
/// stats.record_lock(2);
/// stats.record_lock(0);
///
/// assert_eq!(stats.locked_pieces(), 2);
/// assert_eq!(stats.cleared_rows(), 2);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionStats {
    locked_pieces: usize,
    cleared_rows: usize,
}

impl SessionStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            locked_pieces: 0,
            cleared_rows: 0,
        }
    }

    /// Number of pieces merged into the board.
    #[must_use]
    pub const fn locked_pieces(&self) -> usize {
        self.locked_pieces
    }

    /// Total number of rows removed by line clears.
    #[must_use]
    pub const fn cleared_rows(&self) -> usize {
        self.cleared_rows
    }

    /// Updates the counters after a piece locks.
    pub const fn record_lock(&mut self, cleared_rows: usize) {
        self.locked_pieces += 1;
        self.cleared_rows += cleared_rows;
    }
}
