use tracing::{debug, trace};

use crate::{
    PieceCollisionError,
    core::{
        board::Board,
        coord::Coord,
        kick::kick_candidates,
        piece::{Piece, RotationDelta, Shape},
    },
};

use super::{
    command::{Command, Direction},
    config::{ConfigError, EngineConfig, Millis},
    lateral::LateralInput,
    session_stats::SessionStats,
    shape_source::{RandomShapes, ShapeSeed, ShapeSource},
};

/// Result of a piece merging into the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockOutcome {
    /// Rows removed by the line clear that followed the lock.
    pub rows_cleared: usize,
    /// The locked piece reached into the hidden buffer and ended the session.
    pub topped_out: bool,
}

/// Owned copy of everything a renderer needs, detached from the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub board: Board,
    pub active_piece: Piece,
    pub ghost_piece: Piece,
    pub game_over: bool,
}

/// A running game: board, falling piece, timers and input state.
///
/// The session is a purely tick-driven state machine. It never reads a
/// clock: every operation receives `now`, a millisecond timestamp from the
/// caller's monotonic clock measured from session start. A driving loop
/// typically calls, once per tick:
///
/// 1. [`Session::apply`] for each pending input command
/// 2. [`Session::fall_tick`]
/// 3. [`Session::lateral_autorepeat_tick`]
/// 4. the read-only accessors to render
///
/// Illegal moves and rotations leave the state untouched and report it
/// through their return value. Once the game is over every mutating
/// operation is a no-op.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Command, EngineConfig, Session, Shape, ShapeSequence};
///
/// let mut session =
///     Session::with_source(EngineConfig::default(), ShapeSequence::new([Shape::I, Shape::T]))
///         .unwrap();
/// assert_eq!(session.active_piece().shape(), Shape::I);
///
/// session.apply(Command::HardDrop, 16);
/// assert_eq!(session.board().occupied_count(), 4);
/// assert_eq!(session.active_piece().shape(), Shape::T);
///
/// session.fall_tick(1020);
/// session.lateral_autorepeat_tick(1020);
/// assert!(!session.is_game_over());
/// ```
#[derive(Debug, Clone)]
pub struct Session<S = RandomShapes> {
    config: EngineConfig,
    board: Board,
    piece: Piece,
    source: S,
    stats: SessionStats,
    lateral: LateralInput,
    soft_dropping: bool,
    last_fall_time: Millis,
    last_move_time: Millis,
    /// Lock-delay refreshes spent since the piece last reached a new lowest row.
    lock_resets: u32,
    lowest_row: i32,
    game_over: bool,
}

impl Session<RandomShapes> {
    /// Creates a session with randomly drawn shapes.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_source(config, RandomShapes::new())
    }

    /// Like [`Self::new`], but with a reproducible shape sequence.
    pub fn with_seed(config: EngineConfig, seed: ShapeSeed) -> Result<Self, ConfigError> {
        Self::with_source(config, RandomShapes::with_seed(seed))
    }
}

impl<S> Session<S>
where
    S: ShapeSource,
{
    /// Creates a session drawing shapes from `source` and spawns the first piece at time `0`.
    ///
    /// Fails if `config` does not pass [`EngineConfig::validate`].
    pub fn with_source(config: EngineConfig, mut source: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::new(config.columns, config.visible_rows, config.buffer_rows);
        let piece = Piece::spawn(source.next_shape(), config.columns, config.buffer_rows);
        debug!(
            columns = config.columns,
            visible_rows = config.visible_rows,
            buffer_rows = config.buffer_rows,
            "session started"
        );
        Ok(Self {
            config,
            board,
            piece,
            source,
            stats: SessionStats::new(),
            lateral: LateralInput::default(),
            soft_dropping: false,
            last_fall_time: 0,
            last_move_time: 0,
            lock_resets: 0,
            lowest_row: piece.position().y,
            game_over: false,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn active_piece(&self) -> &Piece {
        &self.piece
    }

    /// Where the active piece would land if hard dropped now.
    #[must_use]
    pub fn ghost_piece(&self) -> Piece {
        self.board.drop_position(self.piece)
    }

    #[must_use]
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    #[must_use]
    pub fn is_soft_dropping(&self) -> bool {
        self.soft_dropping
    }

    /// Direction currently indicated by the held lateral keys.
    #[must_use]
    pub fn held_direction(&self) -> Option<Direction> {
        self.lateral.direction()
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.clone(),
            active_piece: self.piece,
            ghost_piece: self.ghost_piece(),
            game_over: self.game_over,
        }
    }

    /// Replaces the active piece, e.g. to set up a position.
    ///
    /// Timers are left alone. Fails without changes if the piece collides
    /// or the game is over.
    pub fn set_active_piece(&mut self, piece: Piece) -> Result<(), PieceCollisionError> {
        if self.game_over || self.board.is_colliding(&piece) {
            return Err(PieceCollisionError);
        }
        self.piece = piece;
        self.lock_resets = 0;
        self.lowest_row = piece.position().y;
        Ok(())
    }

    /// Applies one input command at time `now`.
    ///
    /// Returns whether the active piece or the board changed. Pressing a
    /// direction performs the first shift immediately; further shifts come
    /// from [`Self::lateral_autorepeat_tick`].
    pub fn apply(&mut self, command: Command, now: Millis) -> bool {
        if self.game_over {
            return false;
        }
        match command {
            Command::MoveLeftPressed => {
                self.lateral.press(Direction::Left, now);
                self.move_side(now)
            }
            Command::MoveRightPressed => {
                self.lateral.press(Direction::Right, now);
                self.move_side(now)
            }
            Command::MoveLeftReleased => {
                self.lateral.release(Direction::Left, now);
                false
            }
            Command::MoveRightReleased => {
                self.lateral.release(Direction::Right, now);
                false
            }
            Command::SoftDropPressed => {
                self.soft_dropping = true;
                false
            }
            Command::SoftDropReleased => {
                self.soft_dropping = false;
                false
            }
            Command::RotateCw => self.rotate(RotationDelta::Cw, now),
            Command::RotateCcw => self.rotate(RotationDelta::Ccw, now),
            Command::Rotate180 => self.rotate(RotationDelta::Half, now),
            Command::HardDrop => self.hard_drop(now).is_some(),
            Command::Quit => false,
        }
    }

    /// Replaces the active piece with a fresh one from the shape source.
    ///
    /// The new piece is placed at its spawn position in rotation `R0` without
    /// a collision check; a blocked spawn surfaces later as a game over.
    /// Gravity and lock-delay clocks restart at `now`.
    pub fn spawn_next(&mut self, now: Millis) {
        let shape = self.source.next_shape();
        self.piece = Piece::spawn(shape, self.config.columns, self.config.buffer_rows);
        self.last_fall_time = now;
        self.last_move_time = now;
        self.lock_resets = 0;
        self.lowest_row = self.piece.position().y;
        trace!(%shape, now, "piece spawned");
    }

    /// Moves the piece down one row.
    ///
    /// If the row below is blocked the piece stays put, an unforced
    /// [`Self::lock`] is attempted (it may be deferred by the lock delay) and
    /// `true` is returned. A successful move refreshes the lock-delay clock.
    pub fn move_down(&mut self, now: Millis) -> bool {
        if self.game_over {
            return false;
        }
        if self.try_shift(Coord::DOWN) {
            self.last_move_time = now;
            self.note_descent();
            return false;
        }
        self.lock(false, now);
        true
    }

    /// Shifts the piece one column in the direction indicated by the held keys.
    ///
    /// Does nothing when no direction is held. Returns whether the piece moved.
    pub fn move_side(&mut self, now: Millis) -> bool {
        if self.game_over {
            return false;
        }
        let Some(direction) = self.lateral.direction() else {
            return false;
        };
        if !self.try_shift(direction.offset()) {
            return false;
        }
        self.refresh_lock_delay(now);
        true
    }

    /// Rotates the piece using the wall-kick search.
    ///
    /// The O shape never rotates. A half turn is two counter-clockwise
    /// steps, each with its own kick search; if either step finds no
    /// placement the piece is left unchanged. Returns whether the piece
    /// rotated.
    pub fn rotate(&mut self, delta: RotationDelta, now: Millis) -> bool {
        if self.game_over || self.piece.shape() == Shape::O {
            return false;
        }
        let rotated = match delta {
            RotationDelta::Cw | RotationDelta::Ccw => self.kicked(self.piece, delta),
            RotationDelta::Half => self
                .kicked(self.piece, RotationDelta::Ccw)
                .and_then(|piece| self.kicked(piece, RotationDelta::Ccw)),
        };
        let Some(rotated) = rotated else {
            trace!(shape = %self.piece.shape(), ?delta, "rotation rejected");
            return false;
        };
        self.piece = rotated;
        self.note_descent();
        self.refresh_lock_delay(now);
        true
    }

    /// Searches the kick candidates of a single 90° step, first fit wins.
    fn kicked(&self, piece: Piece, delta: RotationDelta) -> Option<Piece> {
        let from = piece.rotation();
        let to = from.rotated(delta);
        let rotated = piece.with_rotation(to);
        kick_candidates(piece.shape(), from, to)
            .into_iter()
            .map(|offset| rotated.shifted(offset))
            .find(|candidate| !self.board.is_colliding(candidate))
    }

    /// Merges the piece into the board.
    ///
    /// Unless `force` is set, the lock is deferred (returning `None`) while
    /// less than the lock delay has passed since the last successful move.
    /// Otherwise the piece is settled, the rows it touched are checked for
    /// completion, the game-over condition is evaluated and, if the game
    /// goes on, the next piece spawns.
    pub fn lock(&mut self, force: bool, now: Millis) -> Option<LockOutcome> {
        if self.game_over {
            return None;
        }
        if !force && now.saturating_sub(self.last_move_time) < self.config.lock_delay_ms {
            return None;
        }

        let cells = self.piece.cells();
        self.board.settle(&cells, self.piece.color());
        let rows_cleared = self
            .board
            .clear_completed_rows(cells.iter().map(|cell| cell.y));
        self.stats.record_lock(rows_cleared);
        let topped_out = self.check_game_over(&cells);
        debug!(
            shape = %self.piece.shape(),
            x = self.piece.position().x,
            y = self.piece.position().y,
            rows_cleared,
            forced = force,
            "piece locked"
        );

        if !topped_out {
            self.spawn_next(now);
        }
        Some(LockOutcome {
            rows_cleared,
            topped_out,
        })
    }

    /// Ends the session if the piece that just locked reached into the hidden buffer.
    fn check_game_over(&mut self, locked_cells: &[Coord]) -> bool {
        if locked_cells
            .iter()
            .any(|cell| self.board.row_in_buffer_zone(cell.y))
        {
            self.game_over = true;
            debug!(
                locked_pieces = self.stats.locked_pieces(),
                cleared_rows = self.stats.cleared_rows(),
                "game over"
            );
        }
        self.game_over
    }

    /// Drops the piece as far as it goes and locks it immediately.
    pub fn hard_drop(&mut self, now: Millis) -> Option<LockOutcome> {
        if self.game_over {
            return None;
        }
        while self.try_shift(Coord::DOWN) {}
        self.lock(true, now)
    }

    /// Gravity step.
    ///
    /// When more than the active fall interval (the soft-drop interval while
    /// soft drop is held) has passed since the last scheduled fall, the
    /// schedule advances by exactly one interval and the piece moves down.
    /// Returns whether a gravity step was taken.
    pub fn fall_tick(&mut self, now: Millis) -> bool {
        if self.game_over {
            return false;
        }
        let interval = if self.soft_dropping {
            self.config.soft_drop_interval_ms
        } else {
            self.config.fall_interval_ms
        };
        if now.saturating_sub(self.last_fall_time) <= interval {
            return false;
        }
        self.last_fall_time += interval;
        self.move_down(now);
        true
    }

    /// Auto-repeat for held lateral keys.
    ///
    /// Once a direction has been held for the DAS duration, shifts the
    /// piece once per elapsed auto-repeat interval. Returns the number of
    /// shifts that moved the piece.
    pub fn lateral_autorepeat_tick(&mut self, now: Millis) -> usize {
        if self.game_over {
            return 0;
        }
        let due = self
            .lateral
            .due_repeats(now, self.config.das_ms, self.config.arr_ms);
        // Past one board width every extra shift would hit the wall
        let attempts = due.min(u64::from(self.config.columns));
        (0..attempts).filter(|_| self.move_side(now)).count()
    }

    fn try_shift(&mut self, offset: Coord) -> bool {
        let moved = self.piece.shifted(offset);
        if self.board.is_colliding(&moved) {
            return false;
        }
        self.piece = moved;
        true
    }

    fn is_grounded(&self) -> bool {
        self.board.is_colliding(&self.piece.shifted(Coord::DOWN))
    }

    /// Restarts the lock-delay clock after a lateral move or rotation,
    /// honouring the configured reset limit while the piece is grounded.
    fn refresh_lock_delay(&mut self, now: Millis) {
        if let Some(limit) = self.config.lock_reset_limit
            && self.is_grounded()
        {
            if self.lock_resets >= limit {
                return;
            }
            self.lock_resets += 1;
        }
        self.last_move_time = now;
    }

    fn note_descent(&mut self) {
        let y = self.piece.position().y;
        if y > self.lowest_row {
            self.lowest_row = y;
            self.lock_resets = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::{Color, Rotation, ShapeSequence};

    use super::*;

    fn session(shapes: &[Shape]) -> Session<ShapeSequence> {
        session_with(EngineConfig::default(), shapes)
    }

    fn session_with(config: EngineConfig, shapes: &[Shape]) -> Session<ShapeSequence> {
        Session::with_source(config, ShapeSequence::new(shapes.iter().copied())).unwrap()
    }

    fn fill(session: &mut Session<ShapeSequence>, cells: impl IntoIterator<Item = (i32, i32)>) {
        for (x, y) in cells {
            session
                .board
                .fill_cell(Coord::new(x, y), Some(Color::Blue));
        }
    }

    fn cell_set(piece: &Piece) -> HashSet<Coord> {
        piece.cells().into_iter().collect()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = EngineConfig {
            columns: 0,
            ..EngineConfig::default()
        };
        let err = Session::with_source(config, ShapeSequence::new([Shape::T])).unwrap_err();
        assert!(matches!(err, ConfigError::TooFewColumns { .. }));
    }

    #[test]
    fn test_first_piece_spawns_at_r0() {
        let session = session(&[Shape::J]);
        let piece = session.active_piece();
        assert_eq!(piece.shape(), Shape::J);
        assert_eq!(piece.rotation(), Rotation::R0);
        assert_eq!(piece.position(), Shape::J.spawn_position(10, 4));
        assert_eq!(session.board().occupied_count(), 0);
        assert!(!session.is_game_over());
    }

    mod movement {
        use super::*;

        #[test]
        fn test_move_down_moves_exactly_one_row() {
            let mut session = session(&[Shape::S]);
            fill(&mut session, [(0, 23), (9, 23)]);
            let board_before = session.board().clone();
            let before = *session.active_piece();

            assert!(!session.move_down(10));
            let after = *session.active_piece();
            assert_eq!(after.position(), before.position() + Coord::DOWN);
            assert_eq!(after.rotation(), before.rotation());
            assert_eq!(session.board(), &board_before);
        }

        #[test]
        fn test_move_side_needs_a_held_direction() {
            let mut session = session(&[Shape::T]);
            let before = *session.active_piece();
            assert!(!session.move_side(10));
            assert_eq!(session.active_piece(), &before);
        }

        #[test]
        fn test_press_shifts_immediately() {
            let mut session = session(&[Shape::T]);
            let x = session.active_piece().position().x;

            assert!(session.apply(Command::MoveLeftPressed, 10));
            assert_eq!(session.active_piece().position().x, x - 1);
            assert!(!session.apply(Command::MoveLeftReleased, 20));
            assert!(session.apply(Command::MoveRightPressed, 30));
            assert_eq!(session.active_piece().position().x, x);
        }

        #[test]
        fn test_blocked_shift_is_undone() {
            let mut session = session(&[Shape::O]);
            let piece = Piece::new(Shape::O, Coord::new(0, 10));
            session.set_active_piece(piece).unwrap();

            assert!(!session.apply(Command::MoveLeftPressed, 10));
            assert_eq!(session.active_piece(), &piece);

            // Settled blocks stop the piece as well
            fill(&mut session, [(2, 11)]);
            assert!(!session.apply(Command::MoveRightPressed, 20));
            assert_eq!(session.active_piece(), &piece);
        }

        #[test]
        fn test_auto_repeat_after_das() {
            let mut session = session(&[Shape::T]);
            // T spawns at x = 3, covering columns 3..=5
            session.apply(Command::MoveRightPressed, 1000);
            assert_eq!(session.active_piece().position().x, 4);

            assert_eq!(session.lateral_autorepeat_tick(1100), 0);
            assert_eq!(session.lateral_autorepeat_tick(1169), 0);
            assert_eq!(session.lateral_autorepeat_tick(1170), 1);
            assert_eq!(session.active_piece().position().x, 5);
            assert_eq!(session.lateral_autorepeat_tick(1200), 0);
            assert_eq!(session.lateral_autorepeat_tick(1220), 1);
            assert_eq!(session.active_piece().position().x, 6);

            // Two repeats are due, but the wall stops the second one
            assert_eq!(session.lateral_autorepeat_tick(1320), 1);
            assert_eq!(session.active_piece().position().x, 7);

            session.apply(Command::MoveRightReleased, 1330);
            assert_eq!(session.lateral_autorepeat_tick(5000), 0);
        }

        #[test]
        fn test_most_recent_direction_wins() {
            let mut session = session(&[Shape::T]);
            session.apply(Command::MoveRightPressed, 1000);
            session.apply(Command::MoveLeftPressed, 1050);
            assert_eq!(session.held_direction(), Some(Direction::Left));
            assert_eq!(session.active_piece().position().x, 3);

            // Releasing the newer key hands control back without an immediate shift
            session.apply(Command::MoveLeftReleased, 1100);
            assert_eq!(session.held_direction(), Some(Direction::Right));
            assert_eq!(session.active_piece().position().x, 3);
            assert_eq!(session.lateral_autorepeat_tick(1269), 0);
            assert_eq!(session.lateral_autorepeat_tick(1270), 1);
            assert_eq!(session.active_piece().position().x, 4);
        }
    }

    mod gravity {
        use super::*;

        #[test]
        fn test_fall_tick_waits_for_interval() {
            let mut session = session(&[Shape::T]);
            let y = session.active_piece().position().y;

            assert!(!session.fall_tick(500));
            assert!(!session.fall_tick(1000));
            assert!(session.fall_tick(1001));
            assert_eq!(session.active_piece().position().y, y + 1);
        }

        #[test]
        fn test_fall_schedule_does_not_drift() {
            let mut session = session(&[Shape::T]);
            let y = session.active_piece().position().y;

            // A late tick advances the schedule by one interval only
            assert!(session.fall_tick(1500));
            assert!(session.fall_tick(2001));
            assert!(!session.fall_tick(2500));
            assert_eq!(session.active_piece().position().y, y + 2);
        }

        #[test]
        fn test_soft_drop_uses_shorter_interval() {
            let mut session = session(&[Shape::T]);
            let y = session.active_piece().position().y;

            session.apply(Command::SoftDropPressed, 0);
            assert!(session.is_soft_dropping());
            assert!(!session.fall_tick(50));
            assert!(session.fall_tick(51));
            assert!(!session.fall_tick(60));
            assert!(session.fall_tick(101));
            assert_eq!(session.active_piece().position().y, y + 2);

            session.apply(Command::SoftDropReleased, 110);
            assert!(!session.is_soft_dropping());
            assert!(!session.fall_tick(160));
            assert_eq!(session.active_piece().position().y, y + 2);
        }
    }

    mod rotation {
        use super::*;

        #[test]
        fn test_rotate_in_open_space() {
            let mut session = session(&[Shape::T]);
            let position = session.active_piece().position();

            assert!(session.apply(Command::RotateCw, 10));
            assert_eq!(session.active_piece().rotation(), Rotation::R1);
            assert_eq!(session.active_piece().position(), position);

            assert!(session.apply(Command::RotateCcw, 20));
            assert_eq!(session.active_piece().rotation(), Rotation::R0);

            assert!(session.apply(Command::Rotate180, 30));
            assert_eq!(session.active_piece().rotation(), Rotation::R2);
            assert_eq!(session.active_piece().position(), position);
        }

        #[test]
        fn test_o_never_rotates() {
            let mut session = session(&[Shape::O]);
            let before = *session.active_piece();
            for command in [Command::RotateCw, Command::RotateCcw, Command::Rotate180] {
                assert!(!session.apply(command, 10));
                assert_eq!(session.active_piece(), &before);
            }
            for delta in [RotationDelta::Cw, RotationDelta::Ccw, RotationDelta::Half] {
                assert!(!session.rotate(delta, 20));
                assert_eq!(session.active_piece(), &before);
            }
        }

        #[test]
        fn test_t_against_left_wall_kicks_right() {
            let mut session = session(&[Shape::T]);
            // Pointing right and flush against the left wall: the bounding box
            // starts one column outside the board.
            let piece = Piece::new(Shape::T, Coord::new(-1, 10)).with_rotation(Rotation::R1);
            session.set_active_piece(piece).unwrap();
            assert!(session.board().is_colliding(&piece.with_rotation(Rotation::R2)));

            assert!(session.rotate(RotationDelta::Cw, 10));
            let rotated = session.active_piece();
            assert_eq!(rotated.rotation(), Rotation::R2);
            assert_eq!(rotated.position(), Coord::new(0, 10));
        }

        #[test]
        fn test_kick_candidates_are_tried_in_order() {
            let mut session = session(&[Shape::T]);
            let piece = Piece::new(Shape::T, Coord::new(0, 20));
            session.set_active_piece(piece).unwrap();
            // Blocks the in-place R1 placement but not the second candidate (one column left)
            fill(&mut session, [(1, 22)]);

            assert!(session.rotate(RotationDelta::Cw, 10));
            let rotated = session.active_piece();
            assert_eq!(rotated.rotation(), Rotation::R1);
            assert_eq!(rotated.position(), Coord::new(-1, 20));
            assert_eq!(
                cell_set(rotated),
                HashSet::from([(0, 20), (0, 21), (1, 21), (0, 22)].map(Coord::from))
            );
        }

        #[test]
        fn test_enclosed_piece_cannot_rotate() {
            let mut session = session(&[Shape::T]);
            let piece = Piece::new(Shape::T, Coord::new(3, 10));
            session.set_active_piece(piece).unwrap();
            let piece_cells = cell_set(&piece);
            let others: Vec<_> = (0..10)
                .flat_map(|x| (0..24).map(move |y| (x, y)))
                .filter(|&(x, y)| !piece_cells.contains(&Coord::new(x, y)))
                .collect();
            fill(&mut session, others);

            for delta in [RotationDelta::Cw, RotationDelta::Ccw, RotationDelta::Half] {
                assert!(!session.rotate(delta, 10));
                assert_eq!(session.active_piece(), &piece);
            }
        }

        #[test]
        fn test_half_turn_is_atomic_when_second_step_fails() {
            let mut session = session(&[Shape::I]);
            let piece = Piece::new(Shape::I, Coord::new(3, 10));
            session.set_active_piece(piece).unwrap();
            // Only the horizontal and the vertical (R3) placements fit. No R3 -> R2
            // kick lands the I back on row 11.
            let intermediate = piece.with_rotation(Rotation::R3);
            let open: HashSet<_> = cell_set(&piece)
                .union(&cell_set(&intermediate))
                .copied()
                .collect();
            let others: Vec<_> = (0..10)
                .flat_map(|x| (0..24).map(move |y| (x, y)))
                .filter(|&(x, y)| !open.contains(&Coord::new(x, y)))
                .collect();
            fill(&mut session, others);

            assert!(!session.rotate(RotationDelta::Half, 10));
            assert_eq!(session.active_piece(), &piece);

            assert!(session.rotate(RotationDelta::Ccw, 20));
            assert_eq!(session.active_piece(), &intermediate);
        }

        #[test]
        fn test_rotation_refreshes_lock_delay() {
            let config = EngineConfig {
                lock_delay_ms: 500,
                ..EngineConfig::default()
            };
            let mut session = session_with(config, &[Shape::T]);
            // Resting on the floor; the only fitting R1 placement is kicked up a row
            session
                .set_active_piece(Piece::new(Shape::T, Coord::new(3, 22)))
                .unwrap();

            assert!(session.rotate(RotationDelta::Cw, 400));
            assert_eq!(session.active_piece().position(), Coord::new(2, 21));
            assert!(session.move_down(800));
            assert_eq!(session.board().occupied_count(), 0);
            assert!(session.move_down(900));
            assert_eq!(session.board().occupied_count(), 4);
        }
    }

    mod locking {
        use super::*;

        fn fast_gravity() -> EngineConfig {
            EngineConfig {
                fall_interval_ms: 100,
                lock_delay_ms: 500,
                ..EngineConfig::default()
            }
        }

        #[test]
        fn test_lock_waits_for_full_delay_without_moves() {
            let mut session = session_with(fast_gravity(), &[Shape::O]);
            session
                .set_active_piece(Piece::new(Shape::O, Coord::new(4, 22)))
                .unwrap();

            for now in [101, 201, 301, 401] {
                assert!(session.fall_tick(now));
                assert_eq!(session.board().occupied_count(), 0, "locked early at {now}");
            }
            assert!(session.fall_tick(501));
            assert_eq!(session.board().occupied_count(), 4);
            assert_eq!(session.stats().locked_pieces(), 1);
        }

        #[test]
        fn test_successful_shift_defers_lock() {
            let mut session = session_with(fast_gravity(), &[Shape::O]);
            session
                .set_active_piece(Piece::new(Shape::O, Coord::new(4, 22)))
                .unwrap();

            assert!(session.fall_tick(101));
            assert!(session.apply(Command::MoveLeftPressed, 150));
            session.apply(Command::MoveLeftReleased, 160);

            for now in [201, 301, 401, 501, 601] {
                assert!(session.fall_tick(now));
                assert_eq!(session.board().occupied_count(), 0, "locked early at {now}");
            }
            assert!(session.fall_tick(701));
            assert_eq!(session.board().occupied_count(), 4);
            assert_eq!(session.board().cell(3, 23), Some(Color::Yellow));
        }

        #[test]
        fn test_failed_shift_does_not_defer_lock() {
            let mut session = session_with(fast_gravity(), &[Shape::O]);
            session
                .set_active_piece(Piece::new(Shape::O, Coord::new(0, 22)))
                .unwrap();

            assert!(!session.apply(Command::MoveLeftPressed, 450));
            assert!(session.move_down(500));
            assert_eq!(session.board().occupied_count(), 4);
        }

        #[test]
        fn test_lock_reset_limit() {
            let config = EngineConfig {
                lock_delay_ms: 500,
                lock_reset_limit: Some(2),
                ..EngineConfig::default()
            };
            let mut session = session_with(config, &[Shape::O]);
            session
                .set_active_piece(Piece::new(Shape::O, Coord::new(4, 22)))
                .unwrap();

            for (now, command) in [
                (100, Command::MoveLeftPressed),
                (110, Command::MoveLeftReleased),
                (200, Command::MoveRightPressed),
                (210, Command::MoveRightReleased),
                (300, Command::MoveLeftPressed),
            ] {
                session.apply(command, now);
            }
            // The third move no longer refreshed the clock
            assert!(session.move_down(699));
            assert_eq!(session.board().occupied_count(), 0);
            assert!(session.move_down(700));
            assert_eq!(session.board().occupied_count(), 4);
        }

        #[test]
        fn test_unlimited_resets_by_default() {
            let mut session = session(&[Shape::O]);
            session
                .set_active_piece(Piece::new(Shape::O, Coord::new(4, 22)))
                .unwrap();

            for step in 1..=20 {
                let now = step * 400;
                let command = if step % 2 == 0 {
                    Command::MoveLeftPressed
                } else {
                    Command::MoveRightPressed
                };
                assert!(session.apply(command, now));
                session.apply(Command::MoveLeftReleased, now);
                session.apply(Command::MoveRightReleased, now);
                assert!(session.move_down(now + 499));
                assert_eq!(session.board().occupied_count(), 0);
            }
        }

        #[test]
        fn test_lock_writes_four_cells_and_spawns() {
            let mut session = session(&[Shape::L, Shape::Z]);
            let outcome = session.lock(true, 10).unwrap();
            assert_eq!(
                outcome,
                LockOutcome {
                    rows_cleared: 0,
                    topped_out: true
                }
            );
            assert_eq!(session.board().occupied_count(), 4);

            // A lock below the buffer keeps the game going
            let mut second = super::session(&[Shape::L, Shape::Z]);
            second
                .set_active_piece(Piece::new(Shape::L, Coord::new(0, 10)))
                .unwrap();
            let outcome = second.lock(true, 10).unwrap();
            assert!(!outcome.topped_out);
            assert_eq!(second.board().occupied_count(), 4);
            assert_eq!(second.active_piece().shape(), Shape::Z);
        }

        #[test]
        fn test_deferred_lock_changes_nothing() {
            let mut session = session(&[Shape::T]);
            let before = *session.active_piece();
            assert_eq!(session.lock(false, 100), None);
            assert_eq!(session.active_piece(), &before);
            assert_eq!(session.board().occupied_count(), 0);
        }
    }

    mod scenarios {
        use super::*;

        #[test]
        fn test_hard_drop_i_on_empty_board() {
            let mut session = session(&[Shape::I, Shape::T]);
            assert_eq!(session.active_piece().rotation(), Rotation::R0);

            let outcome = session.hard_drop(100).unwrap();
            assert_eq!(outcome.rows_cleared, 0);
            assert!(!outcome.topped_out);

            let board = session.board();
            let bottom = board.total_rows() - 1;
            assert_eq!(bottom, 23);
            let occupied: Vec<_> = board
                .cells()
                .filter(|(_, _, cell)| cell.is_some())
                .map(|(x, y, _)| (x, y))
                .collect();
            assert_eq!(occupied, [(3, bottom), (4, bottom), (5, bottom), (6, bottom)]);
            assert!(
                occupied
                    .iter()
                    .all(|&(x, y)| board.cell(x, y) == Some(Color::Cyan))
            );

            let next = session.active_piece();
            assert_eq!(next.shape(), Shape::T);
            assert_eq!(next.position(), Shape::T.spawn_position(10, 4));
            assert_eq!(next.rotation(), Rotation::R0);
        }

        #[test]
        fn test_completed_row_is_removed() {
            let mut session = session(&[Shape::I, Shape::O]);
            // Bottom row filled except where the I piece will land
            fill(&mut session, [0, 1, 2, 7, 8, 9].map(|x| (x, 23)));
            fill(&mut session, [(0, 22), (9, 22), (0, 21)]);
            let before = session.board().occupied_count();
            assert_eq!(before, 9);

            let outcome = session.hard_drop(100).unwrap();
            assert_eq!(outcome.rows_cleared, 1);
            assert_eq!(session.board().occupied_count(), before + 4 - 10);

            let board = session.board();
            assert_eq!(board.cell(0, 23), Some(Color::Blue));
            assert_eq!(board.cell(9, 23), Some(Color::Blue));
            assert_eq!(board.cell(0, 22), Some(Color::Blue));
            assert_eq!(board.cell(9, 22), None);
            assert_eq!(board.cell(0, 21), None);
            assert_eq!(session.stats().cleared_rows(), 1);
        }

        #[test]
        fn test_multiple_rows_clear_together() {
            let mut session = session(&[Shape::I, Shape::O]);
            let vertical = Piece::new(Shape::I, Coord::new(-2, 10)).with_rotation(Rotation::R1);
            session.set_active_piece(vertical).unwrap();
            for y in 20..24 {
                fill(&mut session, (1..10).map(|x| (x, y)));
            }
            fill(&mut session, [(5, 19)]);

            let outcome = session.hard_drop(100).unwrap();
            assert_eq!(outcome.rows_cleared, 4);
            assert_eq!(session.board().occupied_count(), 1);
            assert_eq!(session.board().cell(5, 23), Some(Color::Blue));
        }

        #[test]
        fn test_stacking_in_one_column_ends_the_game() {
            let mut session = session(&[Shape::O]);
            let mut drops = 0;
            while !session.is_game_over() {
                session.hard_drop(drops * 100).unwrap();
                drops += 1;
                assert!(drops <= 11, "game should be over after 11 drops");
            }
            // 10 pieces fill the visible rows, the 11th locks inside the buffer
            assert_eq!(drops, 11);
            assert_eq!(session.stats().locked_pieces(), 11);
        }

        #[test]
        fn test_game_over_freezes_state() {
            let mut session = session(&[Shape::T]);
            session
                .set_active_piece(Piece::new(Shape::T, Coord::new(3, 1)))
                .unwrap();
            fill(&mut session, [(3, 3), (4, 3), (5, 3)]);

            let outcome = session.hard_drop(100).unwrap();
            assert!(outcome.topped_out);
            assert!(session.is_game_over());

            let board = session.board().clone();
            let piece = *session.active_piece();
            let commands = [
                Command::MoveLeftPressed,
                Command::MoveLeftReleased,
                Command::MoveRightPressed,
                Command::SoftDropPressed,
                Command::RotateCw,
                Command::RotateCcw,
                Command::Rotate180,
                Command::HardDrop,
                Command::Quit,
            ];
            for (now, command) in (200..).zip(commands) {
                assert!(!session.apply(command, now));
            }
            assert!(!session.fall_tick(100_000));
            assert_eq!(session.lateral_autorepeat_tick(100_000), 0);
            assert!(!session.move_down(100_000));
            assert!(!session.move_side(100_000));
            assert!(!session.rotate(RotationDelta::Cw, 100_000));
            assert_eq!(session.hard_drop(100_000), None);
            assert_eq!(session.lock(true, 100_000), None);
            assert!(session.set_active_piece(Piece::new(Shape::T, Coord::new(3, 10))).is_err());

            assert_eq!(session.board(), &board);
            assert_eq!(session.active_piece(), &piece);
            assert!(session.is_game_over());
            assert!(session.snapshot().game_over);
        }
    }

    #[test]
    fn test_ghost_and_snapshot() {
        let mut session = session(&[Shape::O]);
        let ghost = session.ghost_piece();
        assert_eq!(ghost.position(), Coord::new(4, 22));
        assert_eq!(ghost.shape(), Shape::O);

        let snapshot = session.snapshot();
        session.hard_drop(10);
        assert_eq!(snapshot.board.occupied_count(), 0);
        assert_eq!(snapshot.ghost_piece, ghost);
        assert!(!snapshot.game_over);
        assert_eq!(session.board().occupied_count(), 4);
    }

    #[test]
    fn test_set_active_piece_rejects_collisions() {
        let mut session = session(&[Shape::T]);
        let before = *session.active_piece();
        assert!(
            session
                .set_active_piece(Piece::new(Shape::T, Coord::new(9, 10)))
                .is_err()
        );
        assert_eq!(session.active_piece(), &before);
    }

    #[test]
    fn test_quit_is_ignored_by_engine() {
        let mut session = session(&[Shape::T]);
        let before = *session.active_piece();
        assert!(!session.apply(Command::Quit, 10));
        assert_eq!(session.active_piece(), &before);
    }
}
