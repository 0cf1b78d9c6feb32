use super::{
    coord::Coord,
    piece::{Color, Piece},
};

/// A single row of settled cells.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BoardRow {
    cells: Box<[Option<Color>]>,
}

impl BoardRow {
    fn empty(columns: usize) -> Self {
        Self {
            cells: vec![None; columns].into_boxed_slice(),
        }
    }

    fn is_filled(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }
}

/// Occupancy grid of settled cells.
///
/// The grid is `buffer_rows + visible_rows` tall. Row `0` is the topmost
/// hidden buffer row and the visible play field starts at row
/// `buffer_rows`. Only locked pieces are ever written here; the falling
/// piece lives in the session until it settles.
///
/// # Collision rules
///
/// A position is blocked when it lies left or right of the grid, at or
/// below `total_rows()`, or on an occupied cell. Positions above the grid
/// (negative `y`) are free as long as they are horizontally in bounds, so
/// pieces may rotate partly above the buffer.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, Color, Coord};
///
/// let mut board = Board::new(10, 20, 4);
/// assert!(!board.is_blocked(Coord::new(0, 23)));
/// assert!(board.is_blocked(Coord::new(0, 24)));
/// assert!(board.is_blocked(Coord::new(-1, 5)));
/// assert!(!board.is_blocked(Coord::new(4, -2)));
///
/// board.settle(&[Coord::new(0, 23)], Color::Red);
/// assert!(board.is_blocked(Coord::new(0, 23)));
/// assert_eq!(board.occupied_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    columns: u16,
    visible_rows: u16,
    buffer_rows: u16,
    rows: Vec<BoardRow>,
}

impl Board {
    /// Creates an empty board.
    #[must_use]
    pub fn new(columns: u16, visible_rows: u16, buffer_rows: u16) -> Self {
        let total_rows = usize::from(visible_rows) + usize::from(buffer_rows);
        Self {
            columns,
            visible_rows,
            buffer_rows,
            rows: vec![BoardRow::empty(usize::from(columns)); total_rows],
        }
    }

    #[must_use]
    pub const fn columns(&self) -> u16 {
        self.columns
    }

    #[must_use]
    pub const fn visible_rows(&self) -> u16 {
        self.visible_rows
    }

    #[must_use]
    pub const fn buffer_rows(&self) -> u16 {
        self.buffer_rows
    }

    /// Height of the whole grid, hidden buffer included.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    fn index(&self, position: Coord) -> Option<(usize, usize)> {
        let x = usize::try_from(position.x)
            .ok()
            .filter(|x| *x < usize::from(self.columns))?;
        let y = usize::try_from(position.y)
            .ok()
            .filter(|y| *y < self.rows.len())?;
        Some((x, y))
    }

    /// Returns the settled color at `(column, row)`, or `None` for an empty or out-of-range cell.
    #[must_use]
    pub fn cell(&self, column: usize, row: usize) -> Option<Color> {
        self.rows.get(row)?.cells.get(column).copied().flatten()
    }

    /// Returns whether a piece cell may not occupy `position`.
    #[must_use]
    pub fn is_blocked(&self, position: Coord) -> bool {
        if position.y < 0 {
            return position.x < 0 || position.x >= i32::from(self.columns);
        }
        match self.index(position) {
            Some((x, y)) => self.rows[y].cells[x].is_some(),
            None => true,
        }
    }

    /// Returns whether any cell of `piece` is blocked.
    #[must_use]
    pub fn is_colliding(&self, piece: &Piece) -> bool {
        piece.cells().into_iter().any(|cell| self.is_blocked(cell))
    }

    /// Writes `cells` into the board with `color`.
    ///
    /// The caller is responsible for having checked that none of the cells
    /// is blocked. Cells above the top of the grid have nowhere to go and
    /// are dropped.
    pub fn settle(&mut self, cells: &[Coord], color: Color) {
        for &cell in cells {
            if let Some((x, y)) = self.index(cell) {
                self.rows[y].cells[x] = Some(color);
            }
        }
    }

    /// Sets or clears a single cell. Out-of-range positions are ignored.
    ///
    /// Useful for preparing board layouts outside of normal play.
    pub fn fill_cell(&mut self, position: Coord, color: Option<Color>) {
        if let Some((x, y)) = self.index(position) {
            self.rows[y].cells[x] = color;
        }
    }

    /// Removes every complete row among `candidate_rows` and returns how many were removed.
    ///
    /// Each removed row is replaced by an empty row inserted at the top, so
    /// rows above it shift down by one while rows below stay in place.
    /// Candidates are handled in ascending order, which keeps the indices of
    /// the remaining (lower) candidates valid after every removal.
    /// Candidates outside the grid and duplicates are ignored.
    pub fn clear_completed_rows<I>(&mut self, candidate_rows: I) -> usize
    where
        I: IntoIterator<Item = i32>,
    {
        let mut candidates: Vec<usize> = candidate_rows
            .into_iter()
            .filter_map(|y| usize::try_from(y).ok())
            .filter(|y| *y < self.rows.len())
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        let mut cleared = 0;
        for y in candidates {
            if self.rows[y].is_filled() {
                self.rows.remove(y);
                self.rows
                    .insert(0, BoardRow::empty(usize::from(self.columns)));
                cleared += 1;
            }
        }
        cleared
    }

    /// Returns whether row `y` is inside the hidden rows above the visible field.
    #[must_use]
    pub fn row_in_buffer_zone(&self, y: i32) -> bool {
        y < i32::from(self.buffer_rows)
    }

    /// Iterates over every cell as `(column, row, color)`, row by row from the top.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Option<Color>)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.cells
                .iter()
                .enumerate()
                .map(move |(x, cell)| (x, y, *cell))
        })
    }

    /// Number of settled cells on the board.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.rows.iter().map(BoardRow::occupied_count).sum()
    }

    /// Returns `piece` moved straight down as far as it can go.
    #[must_use]
    pub fn drop_position(&self, piece: Piece) -> Piece {
        let mut dropped = piece;
        loop {
            let next = dropped.shifted(Coord::DOWN);
            if self.is_colliding(&next) {
                return dropped;
            }
            dropped = next;
        }
    }
}
