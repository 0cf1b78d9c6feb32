use blockfall_engine::{Color, Coord, Snapshot};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, BlockExt as _, Widget},
};

use super::style;

/// Width of one board cell in terminal columns.
const CELL_WIDTH: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Empty,
    Ghost,
    Filled(Color),
}

impl CellKind {
    const fn appearance(self) -> (&'static str, Style) {
        match self {
            Self::Empty => (" .", style::EMPTY_DOT),
            Self::Ghost => ("[]", style::GHOST),
            Self::Filled(color) => ("  ", style::block(color)),
        }
    }
}

/// The visible part of the board with the active and ghost pieces drawn on top.
///
/// Buffer rows are not drawn.
#[derive(Debug)]
pub(crate) struct BoardView<'a> {
    snapshot: &'a Snapshot,
    block: Option<Block<'a>>,
}

impl<'a> BoardView<'a> {
    pub(crate) fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            block: None,
        }
    }

    pub(crate) fn block(self, block: Block<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub(crate) fn width(&self) -> u16 {
        self.snapshot
            .board
            .columns()
            .saturating_mul(CELL_WIDTH)
            .saturating_add(self.horizontal_margin())
    }

    pub(crate) fn height(&self) -> u16 {
        self.snapshot
            .board
            .visible_rows()
            .saturating_add(self.vertical_margin())
    }

    fn horizontal_margin(&self) -> u16 {
        let outer = Rect::new(0, 0, 100, 100);
        outer.width - self.block.inner_if_some(outer).width
    }

    fn vertical_margin(&self) -> u16 {
        let outer = Rect::new(0, 0, 100, 100);
        outer.height - self.block.inner_if_some(outer).height
    }

    fn cell_kind(&self, column: u16, row: u16) -> CellKind {
        let position = Coord::new(i32::from(column), i32::from(row));
        let Snapshot {
            board,
            active_piece,
            ghost_piece,
            ..
        } = self.snapshot;
        if active_piece.cells().contains(&position) {
            return CellKind::Filled(active_piece.color());
        }
        if let Some(color) = board.cell(usize::from(column), usize::from(row)) {
            return CellKind::Filled(color);
        }
        if ghost_piece.cells().contains(&position) {
            return CellKind::Ghost;
        }
        CellKind::Empty
    }
}

impl Widget for BoardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let board = &self.snapshot.board;
        let columns = board.columns().min(area.width / CELL_WIDTH);
        let rows = board.visible_rows().min(area.height);
        for screen_row in 0..rows {
            let row = board.buffer_rows() + screen_row;
            for column in 0..columns {
                let (symbol, style) = self.cell_kind(column, row).appearance();
                buf.set_string(
                    area.x + column * CELL_WIDTH,
                    area.y + screen_row,
                    symbol,
                    style,
                );
            }
        }
    }
}
