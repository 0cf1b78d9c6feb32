use blockfall_engine::{SessionStats, ShapeSeed, Snapshot};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Paragraph, Widget},
};

use super::{BoardView, color, style};

const PANEL_WIDTH: u16 = 24;

const HELP: &[(&str, &str)] = &[
    ("← →", "move"),
    ("↓", "soft drop"),
    ("space", "hard drop"),
    ("↑ x", "rotate cw"),
    ("z", "rotate ccw"),
    ("a", "rotate 180"),
    ("q", "quit"),
];

/// Board, status panel and game-over overlay.
#[derive(Debug)]
pub(crate) struct SessionView<'a> {
    snapshot: &'a Snapshot,
    stats: &'a SessionStats,
    seed: ShapeSeed,
}

impl<'a> SessionView<'a> {
    pub(crate) fn new(snapshot: &'a Snapshot, stats: &'a SessionStats, seed: ShapeSeed) -> Self {
        Self {
            snapshot,
            stats,
            seed,
        }
    }

    fn status_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::styled(format!("PIECES {:>8}", self.stats.locked_pieces()), style::DEFAULT),
            Line::styled(format!("LINES  {:>8}", self.stats.cleared_rows()), style::DEFAULT),
            Line::default(),
            Line::styled("SEED", style::HINT),
        ];
        let seed = self.seed.to_string();
        let (head, tail) = seed.split_at(seed.len() / 2);
        lines.push(Line::styled(head.to_owned(), style::HINT));
        lines.push(Line::styled(tail.to_owned(), style::HINT));
        lines.push(Line::default());
        lines.extend(
            HELP.iter()
                .map(|(key, action)| Line::styled(format!("{key:<6} {action}"), style::HINT)),
        );
        lines
    }
}

impl Widget for SessionView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.snapshot.game_over {
            color::RED
        } else {
            color::WHITE
        };
        let board = BoardView::new(self.snapshot)
            .block(Block::bordered().border_style(border).style(style::DEFAULT));
        let status = Paragraph::new(Text::from(self.status_lines())).block(
            Block::bordered()
                .title(Line::from("STATUS").centered())
                .padding(Padding::horizontal(1))
                .border_style(border)
                .style(style::DEFAULT),
        );

        let [board_column, status_column] = Layout::horizontal([
            Constraint::Length(board.width()),
            Constraint::Length(PANEL_WIDTH),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);
        let [board_area] =
            Layout::vertical([Constraint::Length(board.height())]).areas(board_column);
        let [status_area] = Layout::vertical([Constraint::Length(
            u16::try_from(HELP.len()).unwrap_or(u16::MAX) + 9,
        )])
        .areas(status_column);

        let board_width = board.width();
        board.render(board_area, buf);
        status.render(status_area, buf);

        if self.snapshot.game_over {
            let block = Block::new().style(style::GAME_OVER);
            let text = Text::styled("GAME OVER", style::GAME_OVER).centered();
            let area = board_area.centered(Constraint::Length(board_width), Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}
