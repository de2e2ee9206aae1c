//! Stateless UI rendering for the board, roster and status line.

use super::app::App;
use gravity_four::{Cell, CellTarget, ColorIndex, Grid, cell_targets};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

const CELL_WIDTH: u16 = 4;
const CELL_HEIGHT: u16 = 2;
const ROSTER_WIDTH: u16 = 26;

/// Piece colours in roster order.
const PALETTE: [Color; 6] = [
    Color::Red,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Rgb(255, 140, 0),
    Color::Rgb(40, 40, 40),
];

/// Colour for a player's pieces; wraps for rosters longer than the palette.
pub fn player_color(index: ColorIndex) -> Color {
    PALETTE[index % PALETTE.len()]
}

/// Draws one frame and returns where each board cell landed on screen.
pub fn draw(frame: &mut Frame, app: &App) -> Vec<(Rect, CellTarget)> {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(8),    // Board + roster
            Constraint::Length(3), // Status
        ])
        .split(area);

    let title = Paragraph::new(format!(
        "Gravity Four - game {} - playing as {}",
        app.game_id(),
        app.player_name()
    ))
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(ROSTER_WIDTH)])
        .split(chunks[1]);

    let hits = match app.grid() {
        Some(grid) => draw_board(frame, body[0], grid, app),
        None => {
            let waiting = Paragraph::new("Waiting for the server...")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(waiting, body[0]);
            Vec::new()
        }
    };

    draw_roster(frame, body[1], app);

    let status_style = if app.has_error() {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let status = Paragraph::new(app.status_line())
        .style(status_style)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, chunks[2]);

    hits
}

fn draw_board(
    frame: &mut Frame,
    area: Rect,
    grid: &Grid,
    app: &App,
) -> Vec<(Rect, CellTarget)> {
    let width = u16::try_from(grid.column_count())
        .unwrap_or(u16::MAX)
        .saturating_mul(CELL_WIDTH)
        .saturating_add(2);
    let height = u16::try_from(grid.row_count())
        .unwrap_or(u16::MAX)
        .saturating_mul(CELL_HEIGHT)
        .saturating_add(2);
    let board_area = center_rect(area, width, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(board_area);
    frame.render_widget(block, board_area);

    let mut hits = Vec::new();
    for target in cell_targets(grid) {
        let Some(cell_area) = cell_rect(inner, target) else {
            continue;
        };
        let Ok(cell) = grid.cell_at(target.x(), target.y()) else {
            continue;
        };

        let position = (target.x(), target.y());
        let pending = app
            .pending_move()
            .filter(|(cell, _)| *cell == position);
        let (symbol, mut style) = match (cell, pending) {
            (Cell::Empty, Some((_, color))) => (" ██ ", Style::default().fg(player_color(color))),
            (Cell::Empty, None) => (" ·· ", Style::default().fg(Color::DarkGray)),
            (Cell::Occupied(color), _) => (
                " ██ ",
                Style::default()
                    .fg(player_color(color))
                    .add_modifier(Modifier::BOLD),
            ),
        };
        if position == app.cursor() {
            let tint = app.preview_color().map_or(Color::White, player_color);
            style = style.bg(tint);
        }

        let paragraph = Paragraph::new(Line::from(Span::styled(symbol, style)));
        frame.render_widget(paragraph, cell_area);
        hits.push((cell_area, target));
    }
    hits
}

/// Screen area of one cell, `None` if it falls outside the board area.
fn cell_rect(inner: Rect, target: CellTarget) -> Option<Rect> {
    let x = u16::try_from(target.x()).ok()?.checked_mul(CELL_WIDTH)?;
    let y = u16::try_from(target.y()).ok()?.checked_mul(CELL_HEIGHT)?;
    if x.checked_add(CELL_WIDTH)? > inner.width || y.checked_add(CELL_HEIGHT)? > inner.height {
        return None;
    }
    Some(Rect::new(
        inner.x.checked_add(x)?,
        inner.y.checked_add(y)?,
        CELL_WIDTH,
        CELL_HEIGHT,
    ))
}

fn draw_roster(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = match app.view() {
        Some(view) => view
            .roster()
            .iter()
            .map(|slot| {
                let active = *view.highlighted_player_index() == Some(*slot.index());
                let marker = if active { "▶ " } else { "  " };
                let mut style = Style::default().fg(player_color(*slot.color_index()));
                if active {
                    style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
                }
                ListItem::new(Line::from(vec![
                    Span::raw(marker),
                    Span::styled(slot.display_name().clone(), style),
                ]))
            })
            .collect(),
        None => Vec::new(),
    };

    let list = List::new(items).block(Block::default().title("Players").borders(Borders::ALL));
    frame.render_widget(list, area);
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
