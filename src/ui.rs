use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::bubble::{Bubble, BubbleColor, PlayArea, ScorePopup};
use crate::{App, AppState};

/// Cell-to-virtual-pixel mapping. Terminal cells are roughly twice as tall
/// as they are wide, so a column is 10px and a row 20px; an 80-column play
/// area therefore reads as an 800px-wide viewport.
pub const PX_PER_COL: f64 = 10.0;
pub const PX_PER_ROW: f64 = 20.0;

/// Split the screen into HUD, play area and key legend.
pub fn screen_chunks(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

/// Play-area bounds in virtual pixels for the session's viewport query.
pub fn play_area_px(play: Rect) -> PlayArea {
    PlayArea {
        width: f64::from(play.width) * PX_PER_COL,
        height: f64::from(play.height) * PX_PER_ROW,
    }
}

/// Map a pointer press in terminal cells to play-area pixels. `None` when
/// the press lands outside the play area.
pub fn pointer_to_px(play: Rect, column: u16, row: u16) -> Option<(f64, f64)> {
    if column < play.x
        || column >= play.x.saturating_add(play.width)
        || row < play.y
        || row >= play.y.saturating_add(play.height)
    {
        return None;
    }
    let x = (f64::from(column - play.x) + 0.5) * PX_PER_COL;
    let y = (f64::from(row - play.y) + 0.5) * PX_PER_ROW;
    Some((x, y))
}

fn bubble_color(color: BubbleColor) -> Color {
    match color {
        BubbleColor::Pink => Color::Magenta,
        BubbleColor::Cyan => Color::Cyan,
        BubbleColor::Yellow => Color::Yellow,
        BubbleColor::Green => Color::Green,
        BubbleColor::Red => Color::Red,
        BubbleColor::Blue => Color::Blue,
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (hud_area, play, legend_area) = screen_chunks(area);

        render_hud(self, hud_area, buf);

        match self.state {
            AppState::Playing => {
                for bubble in self.session.bubbles() {
                    paint_bubble(bubble, play, buf);
                }
                for popup in self.session.popups() {
                    paint_popup(popup, play, buf);
                }
            }
            AppState::Ready => {
                let message = Paragraph::new(vec![
                    Line::from(Span::styled(
                        "plop",
                        Style::default()
                            .fg(Color::Magenta)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from("pop the bubbles before they drift away"),
                    Line::from("small bubbles are worth more, stray clicks cost you"),
                    Line::from(""),
                    Line::from(Span::styled(
                        "press (s) to start",
                        Style::default().add_modifier(Modifier::ITALIC),
                    )),
                ])
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
                message.render(centered_panel(play, 6), buf);
            }
            AppState::Summary => {
                let hud = self.session.hud();
                let summary = self.session.summary();
                let final_score = summary.map(|s| s.final_score).unwrap_or(hud.score);
                let best = summary.map(|s| s.best).unwrap_or(hud.best);

                let mut lines = vec![
                    Line::from(Span::styled(
                        "Game Over!",
                        Style::default()
                            .fg(Color::Magenta)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from(vec![
                        Span::raw("final score "),
                        Span::styled(
                            final_score.to_string(),
                            Style::default()
                                .fg(Color::Cyan)
                                .add_modifier(Modifier::BOLD),
                        ),
                    ]),
                    Line::from(vec![
                        Span::raw("best score "),
                        Span::styled(
                            best.to_string(),
                            Style::default()
                                .fg(Color::Green)
                                .add_modifier(Modifier::BOLD),
                        ),
                    ]),
                    Line::from(""),
                    Line::from(Span::styled(
                        "press (s) to play again",
                        Style::default().add_modifier(Modifier::ITALIC),
                    )),
                ];
                if let Some(cli) = &self.cli {
                    let seed = cli
                        .seed
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "random".to_string());
                    lines.push(Line::from(Span::styled(
                        format!(
                            "Settings: {}s round | profile {} | seed {}",
                            cli.seconds, cli.profile, seed
                        ),
                        Style::default()
                            .fg(Color::Gray)
                            .add_modifier(Modifier::ITALIC),
                    )));
                }
                let height = lines.len() as u16;
                let message = Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });
                message.render(centered_panel(play, height), buf);
            }
        }

        let legend = Paragraph::new(Span::styled(
            "(s)tart / (r)eset / (esc)ape",
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        legend.render(legend_area, buf);
    }
}

fn render_hud(app: &App, area: Rect, buf: &mut Buffer) {
    let hud = app.session.hud();
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let line = Line::from(vec![
        Span::styled("score ", bold),
        Span::styled(hud.score.to_string(), bold.fg(Color::Cyan)),
        Span::raw("   "),
        Span::styled("time ", bold),
        Span::styled(format!("{}s", hud.seconds_left), bold.fg(Color::Yellow)),
        Span::raw("   "),
        Span::styled("best ", bold),
        Span::styled(hud.best.to_string(), bold.fg(Color::Green)),
    ]);
    Paragraph::new(line)
        .alignment(Alignment::Center)
        .render(area, buf);
}

/// A horizontally-centered band of `height` rows inside `area`.
fn centered_panel(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    let top = area.y + (area.height - height) / 2;
    Rect::new(area.x, top, area.width, height)
}

/// Paint every play-area cell whose center falls inside the bubble.
fn paint_bubble(bubble: &Bubble, play: Rect, buf: &mut Buffer) {
    let style = Style::default().fg(bubble_color(bubble.color));
    let symbol = if bubble.popped { "✦" } else { "●" };

    let col_start = (bubble.x / PX_PER_COL).floor() as i32;
    let col_end = ((bubble.x + bubble.size) / PX_PER_COL).ceil() as i32;
    let row_start = (bubble.y / PX_PER_ROW).floor() as i32;
    let row_end = ((bubble.y + bubble.size) / PX_PER_ROW).ceil() as i32;

    for row in row_start..=row_end {
        for col in col_start..=col_end {
            if row < 0 || col < 0 || col >= i32::from(play.width) || row >= i32::from(play.height)
            {
                continue;
            }
            let px = (f64::from(col) + 0.5) * PX_PER_COL;
            let py = (f64::from(row) + 0.5) * PX_PER_ROW;
            if !bubble.contains(px, py) {
                continue;
            }
            if let Some(cell) = buf.cell_mut((play.x + col as u16, play.y + row as u16)) {
                cell.set_symbol(symbol);
                cell.set_style(style);
            }
        }
    }
}

/// Transient `+N` indicator, drawn in the cyan the score display uses.
fn paint_popup(popup: &ScorePopup, play: Rect, buf: &mut Buffer) {
    let col = (popup.x / PX_PER_COL).floor() as i32;
    let row = (popup.y / PX_PER_ROW).floor() as i32;
    if row < 0 || row >= i32::from(play.height) {
        return;
    }
    let style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    for (i, ch) in popup.text.chars().enumerate() {
        let c = col + i as i32;
        if c < 0 || c >= i32::from(play.width) {
            continue;
        }
        if let Some(cell) = buf.cell_mut((play.x + c as u16, play.y + row as u16)) {
            cell.set_symbol(&ch.to_string());
            cell.set_style(style);
        }
    }
}
