//! Layout and drawing: board, falling piece, sidebar, pause overlay and notification banner.

use crate::game::GameState;
use crate::host::{BANNER_DURATION, Banner, Scoreboard};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Each board cell is two terminal columns wide so blocks look square.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 24;

/// Everything the renderer reads. Drawing never mutates game state.
pub struct View<'a> {
    pub state: &'a GameState,
    pub scoreboard: &'a Scoreboard,
    pub banner: &'a Banner,
    pub theme: &'a Theme,
    pub paused: bool,
}

/// TachyonFX fade for the banner, restarted whenever a new notice arrives.
#[derive(Default)]
pub struct BannerFx {
    effect: Option<Effect>,
    serial: u64,
    last_process: Option<Instant>,
}

/// Board size in terminal cells including the border, saturating at `u16::MAX`.
fn board_outer_size(width: usize, height: usize) -> (u16, u16) {
    let side = |n: usize| u16::try_from(n).unwrap_or(u16::MAX);
    let w = side(width).saturating_mul(CELL_WIDTH).saturating_add(2);
    let h = side(height).saturating_add(2);
    (w, h)
}

/// Draw one frame: board + sidebar centred in `area`, then overlays.
pub fn draw(frame: &mut Frame, view: &View<'_>, banner_fx: &mut BannerFx, now: Instant) {
    let area = frame.area();
    let (bw, bh) = board_outer_size(view.state.board.width, view.state.board.height);
    let total_w = bw.saturating_add(SIDEBAR_WIDTH);

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(bh), Constraint::Fill(1)])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(bw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    let (board_area, sidebar_area) = (inner[0], inner[1]);

    draw_board(frame.buffer_mut(), view, board_area);
    draw_sidebar(frame.buffer_mut(), view, sidebar_area);

    if view.paused {
        draw_pause_overlay(frame.buffer_mut(), view.theme, board_area);
    }
    match view.banner.visible(now) {
        Some((message, _)) => {
            let rect = draw_banner(frame.buffer_mut(), view, message, board_area);
            apply_banner_effect(frame, view, banner_fx, rect, now);
        }
        None => banner_fx.effect = None,
    }
}

fn draw_board(buf: &mut Buffer, view: &View<'_>, area: Rect) {
    let theme = view.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border).bg(theme.bg))
        .title(Span::styled(" arenatris ", theme.title));
    let inner = block.inner(area);
    block.render(area, buf);

    let state = view.state;
    let mut paint = |x: i32, y: i32, color: Color| {
        let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
            return;
        };
        let rx = inner.x.saturating_add(x.saturating_mul(CELL_WIDTH));
        let ry = inner.y.saturating_add(y);
        if ry >= inner.bottom() {
            return;
        }
        for dx in 0..CELL_WIDTH {
            if rx.saturating_add(dx) < inner.right() {
                buf[(rx + dx, ry)]
                    .set_symbol(" ")
                    .set_style(Style::default().bg(color));
            }
        }
    };

    for (y, row) in state.board.rows().enumerate() {
        for (x, &value) in row.iter().enumerate() {
            let color = theme.cell_color(value).unwrap_or(theme.bg);
            paint(x as i32, y as i32, color);
        }
    }

    let player = &state.player;
    let color = theme.piece_color(player.kind);
    for (x, y, _) in player.shape.occupied() {
        paint(player.pos.x + x as i32, player.pos.y + y as i32, color);
    }
}

fn draw_sidebar(buf: &mut Buffer, view: &View<'_>, area: Rect) {
    let theme = view.theme;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.border).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Score, lines, best
            Constraint::Length(1), // gap
            Constraint::Length(3), // Gravity
            Constraint::Length(1), // gap
            Constraint::Length(9), // Controls
        ])
        .split(area);

    let stat = |label: &'static str, value: u32| {
        Line::from(vec![
            Span::styled(label, title_style),
            Span::styled(value.to_string(), fg_style),
        ])
    };
    let board = view.scoreboard;
    Paragraph::new(vec![
        stat("Score: ", board.score),
        stat("Lines: ", board.lines),
        stat("Best:  ", board.best),
    ])
    .block(Block::default().borders(Borders::ALL).border_style(border_style))
    .render(chunks[0], buf);

    let state = view.state;
    let interval = state.drop_interval().as_secs_f64();
    let ratio = if interval > 0.0 {
        (state.drop_counter().as_secs_f64() / interval).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(Span::styled("Drop", title_style)),
        )
        .gauge_style(Style::default().fg(theme.title).bg(theme.bg))
        .ratio(ratio)
        .label("")
        .render(chunks[2], buf);

    let help = [
        ("←/h →/l", "move"),
        ("↓/j", "drop"),
        ("↑/k/x", "rotate"),
        ("z/u", "rotate ccw"),
        ("p", "pause"),
        ("q/Esc", "quit"),
    ];
    let mut lines = vec![Line::from(Span::styled("Controls", title_style))];
    lines.extend(help.iter().map(|(keys, what)| {
        Line::from(vec![
            Span::styled(format!("{:<8}", keys), title_style),
            Span::styled(*what, fg_style),
        ])
    }));
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).border_style(border_style))
        .render(chunks[4], buf);
}

/// Rect of `w` x `h` centred in `area`, clipped to it.
fn centered(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_pause_overlay(buf: &mut Buffer, theme: &Theme, area: Rect) {
    let popup = centered(area, 22, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(Span::styled(" P resume  Q quit ", Style::default().fg(theme.main_fg))),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border).bg(theme.bg)),
        )
        .render(popup, buf);
}

/// Draw the notice box and return its rect for the fade effect.
fn draw_banner(buf: &mut Buffer, view: &View<'_>, message: &str, area: Rect) -> Rect {
    let theme = view.theme;
    let popup = centered(area, 22, 6);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {} ", message),
            Style::default().fg(Color::White).bg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Best: {} ", view.scoreboard.best),
            Style::default().fg(theme.main_fg),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border).bg(theme.bg)),
        )
        .render(popup, buf);
    popup
}

/// Fade the banner into the background over its lifetime (TachyonFX).
fn apply_banner_effect(
    frame: &mut Frame,
    view: &View<'_>,
    banner_fx: &mut BannerFx,
    rect: Rect,
    now: Instant,
) {
    let serial = view.banner.serial();
    if banner_fx.serial != serial {
        banner_fx.effect = None;
        banner_fx.serial = serial;
    }
    let delta = banner_fx
        .last_process
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    banner_fx.last_process = Some(now);

    let effect = banner_fx.effect.get_or_insert_with(|| {
        let bg = view.theme.bg;
        let fade_ms = BANNER_DURATION.as_millis().min(u32::MAX as u128) as u32;
        fx::fade_to(bg, bg, (fade_ms, Interpolation::Linear)).with_area(rect)
    });
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    frame.render_effect(effect, rect, TfxDuration::from_millis(delta_ms));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outer_size_adds_border_and_doubles_columns() {
        assert_eq!(board_outer_size(12, 20), (26, 22));
    }

    #[test]
    fn oversized_board_saturates_instead_of_wrapping() {
        assert_eq!(board_outer_size(32_767, 65_534), (u16::MAX, u16::MAX));
        assert_eq!(board_outer_size(70_000, 70_000), (u16::MAX, u16::MAX));
    }
}
