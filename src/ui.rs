pub mod editor;
pub mod history;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{App, AppState},
    equation::Token,
    roller::RollerSlot,
    score::{Score, Star},
    steps::Step,
    util::format_duration,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
const TOKEN_GAP: u16 = 3;
const ARC_ROWS: u16 = 4;
const ROLLER_RADIUS: usize = 2;
const ROLLER_WIDTH: u16 = 16;

/// Renders whichever screen matches the app state.
pub fn draw(app: &mut App, f: &mut Frame) {
    screen::current_screen(&app.state).render(app, f);
}

pub fn star_spans(score: Score) -> Vec<Span<'static>> {
    score
        .stars()
        .iter()
        .map(|star| match star {
            Star::Full => Span::styled("★ ", Style::default().fg(Color::Yellow)),
            Star::Half => Span::styled("⯪ ", Style::default().fg(Color::Yellow)),
            Star::Lost => Span::styled("☆ ", Style::default().add_modifier(Modifier::DIM)),
        })
        .collect()
}

fn help_line(text: &'static str) -> Paragraph<'static> {
    Paragraph::new(Span::styled(
        text,
        Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
    ))
    .alignment(Alignment::Center)
}

/// Writes `text` at `(x, y)` unless that lies outside `area`; clipped at the right edge.
fn put(buf: &mut Buffer, area: Rect, x: u16, y: u16, text: &str, style: Style) {
    if y < area.top() || y >= area.bottom() || x < area.left() || x >= area.right() {
        return;
    }
    buf.set_stringn(x, y, text, (area.right() - x) as usize, style);
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Results => render_results(self, area, buf),
            _ => render_play(self, area, buf),
        }
    }
}

fn render_play(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let session = app.game.session();

    let roller_height = (ROLLER_RADIUS * 2 + 1) as u16 + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(ARC_ROWS),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(roller_height),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    let mut header = vec![
        Span::styled(
            format!("⏱ {}", format_duration(session.elapsed(app.clock))),
            bold_style,
        ),
        Span::raw("    "),
    ];
    header.extend(star_spans(session.score()));
    Paragraph::new(Line::from(header))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    render_equation(app, chunks[2], chunks[3], buf);

    let roller_area = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Min(0),
                Constraint::Length(ROLLER_WIDTH),
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(chunks[5])[1];
    render_roller(app, roller_area, buf);

    let status = match app.game.lockout_remaining(app.clock) {
        Some(left) => Span::styled(
            format!("Locked, try again in {}s", left.as_secs() + 1),
            Style::default().fg(Color::Red).patch(bold_style),
        ),
        None => Span::styled(
            app.status.clone().unwrap_or_default(),
            Style::default().fg(Color::Green),
        ),
    };
    Paragraph::new(status)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[6], buf);

    help_line("(↑/↓) pick   (enter) submit   (n)ew   (h)istory   (c)onfig   (esc)ape")
        .render(chunks[8], buf);
}

fn arc_style(app: &App, idx: usize, step: &Step) -> Style {
    let session = app.game.session();
    if step.is_solved() {
        Style::default().fg(Color::Green)
    } else if session.current_index() == Some(idx) {
        let color = if session.is_locked_out() {
            Color::Red
        } else {
            Color::Yellow
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    }
}

/// Draws the token row with one arc per step above it. Neighbouring steps share
/// a token, so even and odd steps sit on alternating arc rows.
fn render_equation(app: &App, arcs: Rect, row: Rect, buf: &mut Buffer) {
    let session = app.game.session();
    let tokens = session.tokens();
    if tokens.is_empty() {
        return;
    }

    let labels: Vec<String> = tokens
        .iter()
        .map(|token| match (token, session.state().running_result) {
            (Token::Unknown, Some(answer)) if session.is_finished() => answer.to_string(),
            _ => token.to_string(),
        })
        .collect();
    let widths: Vec<u16> = labels.iter().map(|s| s.width() as u16).collect();
    let total = widths.iter().sum::<u16>() + TOKEN_GAP * (widths.len() as u16 - 1);

    let mut x = row.x + row.width.saturating_sub(total) / 2;
    let mut centers = Vec::with_capacity(tokens.len());
    for (idx, (label, width)) in labels.iter().zip(&widths).enumerate() {
        let style = match tokens[idx] {
            Token::Number(_) => Style::default().add_modifier(Modifier::BOLD),
            Token::Unknown => Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            _ => Style::default(),
        };
        put(buf, row, x, row.y, label, style);
        centers.push(x + width.saturating_sub(1) / 2);
        x += width + TOKEN_GAP;
    }

    if arcs.height < ARC_ROWS {
        return;
    }
    for (idx, step) in session.steps().iter().enumerate() {
        let (Some(&from), Some(&to)) = (centers.get(step.start_token), centers.get(step.end_token)) else {
            continue;
        };
        let arc_y = arcs.y + if idx % 2 == 0 { 3 } else { 1 };
        let style = arc_style(app, idx, step);

        let span = to.saturating_sub(from).max(1) as usize;
        let arc = format!("╭{}╮", "─".repeat(span - 1));
        put(buf, arcs, from, arc_y, &arc, style);

        let label = if step.is_solved() {
            step.expected_result.to_string()
        } else if session.current_index() == Some(idx) {
            "?".to_string()
        } else {
            continue;
        };
        let mid = from + (span as u16) / 2;
        let label_x = mid.saturating_sub(label.width() as u16 / 2);
        put(buf, arcs, label_x, arc_y - 1, &label, style);
    }
}

fn render_roller(app: &App, area: Rect, buf: &mut Buffer) {
    let roller = app.game.roller();
    let locked = app.game.session().is_locked_out();
    let border_style = if locked {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };

    let lines: Vec<Line> = roller
        .window(ROLLER_RADIUS)
        .into_iter()
        .enumerate()
        .map(|(idx, slot)| {
            let text = match slot {
                RollerSlot::Pad => String::new(),
                RollerSlot::Value(v) => v.to_string(),
            };
            if idx == ROLLER_RADIUS {
                Line::from(Span::styled(
                    format!("▸ {} ◂", text),
                    Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED),
                ))
            } else {
                Line::from(Span::styled(text, Style::default().add_modifier(Modifier::DIM)))
            }
        })
        .collect();

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title("answer"),
        )
        .render(area, buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let Some(record) = app.last_result.as_ref() else {
        Paragraph::new("No finished game")
            .alignment(Alignment::Center)
            .render(area, buf);
        return;
    };

    let step_rows = record.steps.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(step_rows),
                Constraint::Min(0),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    Paragraph::new(Span::styled(
        app.settings.congratulation(),
        Style::default().fg(Color::Green).patch(bold_style),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    Paragraph::new(Span::styled(record.equation_text.clone(), bold_style))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let mut summary = vec![Span::raw(format!("⏱ {}    ", record.total_time))];
    summary.extend(star_spans(app.game.session().score()));
    Paragraph::new(Line::from(summary))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let steps: Vec<Line> = record
        .steps
        .iter()
        .map(|step| {
            let mistakes = match step.wrong_count {
                0 => String::new(),
                1 => "  1 mistake".to_string(),
                n => format!("  {} mistakes", n),
            };
            Line::from(vec![
                Span::raw(format!("{} = {}", step.expression, step.result)),
                Span::styled(
                    format!("  {}", step.time),
                    Style::default().add_modifier(Modifier::DIM),
                ),
                Span::styled(mistakes, Style::default().fg(Color::Red)),
            ])
        })
        .collect();
    Paragraph::new(steps)
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

    help_line("(n)ew game   (h)istory   (c)onfig   (esc)ape").render(chunks[6], buf);
}
