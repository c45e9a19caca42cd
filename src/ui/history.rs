use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::{app::App, history::HistoryRecord, util::mean};

/// Pure presenter for a single history row
pub fn present_row(record: &HistoryRecord) -> Row<'static> {
    let score_color = if record.score >= 4.5 {
        Color::Green
    } else if record.score >= 2.5 {
        Color::Yellow
    } else {
        Color::Red
    };

    let wrong = record.total_wrong();
    let wrong_display = if wrong == 0 {
        "—".to_string()
    } else {
        wrong.to_string()
    };

    Row::new(vec![
        Cell::from(record.timestamp.format("%Y-%m-%d %H:%M").to_string()),
        Cell::from(record.equation_text.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(record.total_time.clone()),
        Cell::from(format!("{:.1}", record.score)).style(Style::default().fg(score_color)),
        Cell::from(wrong_display),
    ])
}

/// Render the game history screen, newest game first
pub fn render_history(app: &mut App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // History table
            Constraint::Length(2), // Instructions
        ])
        .split(area);

    let view = &mut app.history_view;
    let scores: Vec<f64> = view.records.iter().map(|r| r.score).collect();
    let title_text = match mean(&scores) {
        Some(avg) => format!("{} games played, average score {:.1}", scores.len(), avg),
        None => "No games played yet".to_string(),
    };

    let title = Paragraph::new(title_text)
        .block(Block::default().borders(Borders::ALL).title("History"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    if view.records.is_empty() {
        let no_data = Paragraph::new("Finish a game to see it here.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(no_data, chunks[1]);
    } else {
        let table_height = chunks[1].height.saturating_sub(3) as usize; // borders + header
        let max_scroll = view.records.len().saturating_sub(table_height);
        if view.scroll_offset > max_scroll {
            view.scroll_offset = max_scroll;
        }

        let header = Row::new(vec![
            Cell::from("Date"),
            Cell::from("Equation"),
            Cell::from("Time"),
            Cell::from("Score"),
            Cell::from("Mistakes"),
        ])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let visible_rows: Vec<Row> = view
            .records
            .iter()
            .skip(view.scroll_offset)
            .take(table_height)
            .map(present_row)
            .collect();

        let widths = [
            Constraint::Length(17), // Date
            Constraint::Min(20),    // Equation
            Constraint::Length(9),  // Time
            Constraint::Length(6),  // Score
            Constraint::Length(9),  // Mistakes
        ];

        let table = Table::new(visible_rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Games"))
            .column_spacing(2);
        f.render_widget(table, chunks[1]);
    }

    let instructions = Paragraph::new("(↑/↓) scroll  (Home) top  (b/esc) back")
        .alignment(Alignment::Center)
        .wrap(ratatui::widgets::Wrap { trim: true });
    f.render_widget(instructions, chunks[2]);
}
