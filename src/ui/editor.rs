use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::{app::App, editor::EditorField};

/// Render the config editor: one table row per config row.
pub fn render_config_editor(app: &mut App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Rows
            Constraint::Length(1), // Error
            Constraint::Length(2), // Instructions
        ])
        .split(area);

    let title = Paragraph::new("Equation rows: number range and the sign that follows")
        .block(Block::default().borders(Borders::ALL).title("Config"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let Some(editor) = app.editor.as_ref() else {
        return;
    };

    let selected = Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD);
    let rows: Vec<Row> = editor
        .rows()
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let cell_style = |field: EditorField| {
                if idx == editor.selected_row && editor.selected_field == field {
                    selected
                } else {
                    Style::default()
                }
            };
            Row::new(vec![
                Cell::from((idx + 1).to_string()).style(Style::default().add_modifier(Modifier::DIM)),
                Cell::from(row.min.to_string()).style(cell_style(EditorField::Min)),
                Cell::from(row.max.to_string()).style(cell_style(EditorField::Max)),
                Cell::from(row.operator.to_string()).style(cell_style(EditorField::Operator)),
            ])
        })
        .collect();

    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from("Min"),
        Cell::from("Max"),
        Cell::from("Sign"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let widths = [
        Constraint::Length(4),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(6),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Rows"))
        .column_spacing(2);
    f.render_widget(table, chunks[1]);

    if let Some(error) = &editor.error {
        let error = Paragraph::new(error.as_str())
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));
        f.render_widget(error, chunks[2]);
    }

    let instructions = Paragraph::new(
        "(↑/↓) row  (←/→) field  (+/-) change  (o) sign  (a)dd  (d)elete  (s)ave  (r)eset  (esc) cancel",
    )
    .alignment(Alignment::Center)
    .wrap(ratatui::widgets::Wrap { trim: true });
    f.render_widget(instructions, chunks[3]);
}
