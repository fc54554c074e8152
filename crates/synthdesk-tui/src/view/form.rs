use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::app::{App, FormFocus, InputMode};
use crate::theme::Theme;
use crate::view::truncate;

pub fn render_in(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let chunks = Layout::vertical([
        Constraint::Length(1), // header
        Constraint::Length(1), // project + synthesis type selectors
        Constraint::Length(1), // batch id
        Constraint::Min(3),    // sample table
    ])
    .split(area);

    render_header(f, chunks[0], app, theme);
    render_selectors(f, chunks[1], app, theme);
    render_batch_id(f, chunks[2], app, theme);
    render_table(f, chunks[3], app, theme);
}

fn render_header(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let operator = app
        .identity
        .as_ref()
        .map(|id| id.name.as_str())
        .unwrap_or("");
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" synthdesk ", theme.header_style()),
        Span::styled(
            format!(" {operator}"),
            Style::default().fg(theme.dim),
        ),
    ]));
    f.render_widget(header, area);
}

fn selector_style(app: &App, focus: FormFocus) -> Style {
    if app.form_focus == focus {
        app.theme.focus_style()
    } else {
        Style::default().fg(app.theme.text)
    }
}

fn render_selectors(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let project = app.current_project().unwrap_or("-");
    let synthesis_type = app.current_synthesis_type().unwrap_or("-");
    let line = Line::from(vec![
        Span::styled(" Project: ", Style::default().fg(theme.dim)),
        Span::styled(
            format!("\u{2039} {project} \u{203a}"),
            selector_style(app, FormFocus::Project),
        ),
        Span::styled("  Synthesis type: ", Style::default().fg(theme.dim)),
        Span::styled(
            format!("\u{2039} {synthesis_type} \u{203a}"),
            selector_style(app, FormFocus::SynthesisType),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_batch_id(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let editing =
        app.input_mode == InputMode::Editing && app.form_focus == FormFocus::BatchId;
    let value = if editing {
        &app.edit_buffer
    } else {
        &app.batch_id_text
    };
    let mut spans = vec![
        Span::styled(" Batch id (optional): ", Style::default().fg(theme.dim)),
        Span::styled(value.as_str(), selector_style(app, FormFocus::BatchId)),
    ];
    if editing {
        spans.push(Span::styled("\u{2588}", theme.focus_style()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_table(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let Some(table) = &app.table else {
        let hint = Paragraph::new(Line::from(Span::styled(
            " no synthesis type selected",
            Style::default().fg(theme.dim),
        )));
        f.render_widget(hint, area);
        return;
    };

    let columns = table.columns();
    if columns.is_empty() {
        return;
    }
    let col_width = ((area.width as usize).saturating_sub(2) / columns.len()).max(4);

    let header = Row::new(columns.iter().enumerate().map(|(i, name)| {
        let style = if app.form_focus == FormFocus::Rows && i == app.col_cursor {
            theme.focus_style()
        } else {
            Style::default().fg(theme.text)
        };
        Cell::from(Span::styled(truncate(name, col_width), style))
    }))
    .style(theme.header_style());

    let editing_cell =
        app.input_mode == InputMode::Editing && app.form_focus == FormFocus::Rows;

    let rows = table.rows().iter().enumerate().map(|(row_idx, row)| {
        let selected = app.form_focus == FormFocus::Rows && row_idx == app.row_cursor;
        let cells = columns.iter().enumerate().map(|(col_idx, column)| {
            let text = if selected && editing_cell && col_idx == app.col_cursor {
                format!("{}\u{2588}", app.edit_buffer)
            } else {
                row.get(column).to_string()
            };
            Cell::from(truncate(&text, col_width))
        });
        let style = if selected {
            theme.highlight_style()
        } else {
            Style::default().fg(theme.text)
        };
        Row::new(cells).style(style)
    });

    let widths = vec![Constraint::Length(col_width as u16); columns.len()];
    let widget = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!(" Samples ({}) ", table.row_count()))
            .borders(Borders::ALL)
            .border_style(theme.border_style()),
    );
    f.render_widget(widget, area);
}
