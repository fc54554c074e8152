use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::{App, InputMode};
use crate::view::centered_rect;

const FIELD_LABELS: [&str; 3] = ["Name", "Identifier", "Description"];

/// Popup offering to create the batch that was not found.
pub fn render_in(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let popup = centered_rect(60, 45, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Batch not found \u{2014} create it? ")
        .borders(Borders::ALL)
        .border_style(theme.border_style());
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(inner);

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            " No batch matched the identifier you entered.",
            Style::default().fg(theme.dim),
        ))),
        chunks[0],
    );

    let values = [
        &app.create_form.name,
        &app.create_form.id,
        &app.create_form.description,
    ];
    for (i, (label, value)) in FIELD_LABELS.into_iter().zip(values).enumerate() {
        render_field(f, chunks[i + 1], app, label, value, i);
    }
}

fn render_field(f: &mut Frame, area: Rect, app: &App, label: &str, value: &str, index: usize) {
    let theme = &app.theme;
    let focused = app.create_form.focus == index;
    let style = if focused {
        theme.focus_style()
    } else {
        Style::default().fg(theme.text)
    };
    let mut spans = vec![
        Span::styled(format!(" {label:<12}"), Style::default().fg(theme.dim)),
        Span::styled(value.to_string(), style),
    ];
    if focused && app.input_mode == InputMode::Editing {
        spans.push(Span::styled("\u{2588}", theme.focus_style()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
