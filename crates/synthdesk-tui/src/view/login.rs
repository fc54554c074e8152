use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::App;
use crate::view::centered_rect;

pub fn render_in(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let popup = centered_rect(60, 30, area);

    let block = Block::default()
        .title(" Sign in ")
        .borders(Borders::ALL)
        .border_style(theme.border_style());
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(inner);

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            " Lab email address:",
            Style::default().fg(theme.text),
        ))),
        chunks[0],
    );

    let email = Paragraph::new(Line::from(vec![
        Span::styled(" > ", theme.focus_style()),
        Span::styled(app.login_email.as_str(), Style::default().fg(theme.text)),
        Span::styled("\u{2588}", theme.focus_style()),
    ]));
    f.render_widget(email, chunks[1]);
}
