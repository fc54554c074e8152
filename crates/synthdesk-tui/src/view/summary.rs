use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::App;
use crate::view::centered_rect;

/// Upload result screen.
pub fn render_in(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let popup = centered_rect(70, 60, area);
    f.render_widget(Clear, popup);

    let Some(receipt) = &app.summary else {
        return;
    };
    let summary = &receipt.summary;

    let ok = summary.failed == 0;
    let verdict_style = Style::default().fg(if ok { theme.success } else { theme.warning });

    let mut lines = vec![
        Line::from(Span::styled(format!(" {}", receipt.message), verdict_style)),
        Line::default(),
        Line::from(vec![
            Span::styled(" Project          ", Style::default().fg(theme.dim)),
            Span::styled(summary.project.clone(), Style::default().fg(theme.text)),
        ]),
        Line::from(vec![
            Span::styled(" Synthesis type   ", Style::default().fg(theme.dim)),
            Span::styled(
                summary.synthesis_type.clone(),
                Style::default().fg(theme.text),
            ),
        ]),
        Line::from(vec![
            Span::styled(" Samples uploaded ", Style::default().fg(theme.dim)),
            Span::styled(
                format!("{} of {}", summary.samples_uploaded, summary.total_rows),
                Style::default().fg(theme.text),
            ),
        ]),
    ];
    if summary.failed > 0 {
        lines.push(Line::from(vec![
            Span::styled(" Failed           ", Style::default().fg(theme.dim)),
            Span::styled(
                summary.failed.to_string(),
                Style::default().fg(theme.error),
            ),
        ]));
        for error in &summary.errors {
            lines.push(Line::from(Span::styled(
                format!("   {error}"),
                Style::default().fg(theme.error),
            )));
        }
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .title(" Upload complete ")
            .borders(Borders::ALL)
            .border_style(theme.border_style()),
    );
    f.render_widget(widget, popup);
}
