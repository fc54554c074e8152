pub mod batch_not_found;
pub mod batch_select;
pub mod form;
pub mod login;
pub mod summary;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{App, Screen};

/// Render the whole frame: active screen plus a one-line status footer.
pub fn render(f: &mut Frame, app: &App) {
    let chunks =
        Layout::vertical([Constraint::Min(5), Constraint::Length(1)]).split(f.area());

    match app.screen {
        Screen::Login => login::render_in(f, app, chunks[0]),
        Screen::Form => form::render_in(f, app, chunks[0]),
        Screen::BatchNotFound => {
            form::render_in(f, app, chunks[0]);
            batch_not_found::render_in(f, app, chunks[0]);
        }
        Screen::BatchSelect => {
            form::render_in(f, app, chunks[0]);
            batch_select::render_in(f, app, chunks[0]);
        }
        Screen::Summary => summary::render_in(f, app, chunks[0]),
    }

    render_footer(f, app, chunks[1]);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let mut spans = Vec::new();
    if app.busy {
        spans.push(Span::styled(
            " working\u{2026} ",
            ratatui::style::Style::default().fg(theme.busy),
        ));
    }
    if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!(" {} ", status.text),
            theme.status_style(status.is_error),
        ));
    } else {
        spans.push(Span::styled(keys_hint(app), theme.footer_style()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn keys_hint(app: &App) -> &'static str {
    match app.screen {
        Screen::Login => " Enter sign in | Esc quit",
        Screen::Form => {
            " Tab focus | \u{2190}\u{2192} cycle | e edit | a add row | d drop last | x clear | Enter submit | q quit"
        }
        Screen::BatchNotFound => " Tab field | e edit | Enter create | n skip linkage | Esc cancel",
        Screen::BatchSelect => " \u{2191}\u{2193} pick | Enter select | n skip linkage | Esc cancel",
        Screen::Summary => " Enter back to form",
    }
}

/// Centered popup area, sized as a fraction of the frame.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);
    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(vertical[1])[1]
}

/// Truncate a string to fit in `max_width` columns, appending "\u{2026}" if truncated.
pub fn truncate(s: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if s.chars().count() <= max_width {
        return s.to_string();
    }
    let mut truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    truncated.push('\u{2026}');
    truncated
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn truncate_counts_characters_not_bytes() {
        // Four characters, eight bytes: must fit untouched in four columns.
        assert_eq!(truncate("αβγδ", 4), "αβγδ");
        assert_eq!(truncate("αβγδε", 4), "αβγ\u{2026}");
    }

    #[test]
    fn truncate_leaves_short_ascii_alone() {
        assert_eq!(truncate("Alpha", 10), "Alpha");
        assert_eq!(truncate("Alphabetical", 6), "Alpha\u{2026}");
        assert_eq!(truncate("anything", 0), "");
    }
}
