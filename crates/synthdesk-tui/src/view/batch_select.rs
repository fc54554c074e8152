use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem};

use synthdesk_core::BatchResolution;

use crate::app::App;
use crate::view::{centered_rect, truncate};

/// Popup listing the candidate batches an ambiguous identifier matched.
pub fn render_in(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let popup = centered_rect(70, 60, area);
    f.render_widget(Clear, popup);

    let matches = match app.pending.as_ref().map(|p| p.resolution()) {
        Some(BatchResolution::MultipleMatches { matches }) => matches.as_slice(),
        _ => &[],
    };

    let width = (popup.width as usize).saturating_sub(4);
    let items: Vec<ListItem> = matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let marker = if i == app.select_cursor { "\u{25b8} " } else { "  " };
            let mut text = format!("{marker}{} ({})", m.sample_name, m.unique_id);
            if let Some(date) = &m.creation_date {
                text.push_str(&format!("  {date}"));
            }
            if let Some(desc) = &m.description {
                text.push_str(&format!("  {desc}"));
            }
            let style = if i == app.select_cursor {
                theme.highlight_style()
            } else {
                Style::default().fg(theme.text)
            };
            ListItem::new(Line::from(Span::styled(truncate(&text, width), style)))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(format!(" {} batches matched \u{2014} pick one ", matches.len()))
            .borders(Borders::ALL)
            .border_style(theme.border_style()),
    );
    f.render_widget(list, popup);
}
