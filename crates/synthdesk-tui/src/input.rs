use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::action::Action;
use crate::app::InputMode;

/// Map a crossterm terminal event to an action, respecting input mode.
pub fn map_event(event: &Event, input_mode: &InputMode) -> Action {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            // Ctrl+C always quits regardless of mode
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Action::Quit;
            }
            match input_mode {
                InputMode::Normal => map_key_normal(key),
                InputMode::Editing => map_key_editing(key),
            }
        }
        Event::Paste(text) => Action::PasteText(text.clone()),
        Event::Resize(w, h) => Action::Resize(*w, *h),
        _ => Action::None,
    }
}

fn map_key_normal(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Enter => Action::Confirm,
        KeyCode::Esc => Action::Back,
        KeyCode::Tab => Action::FocusNext,
        KeyCode::BackTab => Action::FocusPrev,
        KeyCode::Up | KeyCode::Char('k') => Action::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => Action::MoveDown,
        KeyCode::Left | KeyCode::Char('h') => Action::CycleLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::CycleRight,
        KeyCode::Char('e') => Action::StartEdit,
        KeyCode::Char('a') => Action::AddRow,
        KeyCode::Char('d') => Action::RemoveLastRow,
        KeyCode::Char('x') => Action::ClearRows,
        KeyCode::Char('n') => Action::SkipLinkage,
        _ => Action::None,
    }
}

fn map_key_editing(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc => Action::Back,
        KeyCode::Enter => Action::Confirm,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Tab => Action::FocusNext,
        KeyCode::Char(c) => Action::Input(c),
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyEvent, KeyModifiers};

    #[test]
    fn ctrl_c_quits_in_any_mode() {
        let event = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(map_event(&event, &InputMode::Normal), Action::Quit);
        assert_eq!(map_event(&event, &InputMode::Editing), Action::Quit);
    }

    #[test]
    fn characters_are_input_only_while_editing() {
        let event = Event::Key(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE));
        assert_eq!(map_event(&event, &InputMode::Normal), Action::None);
        assert_eq!(map_event(&event, &InputMode::Editing), Action::Input('z'));
    }

    #[test]
    fn bracketed_paste_is_forwarded_verbatim() {
        let event = Event::Paste("a\tb\nc\td".into());
        assert_eq!(
            map_event(&event, &InputMode::Normal),
            Action::PasteText("a\tb\nc\td".into())
        );
    }
}
