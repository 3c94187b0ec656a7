use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

use crate::actions::Action;
use crate::state::State;

/// Map a terminal event onto an [`Action`]. Returning `None` quits.
pub fn handle_event(event: &Event, state: &State) -> Option<Action> {
    match event {
        Event::Key(key) => {
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            if ctrl && key.code == KeyCode::Char('c') {
                return None;
            }

            // The filter form captures everything while open
            if state.filter_form.is_some() {
                return Some(handle_form_key(key));
            }

            // The detail popup only responds to close keys; the feed is
            // gated while it is up, so navigation would fight the freeze.
            if state.detail_open {
                return Some(match key.code {
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Action::CloseDetail,
                    _ => Action::None,
                });
            }

            let page = state.table_rows.max(1);
            let action = match key.code {
                KeyCode::Char('q') => return None,
                KeyCode::Up | KeyCode::Char('k') => Action::CursorUp(1),
                KeyCode::Down | KeyCode::Char('j') => Action::CursorDown(1),
                KeyCode::PageUp => Action::CursorUp(page),
                KeyCode::PageDown => Action::CursorDown(page),
                KeyCode::Home | KeyCode::Char('g') => Action::CursorTop,
                KeyCode::End | KeyCode::Char('G') => Action::CursorBottom,
                KeyCode::Enter => Action::OpenDetail,
                KeyCode::Char('f') => Action::OpenFilterForm,
                KeyCode::Char('r') => Action::RefreshHead,
                KeyCode::Esc => Action::DismissToast,
                _ => Action::None,
            };
            Some(action)
        }
        Event::Resize(..) => Some(Action::None),
        _ => Some(Action::None),
    }
}

/// Key handling while the filter form is open.
fn handle_form_key(key: &KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('u') {
        return Action::FormClearField;
    }
    match key.code {
        KeyCode::Esc => Action::FormCancel,
        KeyCode::Enter => Action::FormApply,
        KeyCode::Tab | KeyCode::Down => Action::FormNextField,
        KeyCode::BackTab | KeyCode::Up => Action::FormPrevField,
        KeyCode::Backspace => Action::FormBackspace,
        KeyCode::Char(c) => Action::FormChar(c),
        _ => Action::None,
    }
}
