//! Terminal events to session actions.
//!
//! The mapping is mode-independent; [`apply_action`](crate::core::session::apply_action)
//! decides what an action means in chat versus palette mode.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::core::constants::SCROLL_PAGE;
use crate::core::session::SessionAction;

pub fn action_for_event(event: &Event) -> Option<SessionAction> {
    match event {
        Event::Key(key) => action_for_key(key),
        _ => None,
    }
}

pub fn action_for_key(key: &KeyEvent) -> Option<SessionAction> {
    // Release and repeat events are reported on some platforms.
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(SessionAction::Quit),
            KeyCode::Char('p') => Some(SessionAction::OpenPalette),
            KeyCode::Char('u') => Some(SessionAction::ClearInput),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Enter => Some(SessionAction::Enter),
        KeyCode::Backspace => Some(SessionAction::Backspace),
        KeyCode::Esc => Some(SessionAction::Escape),
        KeyCode::Up => Some(SessionAction::MoveUp),
        KeyCode::Down => Some(SessionAction::MoveDown),
        KeyCode::PageUp => Some(SessionAction::ScrollUp(SCROLL_PAGE)),
        KeyCode::PageDown => Some(SessionAction::ScrollDown(SCROLL_PAGE)),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::ALT) => {
            Some(SessionAction::TypeChar(ch))
        }
        _ => None,
    }
}
