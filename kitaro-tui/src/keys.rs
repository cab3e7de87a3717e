//! Keybinding definitions for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Whether printable keys edit text or trigger commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Navigate,
    Typing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    NextView,
    PrevView,
    SwitchView(usize),
    /// Enter: run the active step, or submit what was typed.
    Confirm,
    Cancel,
    Refresh,
    OpenSearch,
    InsertChar(char),
    DeleteChar,
}

pub fn map_key(event: KeyEvent, mode: InputMode) -> Option<KeyAction> {
    let KeyEvent {
        code,
        modifiers,
        kind,
        ..
    } = event;

    if kind == KeyEventKind::Release {
        return None;
    }

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(KeyAction::Quit),
            KeyCode::Char('r') => Some(KeyAction::Refresh),
            _ => None,
        };
    }

    match code {
        KeyCode::Enter => return Some(KeyAction::Confirm),
        KeyCode::Esc => return Some(KeyAction::Cancel),
        KeyCode::Tab => return Some(KeyAction::NextView),
        KeyCode::BackTab => return Some(KeyAction::PrevView),
        _ => {}
    }

    match mode {
        InputMode::Typing => match code {
            KeyCode::Char(c) => Some(KeyAction::InsertChar(c)),
            KeyCode::Backspace => Some(KeyAction::DeleteChar),
            _ => None,
        },
        InputMode::Navigate => match code {
            KeyCode::Char('q') => Some(KeyAction::Quit),
            KeyCode::Char(' ') => Some(KeyAction::Confirm),
            KeyCode::Char('r') => Some(KeyAction::Refresh),
            KeyCode::Char('/') => Some(KeyAction::OpenSearch),
            KeyCode::Char('1') => Some(KeyAction::SwitchView(0)),
            KeyCode::Char('2') => Some(KeyAction::SwitchView(1)),
            _ => None,
        },
    }
}
