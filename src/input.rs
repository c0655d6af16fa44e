//! Key bindings. The board plays itself, so keys only drive the host.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Reset,
    Fill,
    None,
}

/// Map key event to host action. Ctrl-C quits as well, since raw mode swallows the signal.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    match code {
        KeyCode::Char('c') if modifiers == KeyModifiers::CONTROL => Action::Quit,
        KeyCode::Char('q' | 'Q') | KeyCode::Esc if no_mod => Action::Quit,
        KeyCode::Char('r' | 'R') if no_mod => Action::Reset,
        KeyCode::Char('f' | 'F') if no_mod => Action::Fill,
        _ => Action::None,
    }
}
