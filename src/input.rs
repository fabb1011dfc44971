//! Key bindings: arrows plus vim-style letters.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Command from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    RotateCw,
    RotateCcw,
    Pause,
    Quit,
    None,
}

/// Map key event to a command. Anything unbound, or chorded with Alt/Ctrl, is `None`.
pub fn key_to_command(key: KeyEvent) -> Command {
    let KeyEvent { code, modifiers, .. } = key;
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
            return Command::Quit;
        }
        return Command::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        KeyCode::Char('p') => Command::Pause,
        KeyCode::Left | KeyCode::Char('h') => Command::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => Command::MoveRight,
        KeyCode::Down | KeyCode::Char('j') => Command::SoftDrop,
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('x') => Command::RotateCw,
        KeyCode::Char('z') | KeyCode::Char('u') => Command::RotateCcw,
        _ => Command::None,
    }
}
