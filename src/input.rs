use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::components::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Move(Direction),
    ToggleSound,
    Restart,
    Quit,
}

/// Maps a key event to what the player meant. Releases and unbound keys
/// map to nothing.
pub fn intent_for(key: KeyEvent) -> Option<Intent> {
    match key.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => {}
        KeyEventKind::Release => return None,
    }
    let intent = match key.code {
        KeyCode::Up | KeyCode::Char('k') => Intent::Move(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => Intent::Move(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') => Intent::Move(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => Intent::Move(Direction::Right),
        KeyCode::Char('m') => Intent::ToggleSound,
        KeyCode::Char('r') => Intent::Restart,
        KeyCode::Char('q') | KeyCode::Esc => Intent::Quit,
        _ => return None,
    };
    Some(intent)
}
