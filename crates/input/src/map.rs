//! Key mapping from terminal events to game actions.

use blockfall_types::{Action, CELL_HEIGHT, CELL_WIDTH};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Map keyboard input to game actions.
pub fn action_for_key(code: KeyCode) -> Option<Action> {
    match code {
        // Movement (one cell per press)
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Action::Move {
            dx: -CELL_WIDTH,
            dy: 0,
        }),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Action::Move {
            dx: CELL_WIDTH,
            dy: 0,
        }),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Action::Move {
            dx: 0,
            dy: CELL_HEIGHT,
        }),

        // Rotation
        KeyCode::Up | KeyCode::Char('.') | KeyCode::Char('k') | KeyCode::Char('K') => {
            Some(Action::Rotate)
        }

        // Hard drop
        KeyCode::Char(' ') => Some(Action::Drop),

        // Restart
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::Reset),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_keys() {
        assert_eq!(
            action_for_key(KeyCode::Left),
            Some(Action::Move {
                dx: -CELL_WIDTH,
                dy: 0
            })
        );
        assert_eq!(
            action_for_key(KeyCode::Char('D')),
            Some(Action::Move {
                dx: CELL_WIDTH,
                dy: 0
            })
        );
        assert_eq!(
            action_for_key(KeyCode::Down),
            Some(Action::Move {
                dx: 0,
                dy: CELL_HEIGHT
            })
        );
    }

    #[test]
    fn test_rotate_and_drop_keys() {
        assert_eq!(action_for_key(KeyCode::Char('.')), Some(Action::Rotate));
        assert_eq!(action_for_key(KeyCode::Up), Some(Action::Rotate));
        assert_eq!(action_for_key(KeyCode::Char(' ')), Some(Action::Drop));
    }

    #[test]
    fn test_reset_key() {
        assert_eq!(action_for_key(KeyCode::Char('r')), Some(Action::Reset));
        assert_eq!(action_for_key(KeyCode::Char('R')), Some(Action::Reset));
    }

    #[test]
    fn test_unmapped_keys() {
        assert_eq!(action_for_key(KeyCode::Char('x')), None);
        assert_eq!(action_for_key(KeyCode::Tab), None);
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Char('q'))));
        assert!(should_quit(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('x'))));
    }
}
