//! Terminal-agnostic keyboard input and the key-to-intent mapping.

use rally_client::SessionPhase;
use rally_proto::MoveDirection;

/// Keyboard input abstraction.
///
/// Decouples application logic from terminal libraries (crossterm, termion,
/// etc.) enabling deterministic simulation testing. One value is one
/// key-down; repeats are filtered by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Escape key (quit).
    Esc,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
}

/// What a key means in the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Leave the application.
    Quit,
    /// Move the lobby cursor up.
    SelectPrevious,
    /// Move the lobby cursor down.
    SelectNext,
    /// Challenge the peer under the cursor.
    ChallengeSelected,
    /// Move the paddle one step.
    Move(MoveDirection),
    /// Reconnect now.
    Retry,
}

/// Map a key-down to an intent. `None` for keys with no meaning in `phase`.
///
/// Self-challenge is not checked here; the session rejects it.
pub fn intent(phase: &SessionPhase, key: KeyInput) -> Option<Intent> {
    match (phase, key) {
        (_, KeyInput::Esc | KeyInput::Char('q')) => Some(Intent::Quit),

        (SessionPhase::Lobby, KeyInput::Up | KeyInput::Char('k')) => Some(Intent::SelectPrevious),
        (SessionPhase::Lobby, KeyInput::Down | KeyInput::Char('j')) => Some(Intent::SelectNext),
        (SessionPhase::Lobby, KeyInput::Enter | KeyInput::Char('c')) => {
            Some(Intent::ChallengeSelected)
        },

        (SessionPhase::InMatch, KeyInput::Up | KeyInput::Char('w')) => {
            Some(Intent::Move(MoveDirection::Up))
        },
        (SessionPhase::InMatch, KeyInput::Down | KeyInput::Char('s')) => {
            Some(Intent::Move(MoveDirection::Down))
        },

        (
            SessionPhase::Reconnecting { .. } | SessionPhase::Disconnected { .. },
            KeyInput::Char('r'),
        ) => Some(Intent::Retry),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_works_everywhere() {
        for phase in [SessionPhase::Connecting, SessionPhase::Lobby, SessionPhase::InMatch] {
            assert_eq!(intent(&phase, KeyInput::Esc), Some(Intent::Quit));
            assert_eq!(intent(&phase, KeyInput::Char('q')), Some(Intent::Quit));
        }
    }

    #[test]
    fn arrows_depend_on_phase() {
        assert_eq!(intent(&SessionPhase::Lobby, KeyInput::Up), Some(Intent::SelectPrevious));
        assert_eq!(
            intent(&SessionPhase::InMatch, KeyInput::Up),
            Some(Intent::Move(MoveDirection::Up))
        );
        assert_eq!(intent(&SessionPhase::Connecting, KeyInput::Up), None);
    }

    #[test]
    fn retry_only_when_offline() {
        let offline = SessionPhase::Disconnected { reason: "refused".into() };
        assert_eq!(intent(&offline, KeyInput::Char('r')), Some(Intent::Retry));
        assert_eq!(intent(&SessionPhase::Lobby, KeyInput::Char('r')), None);
    }
}
