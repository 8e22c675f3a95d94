//! Table lifecycle state machine.

use serde::{Deserialize, Serialize};

/// The lifecycle state of a table.
///
/// Transitions are strictly ordered, no skipping states:
///
/// ```text
/// Lobby → InProgress → Finished → Destroying
/// ```
///
/// - **Lobby**: players join and leave; nothing is dealt yet.
/// - **InProgress**: a game is running and accepting commands.
/// - **Finished**: a side has won. The result stays readable but commands
///   are refused.
/// - **Destroying**: the table is shutting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableState {
    Lobby,
    InProgress,
    Finished,
    Destroying,
}

impl TableState {
    /// Returns `true` if players may join or leave.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Lobby)
    }

    /// Returns `true` while a game is running.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// The only state this one may move to, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Lobby => Some(Self::InProgress),
            Self::InProgress => Some(Self::Finished),
            Self::Finished => Some(Self::Destroying),
            Self::Destroying => None,
        }
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl std::fmt::Display for TableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
            Self::Destroying => write!(f, "Destroying"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_state_next_follows_strict_order() {
        assert_eq!(TableState::Lobby.next(), Some(TableState::InProgress));
        assert_eq!(TableState::InProgress.next(), Some(TableState::Finished));
        assert_eq!(TableState::Finished.next(), Some(TableState::Destroying));
        assert_eq!(TableState::Destroying.next(), None);
    }

    #[test]
    fn test_table_state_can_transition_to() {
        assert!(TableState::Lobby.can_transition_to(TableState::InProgress));
        assert!(!TableState::Lobby.can_transition_to(TableState::Finished));
        assert!(!TableState::Finished.can_transition_to(TableState::Lobby));
    }

    #[test]
    fn test_table_state_flags() {
        assert!(TableState::Lobby.is_joinable());
        assert!(!TableState::InProgress.is_joinable());
        assert!(TableState::InProgress.is_active());
        assert!(!TableState::Finished.is_active());
    }

    #[test]
    fn test_table_state_display() {
        assert_eq!(TableState::Lobby.to_string(), "Lobby");
        assert_eq!(TableState::Destroying.to_string(), "Destroying");
    }
}
