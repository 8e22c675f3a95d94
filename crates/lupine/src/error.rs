//! Unified error type for Lupine.

use lupine_core::{ConfigError, GameError};
use lupine_protocol::ProtocolError;
use lupine_room::TableError;

/// Top-level error that wraps all crate-specific errors.
///
/// Each variant converts from its crate's error with `?`.
#[derive(Debug, thiserror::Error)]
pub enum LupineError {
    /// A chat line could not be turned into a command.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The game rules rejected an action.
    #[error(transparent)]
    Game(#[from] GameError),

    /// A configuration file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A table was missing, gone, or in the wrong state.
    #[error(transparent)]
    Table(#[from] TableError),
}

impl LupineError {
    /// Whether the error came from a player's own input rather than from
    /// the host, so it is worth echoing back to them.
    pub fn is_player_facing(&self) -> bool {
        match self {
            Self::Protocol(_) | Self::Game(_) => true,
            Self::Table(TableError::Game(_) | TableError::InvalidState(_)) => true,
            Self::Table(_) | Self::Config(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use lupine_protocol::{GroupId, PlayerId};

    use super::*;

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::UnknownVerb("#dance".into());
        let lupine_err: LupineError = err.into();
        assert!(matches!(lupine_err, LupineError::Protocol(_)));
        assert!(lupine_err.to_string().contains("#dance"));
    }

    #[test]
    fn test_from_game_error() {
        let lupine_err: LupineError = GameError::AlreadyActed.into();
        assert!(matches!(lupine_err, LupineError::Game(GameError::AlreadyActed)));
        assert!(lupine_err.is_player_facing());
    }

    #[test]
    fn test_from_config_error() {
        let err = lupine_core::GameConfig::from_toml_str("min_players = \"six\"").unwrap_err();
        let lupine_err: LupineError = err.into();
        assert!(matches!(lupine_err, LupineError::Config(ConfigError::Parse(_))));
        assert!(!lupine_err.is_player_facing());
    }

    #[test]
    fn test_from_table_error() {
        let lupine_err: LupineError = TableError::NotFound(GroupId(3)).into();
        assert!(matches!(lupine_err, LupineError::Table(_)));
        assert!(!lupine_err.is_player_facing());

        let rejected: LupineError =
            TableError::Game(GameError::NotParticipant(PlayerId(9))).into();
        assert!(rejected.is_player_facing());
    }
}
