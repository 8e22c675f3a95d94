//! Error types for the game rules layer.

use lupine_protocol::PlayerId;

use crate::RoleKind;

/// Everything that can go wrong when a player acts, joins, or starts a game.
///
/// All of these are recovered at the orchestrator boundary: the acting
/// player is told, nothing in the game changes, and play continues.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    /// The action is not valid in the current phase (or turn within it).
    #[error("not allowed right now: {0}")]
    IllegalPhase(String),

    /// The target is dead, the actor themself, a teammate, or out of range.
    #[error("illegal target: {0}")]
    IllegalTarget(String),

    /// The actor already acted during this phase occupancy.
    #[error("you have already acted in this phase")]
    AlreadyActed,

    /// The actor is not seated at this table.
    #[error("player {0} is not part of this game")]
    NotParticipant(PlayerId),

    /// The player already joined.
    #[error("player {0} already joined")]
    DuplicatePlayer(PlayerId),

    /// The lobby is at capacity.
    #[error("the game is full ({0} players)")]
    RosterFull(usize),

    /// Not enough players to start.
    #[error("need at least {need} players, have {have}")]
    RosterTooSmall { have: usize, need: usize },

    /// Configuration names a role with no registered capability.
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// Configuration has no usable role table for this player count.
    #[error("no role table configured for {0} players")]
    NoRoleTable(usize),

    /// The action belongs to another role.
    #[error("only the {required} can do that")]
    WrongRole { required: RoleKind },

    /// The command argument could not be interpreted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An optional rule is switched off in the configuration.
    #[error("rule disabled: {0}")]
    RuleDisabled(&'static str),

    /// The game has ended.
    #[error("the game is over")]
    GameFinished,
}

/// Errors from loading a [`GameConfig`](crate::GameConfig) file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
