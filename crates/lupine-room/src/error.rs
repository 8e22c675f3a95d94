//! Error types for the table layer.

use lupine_core::GameError;
use lupine_protocol::GroupId;

/// Errors that can occur during table operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    /// No table is bound to this group.
    #[error("no game in group {0}")]
    NotFound(GroupId),

    /// The group already has a table.
    #[error("group {0} already has a game")]
    AlreadyExists(GroupId),

    /// The table is in a state that doesn't allow this operation,
    /// for example joining a game that has already started.
    #[error("invalid table state for this operation: {0}")]
    InvalidState(String),

    /// The table's command channel is closed.
    #[error("table for group {0} is unavailable")]
    Unavailable(GroupId),

    /// The game refused the request.
    #[error(transparent)]
    Game(#[from] GameError),
}
