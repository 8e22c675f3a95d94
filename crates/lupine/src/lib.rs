//! # Lupine
//!
//! Werewolf game tables for group chats.
//!
//! Lupine runs one game per chat group. A chat adapter turns incoming
//! messages into [`Command`](lupine_protocol::Command)s and hands them to a
//! [`GameRegistry`](lupine_room::GameRegistry); the table for that group
//! applies them to its game and pushes every announcement back out through
//! the adapter's [`NotificationSink`](lupine_room::NotificationSink).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use lupine::prelude::*;
//!
//! # async fn run() -> Result<(), LupineError> {
//! lupine::telemetry::init();
//!
//! let (sink, mut notices) = ChannelSink::new();
//! let mut registry = GameRegistry::new();
//! registry.create(GroupId(1), GameConfig::load("lupine.toml")?, Arc::new(sink))?;
//!
//! for id in 1..=6 {
//!     registry.join(GroupId(1), PlayerProfile::new(PlayerId(id))).await?;
//! }
//! registry.start(GroupId(1)).await?;
//!
//! while let Some(delivery) = notices.recv().await {
//!     println!("{:?}: {:?}", delivery.to, delivery.notice);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod telemetry;

pub use error::LupineError;

/// The types a chat adapter needs to run tables.
pub mod prelude {
    pub use crate::LupineError;
    pub use lupine_core::{
        Action, ConfigError, GameConfig, GameError, Notice, Outcome, PhaseKind, PlayerProfile,
        RoleKind, RuleConfig, Seat, TimingConfig, Winner,
    };
    pub use lupine_protocol::{
        Codec, Command, GroupId, JsonCodec, PlayerId, ProtocolError, Recipient, Verb,
    };
    pub use lupine_room::{
        ChannelSink, Delivery, EncodedSink, GameRegistry, NotificationSink, TableError,
        TableHandle, TableInfo, TableState,
    };
}
