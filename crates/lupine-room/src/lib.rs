//! Table actors and the game registry for Lupine.
//!
//! Each chat group gets at most one table. A table runs as an isolated
//! Tokio task (actor model) that owns its lobby, its [`Game`] once started,
//! and the deadline scheduler driving the game's phase timers.
//!
//! # Key types
//!
//! - [`GameRegistry`]: creates, finds, and removes tables by group
//! - [`TableHandle`]: send commands to a running table actor
//! - [`TableState`]: lifecycle state machine
//! - [`NotificationSink`]: where the table delivers game notices
//!
//! [`Game`]: lupine_core::Game

mod error;
mod registry;
mod sink;
mod state;
mod table;

pub use error::TableError;
pub use registry::GameRegistry;
pub use sink::{ChannelSink, Delivery, EncodedSink, NotificationSink};
pub use state::TableState;
pub use table::{TableHandle, TableInfo};
