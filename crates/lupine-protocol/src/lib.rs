//! Shared vocabulary for Lupine.
//!
//! This crate defines the "language" spoken at the edge of a game table:
//!
//! - **Identity** ([`PlayerId`], [`GroupId`]): who is talking, and in
//!   which chat group.
//! - **Commands** ([`Command`], [`Verb`]): what a player asked for, after the
//!   chat router has split a message into `(actor, group, verb, argument)`.
//! - **Addressing** ([`Recipient`]): where an outbound notice should go.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those values are
//!   converted to and from bytes.
//!
//! The protocol layer knows nothing about phases or roles. It only knows how
//! to name things and how to serialize them.
//!
//! ```text
//! Chat text → Router → Command → GameRegistry → Game
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{Command, GroupId, PlayerId, Recipient, Verb};
