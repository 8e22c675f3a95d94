//! Werewolf game rules for Lupine.
//!
//! This crate is the synchronous heart of a table: the player roster, the
//! role capabilities, the phase state machine, and the [`Game`] orchestrator
//! that ties them together. It performs no I/O. Every operation appends
//! [`Effect`]s (notices to send, timers to arm or cancel) that the caller
//! drains with [`Game::take_effects`] and executes however it likes.
//!
//! ```rust
//! use lupine_core::{Action, Effect, Game, GameConfig, PlayerProfile, RoleKind};
//! use lupine_protocol::PlayerId;
//!
//! let profiles: Vec<_> = (1..=6).map(|n| PlayerProfile::new(PlayerId(n))).collect();
//! let roles = vec![
//!     RoleKind::Wolf, RoleKind::Wolf, RoleKind::Guard,
//!     RoleKind::Seer, RoleKind::Witch, RoleKind::Villager,
//! ];
//! let mut game = Game::with_seed(GameConfig::default(), profiles, roles, 7).unwrap();
//!
//! // The guard moves first on night 0.
//! game.handle_action(PlayerId(3), Action::Guard(4)).unwrap();
//! assert!(game.take_effects().iter().any(|e| matches!(e, Effect::ArmTimer { .. })));
//! ```

pub mod action;
pub mod config;
pub mod effect;
pub mod error;
pub mod game;
pub mod lobby;
pub mod notice;
pub mod phases;
pub mod roles;
pub mod roster;
pub mod world;

pub use action::Action;
pub use config::{GameConfig, RuleConfig, TimingConfig};
pub use effect::{Effect, PhaseToken, TimerId};
pub use error::{ConfigError, GameError};
pub use game::Game;
pub use lobby::Lobby;
pub use notice::{Notice, Outcome, Reveal, Seat, VoteLine, VoteVerdict, WinReason, Winner};
pub use phases::{DawnReport, ExileVerdict, Phase, PhaseKind, VoteTally, tally_votes};
pub use roles::{Camp, Capability, NoKillReason, Role, RoleAction, RoleKind, RoleOutcome, WolfVerdict};
pub use roster::{AliveFilter, DeathReason, Player, PlayerProfile, Roster};
