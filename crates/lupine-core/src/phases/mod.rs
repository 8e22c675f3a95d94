//! The phase state machine.
//!
//! Each phase is a struct holding only the data its own protocol needs. The
//! orchestrator owns exactly one current [`Phase`] and drives it through the
//! [`PhaseState`] lifecycle:
//!
//! 1. constructed right before entry (or earlier, as a carried "next" phase),
//! 2. `on_enter` once,
//! 3. `handle_action` / `on_timeout` any number of times,
//! 4. `on_exit` once, after which the instance is dropped.
//!
//! Handlers never switch phases themselves. They return a [`Transition`] and
//! the orchestrator performs it, so a transition can never start inside
//! another one.

mod day;
mod election;
mod game_over;
mod hunter_shot;
mod last_words;
mod night;
mod transfer;
mod vote;

use std::fmt;
use std::time::Duration;

use lupine_protocol::PlayerId;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::world::World;
use crate::{Action, DeathReason, GameError, Notice, RoleKind, TimerId};

pub use day::DayPhase;
pub use election::ElectionPhase;
pub use game_over::GameOverPhase;
pub use hunter_shot::HunterShotPhase;
pub use last_words::LastWordsPhase;
pub use night::{DawnReport, NightPhase};
pub use transfer::TransferPhase;
pub use vote::{ExileVerdict, VotePhase, VoteTally, tally_votes};

// ---------------------------------------------------------------------------
// PhaseKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    Night,
    Day,
    Vote,
    SheriffElection,
    SheriffTransfer,
    LastWords,
    HunterShot,
    GameOver,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Night => "night",
            Self::Day => "day",
            Self::Vote => "vote",
            Self::SheriffElection => "sheriff-election",
            Self::SheriffTransfer => "sheriff-transfer",
            Self::LastWords => "last-words",
            Self::HunterShot => "hunter-shot",
            Self::GameOver => "game-over",
        })
    }
}

// ---------------------------------------------------------------------------
// Transition & PhaseState
// ---------------------------------------------------------------------------

/// What a handler wants the orchestrator to do next.
#[derive(Debug)]
pub enum Transition {
    Stay,
    Goto(Box<Phase>),
}

impl Transition {
    pub fn to(phase: impl Into<Phase>) -> Self {
        Self::Goto(Box::new(phase.into()))
    }
}

/// Lifecycle shared by every phase.
///
/// `on_enter` and `on_exit` cannot fail, so the orchestrator always ends a
/// transition with a phase installed. Action handlers validate everything
/// before mutating, so an `Err` leaves the phase untouched.
pub trait PhaseState {
    fn kind(&self) -> PhaseKind;

    fn on_enter(&mut self, world: &mut World) -> Transition;

    fn on_exit(&mut self, world: &mut World);

    fn handle_action(
        &mut self,
        world: &mut World,
        actor: PlayerId,
        action: &Action,
    ) -> Result<Transition, GameError>;

    /// Called when timer `seq` of this occupancy fires. `None` means the
    /// phase was no longer waiting on it.
    fn on_timeout(&mut self, world: &mut World, seq: u32) -> Option<Transition>;

    /// Whether a dead `actor` may act in this phase.
    fn admits_dead(&self, _actor: PlayerId) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The closed set of phases.
#[derive(Debug)]
pub enum Phase {
    Night(NightPhase),
    Day(DayPhase),
    Vote(VotePhase),
    SheriffElection(ElectionPhase),
    SheriffTransfer(TransferPhase),
    LastWords(LastWordsPhase),
    HunterShot(HunterShotPhase),
    GameOver(GameOverPhase),
}

impl Phase {
    pub fn state(&self) -> &dyn PhaseState {
        match self {
            Self::Night(p) => p,
            Self::Day(p) => p,
            Self::Vote(p) => p,
            Self::SheriffElection(p) => p,
            Self::SheriffTransfer(p) => p,
            Self::LastWords(p) => p,
            Self::HunterShot(p) => p,
            Self::GameOver(p) => p,
        }
    }

    pub fn state_mut(&mut self) -> &mut dyn PhaseState {
        match self {
            Self::Night(p) => p,
            Self::Day(p) => p,
            Self::Vote(p) => p,
            Self::SheriffElection(p) => p,
            Self::SheriffTransfer(p) => p,
            Self::LastWords(p) => p,
            Self::HunterShot(p) => p,
            Self::GameOver(p) => p,
        }
    }

    pub fn kind(&self) -> PhaseKind {
        self.state().kind()
    }
}

macro_rules! phase_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(impl From<$ty> for Phase {
            fn from(phase: $ty) -> Self {
                Phase::$variant(phase)
            }
        })*
    };
}

phase_from! {
    Night => NightPhase,
    Day => DayPhase,
    Vote => VotePhase,
    SheriffElection => ElectionPhase,
    SheriffTransfer => TransferPhase,
    LastWords => LastWordsPhase,
    HunterShot => HunterShotPhase,
    GameOver => GameOverPhase,
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// The one timer a phase is waiting on, if any.
///
/// Re-arming cancels the previous timer, so a phase never has two live
/// deadlines and a late firing of the old one is ignored.
#[derive(Debug, Default)]
pub(crate) struct PhaseTimer {
    armed: Option<TimerId>,
    seq: u32,
}

impl PhaseTimer {
    pub(crate) fn arm(&mut self, world: &mut World, after: Duration) {
        self.cancel(world);
        self.seq += 1;
        self.armed = Some(world.arm_timer(self.seq, after));
    }

    pub(crate) fn cancel(&mut self, world: &mut World) {
        if let Some(id) = self.armed.take() {
            world.cancel_timer(id);
        }
    }

    /// Consumes the armed timer if `seq` is the one being waited on.
    pub(crate) fn fire(&mut self, seq: u32) -> bool {
        match self.armed {
            Some(id) if id.seq == seq => {
                self.armed = None;
                true
            }
            _ => false,
        }
    }
}

/// Takes the carried next phase, or stays put if it was already taken.
pub(crate) fn resume(next: &mut Option<Box<Phase>>) -> Transition {
    match next.take() {
        Some(phase) => Transition::Goto(phase),
        None => {
            tracing::warn!("resume target already consumed, staying");
            Transition::Stay
        }
    }
}

/// A living wolf reveals and dies, ending the day. Shared by Day and Vote.
pub(crate) fn wolf_self_destruct(world: &mut World, actor: PlayerId) -> Result<Transition, GameError> {
    if !world.config.rules.wolf_self_destruct {
        return Err(GameError::RuleDisabled("wolf self-destruct"));
    }
    if world.role_of(actor) != Some(RoleKind::Wolf) {
        return Err(GameError::WrongRole {
            required: RoleKind::Wolf,
        });
    }
    let seat = world.seat(actor);
    world.handle_player_death(actor, DeathReason::SelfDestruct);
    world.broadcast(Notice::WolfSelfDestructed { wolf: seat });
    info!(wolf = %actor, turn = world.turn, "wolf self-destructed");
    Ok(Transition::to(NightPhase::new(world.turn + 1)))
}
