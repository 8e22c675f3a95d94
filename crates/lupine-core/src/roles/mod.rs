//! Role capabilities.
//!
//! Every seated player is bound to exactly one [`Role`] for the whole game.
//! A role answers four questions through the [`Capability`] trait: may it
//! act now, is this target legal, what happens when it acts, and what should
//! its holder be told when its turn comes.
//!
//! Roles never touch the phase machine. They mutate the roster through a
//! [`RoleContext`] and report a [`RoleOutcome`]; the calling phase decides
//! what the outcome means for the game (deaths, turn completion, notices).

mod guard;
mod hunter;
mod seer;
mod villager;
mod witch;
mod wolf;

use std::fmt;
use std::str::FromStr;

use lupine_protocol::PlayerId;
use serde::{Deserialize, Serialize};

use crate::{GameError, Notice, PhaseKind, Player, Roster, RuleConfig};

pub use guard::Guard;
pub use hunter::Hunter;
pub use seer::{Seer, SeerRecord};
pub use villager::Villager;
pub use witch::Witch;
pub use wolf::{NoKillReason, Wolf, WolfVerdict, tally_wolf_votes};

// ---------------------------------------------------------------------------
// RoleKind & Camp
// ---------------------------------------------------------------------------

/// Win-condition faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Camp {
    Wolf,
    SpecialGood,
    Villager,
}

impl fmt::Display for Camp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Wolf => "wolves",
            Self::SpecialGood => "special roles",
            Self::Villager => "villagers",
        })
    }
}

/// The closed set of roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Villager,
    Guard,
    Seer,
    Witch,
    Hunter,
    Wolf,
}

impl RoleKind {
    /// Order in which role kinds take their night turn.
    pub const NIGHT_ORDER: [RoleKind; 4] = [
        RoleKind::Guard,
        RoleKind::Seer,
        RoleKind::Wolf,
        RoleKind::Witch,
    ];

    pub fn camp(self) -> Camp {
        match self {
            Self::Wolf => Camp::Wolf,
            Self::Villager => Camp::Villager,
            Self::Guard | Self::Seer | Self::Witch | Self::Hunter => Camp::SpecialGood,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Villager => "villager",
            Self::Guard => "guard",
            Self::Seer => "seer",
            Self::Witch => "witch",
            Self::Hunter => "hunter",
            Self::Wolf => "wolf",
        }
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleKind {
    type Err = GameError;

    /// Case-insensitive. `PROPHET` and `SEER` are the same role.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VILLAGER" => Ok(Self::Villager),
            "GUARD" => Ok(Self::Guard),
            "PROPHET" | "SEER" => Ok(Self::Seer),
            "WITCH" => Ok(Self::Witch),
            "HUNTER" => Ok(Self::Hunter),
            "WOLF" => Ok(Self::Wolf),
            _ => Err(GameError::UnknownRole(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Actions and outcomes
// ---------------------------------------------------------------------------

/// What a role is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleAction {
    Protect,
    Check,
    Save,
    Poison,
    Skip,
    Shoot,
    Bite,
}

/// What a role did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleOutcome {
    Protected(PlayerId),
    Checked { target: PlayerId, is_wolf: bool },
    Saved(PlayerId),
    Poisoned(PlayerId),
    Shot(PlayerId),
    /// One wolf's ballot; `None` abstains.
    WolfVote(Option<PlayerId>),
    Skipped,
}

// ---------------------------------------------------------------------------
// Contexts
// ---------------------------------------------------------------------------

/// Read-only view a role sees when validating or prompting.
#[derive(Debug, Clone, Copy)]
pub struct RoleView<'a> {
    pub owner: PlayerId,
    pub roster: &'a Roster,
    pub turn: u32,
    /// Tonight's wolf target, once the pack has decided.
    pub night_victim: Option<PlayerId>,
    pub rules: &'a RuleConfig,
}

/// Mutable context handed to [`Capability::act`].
#[derive(Debug)]
pub struct RoleContext<'a> {
    pub owner: PlayerId,
    pub roster: &'a mut Roster,
    pub turn: u32,
    pub night_victim: Option<PlayerId>,
    pub rules: &'a RuleConfig,
}

impl RoleContext<'_> {
    pub fn view(&self) -> RoleView<'_> {
        RoleView {
            owner: self.owner,
            roster: &*self.roster,
            turn: self.turn,
            night_victim: self.night_victim,
            rules: self.rules,
        }
    }
}

/// Resolves `target` to a living seated player.
pub(crate) fn living_target<'a>(
    view: &RoleView<'a>,
    target: Option<PlayerId>,
) -> Result<&'a Player, GameError> {
    let id = target.ok_or_else(|| GameError::InvalidArgument("a target is required".into()))?;
    let player = view
        .roster
        .get(id)
        .ok_or_else(|| GameError::IllegalTarget(format!("{id} is not seated")))?;
    if !player.alive {
        return Err(GameError::IllegalTarget(format!("{} is dead", player.seat())));
    }
    Ok(player)
}

pub(crate) fn unsupported(kind: RoleKind, action: RoleAction) -> GameError {
    GameError::IllegalPhase(format!("the {kind} cannot {action:?}"))
}

/// Living players other than the owner, as notice seats.
pub(crate) fn living_others(view: &RoleView<'_>) -> Vec<crate::Seat> {
    let filter = crate::AliveFilter::new().excluding(view.owner);
    view.roster.alive(&filter).map(Player::seat).collect()
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// Behavior shared by every role.
pub trait Capability {
    fn kind(&self) -> RoleKind;

    /// Whether `owner` may use this role's ability during `phase`.
    fn can_act(&self, owner: &Player, phase: PhaseKind) -> bool;

    /// Role-specific target legality.
    fn is_valid_target(
        &self,
        view: &RoleView<'_>,
        target: Option<PlayerId>,
        action: RoleAction,
    ) -> Result<(), GameError>;

    /// Validates, then applies the role's effect.
    fn act(
        &mut self,
        ctx: &mut RoleContext<'_>,
        target: Option<PlayerId>,
        action: RoleAction,
    ) -> Result<RoleOutcome, GameError>;

    /// Private message sent to the holder when their turn comes.
    fn prompt(&self, view: &RoleView<'_>, secs: u64) -> Notice;
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// A role instance with its private state, tagged by kind.
#[derive(Debug, Clone)]
pub enum Role {
    Villager(Villager),
    Guard(Guard),
    Seer(Seer),
    Witch(Witch),
    Hunter(Hunter),
    Wolf(Wolf),
}

impl Role {
    pub fn new(kind: RoleKind) -> Self {
        match kind {
            RoleKind::Villager => Self::Villager(Villager),
            RoleKind::Guard => Self::Guard(Guard::default()),
            RoleKind::Seer => Self::Seer(Seer::default()),
            RoleKind::Witch => Self::Witch(Witch::default()),
            RoleKind::Hunter => Self::Hunter(Hunter::default()),
            RoleKind::Wolf => Self::Wolf(Wolf),
        }
    }

    pub fn kind(&self) -> RoleKind {
        self.capability().kind()
    }

    pub fn capability(&self) -> &dyn Capability {
        match self {
            Self::Villager(role) => role,
            Self::Guard(role) => role,
            Self::Seer(role) => role,
            Self::Witch(role) => role,
            Self::Hunter(role) => role,
            Self::Wolf(role) => role,
        }
    }

    pub fn capability_mut(&mut self) -> &mut dyn Capability {
        match self {
            Self::Villager(role) => role,
            Self::Guard(role) => role,
            Self::Seer(role) => role,
            Self::Witch(role) => role,
            Self::Hunter(role) => role,
            Self::Wolf(role) => role,
        }
    }

    pub fn as_seer(&self) -> Option<&Seer> {
        match self {
            Self::Seer(seer) => Some(seer),
            _ => None,
        }
    }

    pub fn as_witch(&self) -> Option<&Witch> {
        match self {
            Self::Witch(witch) => Some(witch),
            _ => None,
        }
    }

    pub fn as_hunter_mut(&mut self) -> Option<&mut Hunter> {
        match self {
            Self::Hunter(hunter) => Some(hunter),
            _ => None,
        }
    }
}
