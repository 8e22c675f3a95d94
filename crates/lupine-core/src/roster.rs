//! Player roster: identity, seat numbers, liveness, sheriff title.

use std::collections::HashMap;

use lupine_protocol::PlayerId;
use serde::{Deserialize, Serialize};

use crate::{Camp, GameError, RoleKind, Seat};

/// Display name used when a player has no name source at all.
pub const UNKNOWN_PLAYER: &str = "unknown player";

// ---------------------------------------------------------------------------
// PlayerProfile
// ---------------------------------------------------------------------------

/// What the chat platform knows about a player when they join.
///
/// The display name is resolved from the first non-empty source in order:
/// group card, group nickname, sender nickname.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub card: Option<String>,
    pub nickname: Option<String>,
    pub sender_nickname: Option<String>,
}

impl PlayerProfile {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn with_card(mut self, card: impl Into<String>) -> Self {
        self.card = Some(card.into());
        self
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    pub fn with_sender_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.sender_nickname = Some(nickname.into());
        self
    }

    pub fn display_name(&self) -> String {
        [&self.card, &self.nickname, &self.sender_nickname]
            .into_iter()
            .flatten()
            .map(|name| name.trim())
            .find(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_PLAYER)
            .to_string()
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// How a player died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeathReason {
    WolfKill,
    Exile,
    Poison,
    HunterShot,
    SelfDestruct,
}

impl std::fmt::Display for DeathReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::WolfKill => "killed by wolves",
            Self::Exile => "exiled",
            Self::Poison => "poisoned",
            Self::HunterShot => "shot by the hunter",
            Self::SelfDestruct => "self-destructed",
        })
    }
}

/// One seated player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Seat number, 1..=N. Zero until [`Roster::assign_numbers`] runs.
    pub number: u32,
    pub role: RoleKind,
    pub alive: bool,
    pub sheriff: bool,
    pub death: Option<DeathReason>,
    /// Guarded tonight. Cleared at dawn.
    pub protected: bool,
}

impl Player {
    pub fn camp(&self) -> Camp {
        self.role.camp()
    }

    pub fn seat(&self) -> Seat {
        Seat {
            id: self.id,
            number: self.number,
            name: self.name.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// AliveFilter
// ---------------------------------------------------------------------------

/// Narrows [`Roster::alive`].
#[derive(Debug, Clone, Default)]
pub struct AliveFilter {
    exclude: Vec<PlayerId>,
    exclude_camp: Option<Camp>,
    role: Option<RoleKind>,
}

impl AliveFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn excluding(mut self, id: PlayerId) -> Self {
        self.exclude.push(id);
        self
    }

    pub fn excluding_camp(mut self, camp: Camp) -> Self {
        self.exclude_camp = Some(camp);
        self
    }

    pub fn with_role(mut self, role: RoleKind) -> Self {
        self.role = Some(role);
        self
    }

    fn admits(&self, player: &Player) -> bool {
        player.alive
            && !self.exclude.contains(&player.id)
            && self.exclude_camp != Some(player.camp())
            && self.role.is_none_or(|role| role == player.role)
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Seated players in join order with O(1) lookup by id and by number.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    players: Vec<Player>,
    by_id: HashMap<PlayerId, usize>,
    by_number: HashMap<u32, usize>,
    capacity: usize,
}

impl Roster {
    pub fn new(capacity: usize) -> Self {
        Self {
            players: Vec::with_capacity(capacity),
            capacity,
            ..Self::default()
        }
    }

    /// Seats a player with their role. Numbers are assigned later.
    pub fn add_player(&mut self, profile: &PlayerProfile, role: RoleKind) -> Result<(), GameError> {
        if self.by_id.contains_key(&profile.id) {
            return Err(GameError::DuplicatePlayer(profile.id));
        }
        if self.players.len() >= self.capacity {
            return Err(GameError::RosterFull(self.capacity));
        }
        self.by_id.insert(profile.id, self.players.len());
        self.players.push(Player {
            id: profile.id,
            name: profile.display_name(),
            number: 0,
            role,
            alive: true,
            sheriff: false,
            death: None,
            protected: false,
        });
        Ok(())
    }

    /// Numbers players 1..=N in join order. Only the first call has any
    /// effect; returns whether numbers were assigned.
    pub fn assign_numbers(&mut self) -> bool {
        if !self.by_number.is_empty() {
            return false;
        }
        for (index, player) in self.players.iter_mut().enumerate() {
            let number = index as u32 + 1;
            player.number = number;
            self.by_number.insert(number, index);
        }
        true
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.by_id.get(&id).map(|&i| &self.players[i])
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.by_id.get(&id).map(|&i| &mut self.players[i])
    }

    pub fn by_number(&self, number: u32) -> Option<&Player> {
        self.by_number.get(&number).map(|&i| &self.players[i])
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.get(id).is_some_and(|p| p.alive)
    }

    /// Living players matching `filter`, in seat order. The iterator is
    /// `Clone`, so it can be walked more than once.
    pub fn alive<'a>(&'a self, filter: &'a AliveFilter) -> impl Iterator<Item = &'a Player> + Clone + 'a {
        self.players.iter().filter(move |p| filter.admits(p))
    }

    pub fn living_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    /// Everyone, in seat order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }

    pub fn sheriff(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.sheriff)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
