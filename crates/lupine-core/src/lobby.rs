//! Pre-game roster: players join and leave until someone starts the game.

use lupine_protocol::PlayerId;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

use crate::{Game, GameConfig, GameError, PlayerProfile};

#[derive(Debug, Clone)]
pub struct Lobby {
    config: GameConfig,
    profiles: Vec<PlayerProfile>,
}

impl Lobby {
    pub fn new(config: GameConfig) -> Self {
        let config = config.validated();
        Self {
            profiles: Vec::with_capacity(config.max_players),
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Joined players in join order.
    pub fn players(&self) -> &[PlayerProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.profiles.iter().any(|p| p.id == id)
    }

    pub fn join(&mut self, profile: PlayerProfile) -> Result<(), GameError> {
        if self.contains(profile.id) {
            return Err(GameError::DuplicatePlayer(profile.id));
        }
        if self.profiles.len() >= self.config.max_players {
            return Err(GameError::RosterFull(self.config.max_players));
        }
        info!(player = %profile.id, seats = self.profiles.len() + 1, "player joined");
        self.profiles.push(profile);
        Ok(())
    }

    /// Returns whether the player was in the lobby.
    pub fn leave(&mut self, id: PlayerId) -> bool {
        let before = self.profiles.len();
        self.profiles.retain(|p| p.id != id);
        let left = self.profiles.len() != before;
        if left {
            info!(player = %id, "player left");
        }
        left
    }

    /// Deals the configured role table at random and starts the game.
    ///
    /// # Errors
    /// [`GameError::RosterTooSmall`] below `min_players`, otherwise whatever
    /// [`GameConfig::role_list`] reports for this player count.
    pub fn start(&self, rng: &mut impl Rng) -> Result<Game, GameError> {
        let count = self.profiles.len();
        if count < self.config.min_players {
            return Err(GameError::RosterTooSmall {
                have: count,
                need: self.config.min_players,
            });
        }
        let mut roles = self.config.role_list(count)?;
        roles.shuffle(rng);
        let seed = rng.random::<u64>();
        Game::with_seed(self.config.clone(), self.profiles.clone(), roles, seed)
    }
}
