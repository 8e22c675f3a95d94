//! Game configuration: player limits, timers, optional rules, role tables.
//!
//! A table resolves its configuration once, when it is created, and treats
//! it as read-only afterwards.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{ConfigError, GameError, RoleKind};

// ---------------------------------------------------------------------------
// TimingConfig
// ---------------------------------------------------------------------------

/// Time limits, in seconds, for every timed wait in the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Per-speaker limit during the day.
    pub speech_secs: u64,
    /// Per role-kind turn at night.
    pub night_secs: u64,
    /// Day exile vote.
    pub vote_secs: u64,
    pub last_words_secs: u64,
    /// Window for self-nominations.
    pub sheriff_register_secs: u64,
    /// Per-candidate speech.
    pub sheriff_speech_secs: u64,
    pub sheriff_vote_secs: u64,
    pub sheriff_transfer_secs: u64,
    pub hunter_shot_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            speech_secs: 60,
            night_secs: 60,
            vote_secs: 60,
            last_words_secs: 60,
            sheriff_register_secs: 30,
            sheriff_speech_secs: 60,
            sheriff_vote_secs: 60,
            sheriff_transfer_secs: 30,
            hunter_shot_secs: 30,
        }
    }
}

impl TimingConfig {
    fn validated(mut self) -> Self {
        for (name, secs) in [
            ("speech_secs", &mut self.speech_secs),
            ("night_secs", &mut self.night_secs),
            ("vote_secs", &mut self.vote_secs),
            ("last_words_secs", &mut self.last_words_secs),
            ("sheriff_register_secs", &mut self.sheriff_register_secs),
            ("sheriff_speech_secs", &mut self.sheriff_speech_secs),
            ("sheriff_vote_secs", &mut self.sheriff_vote_secs),
            ("sheriff_transfer_secs", &mut self.sheriff_transfer_secs),
            ("hunter_shot_secs", &mut self.hunter_shot_secs),
        ] {
            if *secs == 0 {
                warn!(timer = name, "zero time limit, raising to 1s");
                *secs = 1;
            }
        }
        self
    }
}

/// Converts a configured number of seconds to a [`Duration`].
pub(crate) fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

// ---------------------------------------------------------------------------
// RuleConfig
// ---------------------------------------------------------------------------

/// Optional rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Elect a sheriff after the first night.
    pub sheriff_election: bool,
    /// Wolves may reveal themselves and die to end the day.
    pub wolf_self_destruct: bool,
    /// The witch may use the antidote on herself.
    pub witch_self_save: bool,
    /// Wolves win as soon as either good camp is wiped out.
    pub camp_sweep: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            sheriff_election: true,
            wolf_self_destruct: false,
            witch_self_save: false,
            camp_sweep: false,
        }
    }
}

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Full configuration for one table.
///
/// Every field has a default, so a config file only needs the keys it wants
/// to change:
///
/// ```toml
/// max_players = 9
///
/// [timing]
/// speech_secs = 90
///
/// [rules]
/// camp_sweep = true
///
/// [role_tables]
/// 6 = ["WOLF", "WOLF", "PROPHET", "WITCH", "VILLAGER", "VILLAGER"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub min_players: usize,
    pub max_players: usize,
    /// An exile needs strictly more weighted votes than this.
    pub min_votes_to_exile: f64,
    pub timing: TimingConfig,
    pub rules: RuleConfig,
    /// Player count (as a string key) → role identifiers.
    pub role_tables: BTreeMap<String, Vec<String>>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 6,
            max_players: 12,
            min_votes_to_exile: 0.0,
            timing: TimingConfig::default(),
            rules: RuleConfig::default(),
            role_tables: default_role_tables(),
        }
    }
}

impl GameConfig {
    /// Smallest table the rules make sense for.
    pub const MIN_SUPPORTED_PLAYERS: usize = 3;

    /// Parses a TOML document and validates it.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(source)?;
        Ok(config.validated())
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Clamps out-of-range values so the config is safe to use.
    ///
    /// - `min_players` raised to [`Self::MIN_SUPPORTED_PLAYERS`].
    /// - `max_players` raised to `min_players`.
    /// - negative `min_votes_to_exile` becomes 0.
    /// - zero timers become 1 s.
    pub fn validated(mut self) -> Self {
        if self.min_players < Self::MIN_SUPPORTED_PLAYERS {
            warn!(
                min_players = self.min_players,
                floor = Self::MIN_SUPPORTED_PLAYERS,
                "min_players below supported floor, clamping"
            );
            self.min_players = Self::MIN_SUPPORTED_PLAYERS;
        }
        if self.max_players < self.min_players {
            warn!(
                max_players = self.max_players,
                min_players = self.min_players,
                "max_players below min_players, clamping"
            );
            self.max_players = self.min_players;
        }
        if !(self.min_votes_to_exile >= 0.0) {
            warn!(value = self.min_votes_to_exile, "min_votes_to_exile invalid, using 0");
            self.min_votes_to_exile = 0.0;
        }
        self.timing = self.timing.validated();
        self
    }

    /// The role list for `player_count` players.
    ///
    /// # Errors
    /// [`GameError::NoRoleTable`] if no table exists or its length differs
    /// from the player count; [`GameError::UnknownRole`] if an entry names
    /// no known role.
    pub fn role_list(&self, player_count: usize) -> Result<Vec<RoleKind>, GameError> {
        let table = self
            .role_tables
            .get(&player_count.to_string())
            .ok_or(GameError::NoRoleTable(player_count))?;
        if table.len() != player_count {
            return Err(GameError::NoRoleTable(player_count));
        }
        table.iter().map(|name| name.parse()).collect()
    }
}

fn default_role_tables() -> BTreeMap<String, Vec<String>> {
    const W: &str = "WOLF";
    const V: &str = "VILLAGER";
    const S: &str = "PROPHET";
    const X: &str = "WITCH";
    const H: &str = "HUNTER";
    const G: &str = "GUARD";

    let tables: [(usize, &[&str]); 7] = [
        (6, &[W, W, G, S, X, V]),
        (7, &[W, W, G, S, X, H, V]),
        (8, &[W, W, W, G, S, X, H, V]),
        (9, &[W, W, W, S, X, H, V, V, V]),
        (10, &[W, W, W, G, S, X, H, V, V, V]),
        (11, &[W, W, W, W, G, S, X, H, V, V, V]),
        (12, &[W, W, W, W, G, S, X, H, V, V, V, V]),
    ];
    tables
        .into_iter()
        .map(|(n, roles)| (n.to_string(), roles.iter().map(|r| r.to_string()).collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_cover_player_range() {
        let config = GameConfig::default();
        for n in config.min_players..=config.max_players {
            let roles = config.role_list(n).unwrap();
            assert_eq!(roles.len(), n);
            assert!(roles.contains(&RoleKind::Wolf));
        }
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            max_players = 9

            [timing]
            speech_secs = 90

            [rules]
            camp_sweep = true
            "#,
        )
        .unwrap();
        assert_eq!(config.max_players, 9);
        assert_eq!(config.min_players, 6);
        assert_eq!(config.timing.speech_secs, 90);
        assert_eq!(config.timing.vote_secs, 60);
        assert!(config.rules.camp_sweep);
        assert!(config.rules.sheriff_election);
    }

    #[test]
    fn test_toml_role_table_overrides() {
        let config = GameConfig::from_toml_str(
            r#"
            [role_tables]
            6 = ["wolf", "wolf", "seer", "witch", "villager", "villager"]
            "#,
        )
        .unwrap();
        let roles = config.role_list(6).unwrap();
        assert_eq!(roles.iter().filter(|r| **r == RoleKind::Wolf).count(), 2);
        assert!(roles.contains(&RoleKind::Seer));
    }

    #[test]
    fn test_unknown_role_in_table() {
        let mut config = GameConfig::default();
        config.role_tables.insert(
            "3".into(),
            vec!["WOLF".into(), "DOPPELGANGER".into(), "VILLAGER".into()],
        );
        assert_eq!(
            config.role_list(3),
            Err(GameError::UnknownRole("DOPPELGANGER".into()))
        );
    }

    #[test]
    fn test_missing_or_mismatched_table() {
        let mut config = GameConfig::default();
        assert_eq!(config.role_list(20), Err(GameError::NoRoleTable(20)));
        config.role_tables.insert("4".into(), vec!["WOLF".into()]);
        assert_eq!(config.role_list(4), Err(GameError::NoRoleTable(4)));
    }

    #[test]
    fn test_validated_clamps() {
        let config = GameConfig {
            min_players: 1,
            max_players: 0,
            min_votes_to_exile: -2.0,
            timing: TimingConfig {
                vote_secs: 0,
                ..TimingConfig::default()
            },
            ..GameConfig::default()
        }
        .validated();
        assert_eq!(config.min_players, GameConfig::MIN_SUPPORTED_PLAYERS);
        assert_eq!(config.max_players, GameConfig::MIN_SUPPORTED_PLAYERS);
        assert_eq!(config.min_votes_to_exile, 0.0);
        assert_eq!(config.timing.vote_secs, 1);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = GameConfig::from_toml_str("max_players = \"many\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
