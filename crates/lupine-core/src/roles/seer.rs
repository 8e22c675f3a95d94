use std::collections::{BTreeMap, HashMap};
use std::time::{SystemTime, UNIX_EPOCH};

use lupine_protocol::PlayerId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    Capability, RoleAction, RoleContext, RoleKind, RoleOutcome, RoleView, living_others,
    living_target, unsupported,
};
use crate::{GameError, Notice, PhaseKind, Player};

/// One check the seer made. Immutable once written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeerRecord {
    pub target: PlayerId,
    pub is_wolf: bool,
    pub turn: u32,
    /// Wall-clock time of the check, milliseconds since the Unix epoch.
    pub at_ms: u64,
}

/// Learns each night whether one player is a wolf.
#[derive(Debug, Clone, Default)]
pub struct Seer {
    history: HashMap<PlayerId, BTreeMap<u32, SeerRecord>>,
}

impl Seer {
    /// Latest check on `target`, if any.
    pub fn history(&self, target: PlayerId) -> Option<&SeerRecord> {
        self.history
            .get(&target)
            .and_then(|by_turn| by_turn.last_key_value())
            .map(|(_, record)| record)
    }

    /// Every check, oldest night first.
    pub fn records(&self) -> Vec<SeerRecord> {
        let mut all: Vec<SeerRecord> = self
            .history
            .values()
            .flat_map(|by_turn| by_turn.values().copied())
            .collect();
        all.sort_by_key(|r| (r.turn, r.at_ms));
        all
    }

    /// Whether `record` matches what this seer stored for its target and
    /// night.
    pub fn verify(&self, record: &SeerRecord) -> bool {
        self.history
            .get(&record.target)
            .and_then(|by_turn| by_turn.get(&record.turn))
            .is_some_and(|stored| stored == record)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

impl Capability for Seer {
    fn kind(&self) -> RoleKind {
        RoleKind::Seer
    }

    fn can_act(&self, owner: &Player, phase: PhaseKind) -> bool {
        owner.alive && phase == PhaseKind::Night
    }

    fn is_valid_target(
        &self,
        view: &RoleView<'_>,
        target: Option<PlayerId>,
        action: RoleAction,
    ) -> Result<(), GameError> {
        match action {
            RoleAction::Check => {
                let player = living_target(view, target)?;
                if player.id == view.owner {
                    return Err(GameError::IllegalTarget("you cannot check yourself".into()));
                }
                Ok(())
            }
            other => Err(unsupported(RoleKind::Seer, other)),
        }
    }

    fn act(
        &mut self,
        ctx: &mut RoleContext<'_>,
        target: Option<PlayerId>,
        action: RoleAction,
    ) -> Result<RoleOutcome, GameError> {
        let view = ctx.view();
        self.is_valid_target(&view, target, action)?;
        let Some(player) = target.and_then(|id| view.roster.get(id)) else {
            return Err(GameError::InvalidArgument("a target is required".into()));
        };

        let record = *self
            .history
            .entry(player.id)
            .or_default()
            .entry(ctx.turn)
            .or_insert_with(|| SeerRecord {
                target: player.id,
                is_wolf: player.role == RoleKind::Wolf,
                turn: ctx.turn,
                at_ms: now_ms(),
            });
        debug!(seer = %ctx.owner, target = %record.target, turn = record.turn, "seer check recorded");
        Ok(RoleOutcome::Checked {
            target: record.target,
            is_wolf: record.is_wolf,
        })
    }

    fn prompt(&self, view: &RoleView<'_>, secs: u64) -> Notice {
        Notice::SeerPrompt {
            targets: living_others(view),
            secs,
        }
    }
}
