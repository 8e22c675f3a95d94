use lupine_protocol::PlayerId;
use tracing::debug;

use super::{
    Capability, RoleAction, RoleContext, RoleKind, RoleOutcome, RoleView, living_target,
    unsupported,
};
use crate::{AliveFilter, GameError, Notice, PhaseKind, Player};

/// Protects one player per night from the wolves.
///
/// The same player cannot be protected on two consecutive nights.
#[derive(Debug, Clone, Default)]
pub struct Guard {
    /// Last protected player and the night it happened.
    last_protected: Option<(PlayerId, u32)>,
}

impl Guard {
    /// The player this guard may not protect on night `turn`.
    pub fn blocked_on(&self, turn: u32) -> Option<PlayerId> {
        match self.last_protected {
            Some((id, night)) if night + 1 == turn => Some(id),
            _ => None,
        }
    }

    pub fn last_protected(&self) -> Option<PlayerId> {
        self.last_protected.map(|(id, _)| id)
    }
}

impl Capability for Guard {
    fn kind(&self) -> RoleKind {
        RoleKind::Guard
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
            RoleAction::Skip => Ok(()),
            RoleAction::Protect => {
                let player = living_target(view, target)?;
                if self.blocked_on(view.turn) == Some(player.id) {
                    return Err(GameError::IllegalTarget(format!(
                        "{} was protected last night",
                        player.seat()
                    )));
                }
                Ok(())
            }
            other => Err(unsupported(RoleKind::Guard, other)),
        }
    }

    fn act(
        &mut self,
        ctx: &mut RoleContext<'_>,
        target: Option<PlayerId>,
        action: RoleAction,
    ) -> Result<RoleOutcome, GameError> {
        self.is_valid_target(&ctx.view(), target, action)?;
        let Some(id) = target.filter(|_| action == RoleAction::Protect) else {
            return Ok(RoleOutcome::Skipped);
        };
        if let Some(player) = ctx.roster.get_mut(id) {
            player.protected = true;
        }
        self.last_protected = Some((id, ctx.turn));
        debug!(guard = %ctx.owner, target = %id, turn = ctx.turn, "target protected");
        Ok(RoleOutcome::Protected(id))
    }

    fn prompt(&self, view: &RoleView<'_>, secs: u64) -> Notice {
        let blocked = self.blocked_on(view.turn);
        let filter = AliveFilter::new();
        Notice::GuardPrompt {
            targets: view
                .roster
                .alive(&filter)
                .filter(|p| Some(p.id) != blocked)
                .map(Player::seat)
                .collect(),
            blocked: blocked
                .and_then(|id| view.roster.get(id))
                .map(Player::seat),
            secs,
        }
    }
}
