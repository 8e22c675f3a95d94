use lupine_protocol::PlayerId;
use tracing::debug;

use super::{
    Capability, RoleAction, RoleContext, RoleKind, RoleOutcome, RoleView, living_others,
    living_target, unsupported,
};
use crate::{DeathReason, GameError, Notice, PhaseKind, Player};

/// Takes one player down with them when killed by wolves or exiled.
#[derive(Debug, Clone)]
pub struct Hunter {
    shot_available: bool,
}

impl Default for Hunter {
    fn default() -> Self {
        Self {
            shot_available: true,
        }
    }
}

impl Hunter {
    pub fn shot_available(&self) -> bool {
        self.shot_available
    }

    /// Gives up the shot without firing.
    pub fn forfeit(&mut self) {
        self.shot_available = false;
    }

    /// Whether a hunter who died this way may still fire.
    pub fn death_allows_shot(reason: Option<DeathReason>) -> bool {
        matches!(reason, Some(DeathReason::WolfKill | DeathReason::Exile))
    }
}

impl Capability for Hunter {
    fn kind(&self) -> RoleKind {
        RoleKind::Hunter
    }

    /// Independent of phase: only dead hunters with an unused shot and a
    /// qualifying death may fire.
    fn can_act(&self, owner: &Player, _phase: PhaseKind) -> bool {
        !owner.alive && self.shot_available && Self::death_allows_shot(owner.death)
    }

    fn is_valid_target(
        &self,
        view: &RoleView<'_>,
        target: Option<PlayerId>,
        action: RoleAction,
    ) -> Result<(), GameError> {
        match action {
            RoleAction::Shoot => {
                let player = living_target(view, target)?;
                if player.id == view.owner {
                    return Err(GameError::IllegalTarget("you cannot shoot yourself".into()));
                }
                Ok(())
            }
            other => Err(unsupported(RoleKind::Hunter, other)),
        }
    }

    fn act(
        &mut self,
        ctx: &mut RoleContext<'_>,
        target: Option<PlayerId>,
        action: RoleAction,
    ) -> Result<RoleOutcome, GameError> {
        if !self.shot_available {
            return Err(GameError::IllegalPhase("the shot is already spent".into()));
        }
        self.is_valid_target(&ctx.view(), target, action)?;
        let Some(id) = target else {
            return Err(GameError::InvalidArgument("a target is required".into()));
        };
        self.shot_available = false;
        debug!(hunter = %ctx.owner, target = %id, "hunter fired");
        Ok(RoleOutcome::Shot(id))
    }

    fn prompt(&self, view: &RoleView<'_>, secs: u64) -> Notice {
        Notice::HunterPrompt {
            targets: living_others(view),
            secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::testing::roster;

    fn dead_hunter(reason: DeathReason) -> Player {
        let roster = roster(&[RoleKind::Hunter]);
        let mut owner = roster.get(PlayerId(1)).unwrap().clone();
        owner.alive = false;
        owner.death = Some(reason);
        owner
    }

    #[test]
    fn test_fires_only_after_wolf_kill_or_exile() {
        let hunter = Hunter::default();
        assert!(hunter.can_act(&dead_hunter(DeathReason::WolfKill), PhaseKind::Day));
        assert!(hunter.can_act(&dead_hunter(DeathReason::Exile), PhaseKind::LastWords));
        assert!(!hunter.can_act(&dead_hunter(DeathReason::Poison), PhaseKind::Day));
        assert!(!hunter.can_act(&dead_hunter(DeathReason::HunterShot), PhaseKind::Day));
    }

    #[test]
    fn test_living_hunter_cannot_fire() {
        let roster = roster(&[RoleKind::Hunter]);
        let owner = roster.get(PlayerId(1)).unwrap();
        assert!(!Hunter::default().can_act(owner, PhaseKind::Night));
    }

    #[test]
    fn test_shot_is_single_use() {
        let mut roster = roster(&[RoleKind::Hunter, RoleKind::Wolf, RoleKind::Villager]);
        roster.get_mut(PlayerId(1)).unwrap().alive = false;
        let rules = crate::RuleConfig::default();
        let mut hunter = Hunter::default();
        let mut ctx = RoleContext {
            owner: PlayerId(1),
            roster: &mut roster,
            turn: 1,
            night_victim: None,
            rules: &rules,
        };
        assert_eq!(
            hunter.act(&mut ctx, Some(PlayerId(2)), RoleAction::Shoot),
            Ok(RoleOutcome::Shot(PlayerId(2)))
        );
        assert!(!hunter.shot_available());
        assert!(hunter.act(&mut ctx, Some(PlayerId(3)), RoleAction::Shoot).is_err());
        assert!(!hunter.can_act(&dead_hunter(DeathReason::Exile), PhaseKind::Day));
    }

    #[test]
    fn test_forfeit_consumes_shot() {
        let mut hunter = Hunter::default();
        hunter.forfeit();
        assert!(!hunter.can_act(&dead_hunter(DeathReason::WolfKill), PhaseKind::Day));
    }
}
