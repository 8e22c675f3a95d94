//! A dead hunter's one shot.
//!
//! Entered after a hunter dies to the wolves or to the vote. The hunter has
//! `hunter_shot_secs` to name a living player; silence forfeits the shot.

use lupine_protocol::PlayerId;
use tracing::info;

use super::{Phase, PhaseKind, PhaseState, PhaseTimer, Transition, resume};
use crate::config::secs;
use crate::world::World;
use crate::{Action, DeathReason, GameError, Notice, RoleAction};

/// Waits on a dead hunter's shot, then resumes `next`.
#[derive(Debug)]
pub struct HunterShotPhase {
    hunter: PlayerId,
    timer: PhaseTimer,
    next: Option<Box<Phase>>,
}

impl HunterShotPhase {
    /// If `hunter` turns out unable to fire (poisoned, or the shot already
    /// spent) the phase hands straight over to `next` on entry.
    pub fn new(hunter: PlayerId, next: impl Into<Phase>) -> Self {
        Self {
            hunter,
            timer: PhaseTimer::default(),
            next: Some(Box::new(next.into())),
        }
    }

    pub fn hunter(&self) -> PlayerId {
        self.hunter
    }
}

impl PhaseState for HunterShotPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::HunterShot
    }

    fn on_enter(&mut self, world: &mut World) -> Transition {
        let limit = world.config.timing.hunter_shot_secs;
        let prompt = match world.role_prompt(self.hunter, None, limit) {
            Some(prompt) if world.hunter_can_shoot(self.hunter) => prompt,
            _ => return resume(&mut self.next),
        };
        world.direct(self.hunter, prompt);
        self.timer.arm(world, secs(limit));
        Transition::Stay
    }

    fn on_exit(&mut self, world: &mut World) {
        self.timer.cancel(world);
    }

    fn handle_action(
        &mut self,
        world: &mut World,
        actor: PlayerId,
        action: &Action,
    ) -> Result<Transition, GameError> {
        let Action::HunterShoot(number) = action else {
            return Err(GameError::IllegalPhase(format!(
                "{} is not allowed while the hunter aims",
                action.name()
            )));
        };
        if actor != self.hunter {
            return Err(GameError::IllegalPhase("only the dead hunter may shoot now".into()));
        }
        let target = world.living_by_number(*number)?;
        world.role_act(actor, PhaseKind::HunterShot, Some(target), RoleAction::Shoot, None)?;
        self.timer.cancel(world);

        world.broadcast(Notice::HunterFired {
            hunter: world.seat(actor),
            target: world.seat(target),
        });
        world.handle_player_death(target, DeathReason::HunterShot);
        info!(hunter = %actor, %target, "hunter fired");
        Ok(resume(&mut self.next))
    }

    fn on_timeout(&mut self, world: &mut World, seq: u32) -> Option<Transition> {
        if !self.timer.fire(seq) {
            return None;
        }
        world.forfeit_hunter_shot(self.hunter);
        info!(hunter = %self.hunter, "hunter did not fire, shot forfeited");
        Some(resume(&mut self.next))
    }

    fn admits_dead(&self, actor: PlayerId) -> bool {
        actor == self.hunter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phases::NightPhase;
    use crate::world::testing::world as new_world;
    use crate::{GameConfig, RoleKind};

    const TABLE: [RoleKind; 5] = [
        RoleKind::Wolf,
        RoleKind::Hunter,
        RoleKind::Villager,
        RoleKind::Villager,
        RoleKind::Wolf,
    ];

    #[test]
    fn test_shot_kills_target_once() {
        let mut world = new_world(&TABLE, GameConfig::default());
        world.handle_player_death(PlayerId(2), DeathReason::WolfKill);
        let mut shot = HunterShotPhase::new(PlayerId(2), NightPhase::new(2));
        assert!(matches!(shot.on_enter(&mut world), Transition::Stay));

        assert!(shot.handle_action(&mut world, PlayerId(3), &Action::HunterShoot(1)).is_err());
        let next = shot
            .handle_action(&mut world, PlayerId(2), &Action::HunterShoot(1))
            .unwrap();
        assert!(matches!(next, Transition::Goto(_)));
        assert_eq!(
            world.roster.get(PlayerId(1)).unwrap().death,
            Some(DeathReason::HunterShot)
        );
        assert!(!world.hunter_can_shoot(PlayerId(2)));
    }

    #[test]
    fn test_poisoned_hunter_is_skipped() {
        let mut world = new_world(&TABLE, GameConfig::default());
        world.handle_player_death(PlayerId(2), DeathReason::Poison);
        let mut shot = HunterShotPhase::new(PlayerId(2), NightPhase::new(2));
        assert!(matches!(shot.on_enter(&mut world), Transition::Goto(_)));
    }

    #[test]
    fn test_timeout_forfeits() {
        let mut world = new_world(&TABLE, GameConfig::default());
        world.handle_player_death(PlayerId(2), DeathReason::Exile);
        let mut shot = HunterShotPhase::new(PlayerId(2), NightPhase::new(2));
        shot.on_enter(&mut world);
        assert!(shot.on_timeout(&mut world, 1).is_some());
        assert!(!world.hunter_can_shoot(PlayerId(2)));
        assert!(world.roster.is_alive(PlayerId(1)));
    }
}
