//! A dead sheriff hands the badge on or tears it up.
//!
//! The phase is inserted by the orchestrator whenever the sitting sheriff
//! dies, before whatever phase was about to start. Only the dead sheriff
//! may act in it.

use lupine_protocol::PlayerId;
use tracing::info;

use super::{Phase, PhaseKind, PhaseState, PhaseTimer, Transition, resume};
use crate::config::secs;
use crate::world::World;
use crate::{Action, AliveFilter, GameError, Notice};

/// Interrupts whatever phase was running when the sheriff died and resumes
/// it afterwards.
#[derive(Debug)]
pub struct TransferPhase {
    /// The outgoing (dead) sheriff.
    sheriff: PlayerId,
    timer: PhaseTimer,
    /// The interrupted phase, resumed once the badge is settled.
    next: Option<Box<Phase>>,
}

impl TransferPhase {
    /// Starts a transfer for `sheriff` that resumes `next` afterwards.
    pub fn new(sheriff: PlayerId, next: impl Into<Phase>) -> Self {
        Self {
            sheriff,
            timer: PhaseTimer::default(),
            next: Some(Box::new(next.into())),
        }
    }

    pub fn sheriff(&self) -> PlayerId {
        self.sheriff
    }

    /// Tears the badge up: nobody is sheriff from here on.
    fn drop_title(&mut self, world: &mut World) -> Transition {
        self.timer.cancel(world);
        if let Some(player) = world.roster.get_mut(self.sheriff) {
            player.sheriff = false;
        }
        world.broadcast(Notice::SheriffTitleDropped {
            from: world.seat(self.sheriff),
        });
        info!(sheriff = %self.sheriff, "sheriff title dropped");
        resume(&mut self.next)
    }
}

impl PhaseState for TransferPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::SheriffTransfer
    }

    fn on_enter(&mut self, world: &mut World) -> Transition {
        let limit = world.config.timing.sheriff_transfer_secs;
        let targets = world.living_seats(&AliveFilter::new().excluding(self.sheriff));
        if targets.is_empty() {
            return self.drop_title(world);
        }
        world.broadcast(Notice::SheriffTransferPending {
            sheriff: world.seat(self.sheriff),
            secs: limit,
        });
        world.direct(
            self.sheriff,
            Notice::SheriffTransferPrompt {
                targets,
                secs: limit,
            },
        );
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
        if actor != self.sheriff {
            return Err(GameError::IllegalPhase(
                "only the outgoing sheriff may act now".into(),
            ));
        }
        match action {
            Action::TransferSheriff(number) => {
                let target = world.living_by_number(*number)?;
                if target == self.sheriff {
                    return Err(GameError::IllegalTarget("the badge must go to someone else".into()));
                }
                self.timer.cancel(world);
                if let Some(player) = world.roster.get_mut(self.sheriff) {
                    player.sheriff = false;
                }
                if let Some(player) = world.roster.get_mut(target) {
                    player.sheriff = true;
                }
                world.broadcast(Notice::SheriffTransferred {
                    from: world.seat(self.sheriff),
                    to: world.seat(target),
                });
                info!(from = %self.sheriff, to = %target, "sheriff title transferred");
                Ok(resume(&mut self.next))
            }
            Action::DeclineTransfer => Ok(self.drop_title(world)),
            other => Err(GameError::IllegalPhase(format!(
                "{} is not allowed during the sheriff transfer",
                other.name()
            ))),
        }
    }

    fn on_timeout(&mut self, world: &mut World, seq: u32) -> Option<Transition> {
        if !self.timer.fire(seq) {
            return None;
        }
        info!(sheriff = %self.sheriff, "sheriff transfer timed out");
        Some(self.drop_title(world))
    }

    fn admits_dead(&self, actor: PlayerId) -> bool {
        actor == self.sheriff
    }
}
