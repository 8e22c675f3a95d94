//! A dead player's final speech.
//!
//! Granted to exiled players and to the victims of the first night. The
//! speaker ends it with `#end-speech` or `#skip-last-words`; otherwise the
//! `last_words_secs` timer ends it for them.

use lupine_protocol::PlayerId;
use tracing::debug;

use super::{HunterShotPhase, Phase, PhaseKind, PhaseState, PhaseTimer, Transition, resume};
use crate::config::secs;
use crate::world::World;
use crate::{Action, GameError, Notice};

/// One dead player's last words, then `next`.
#[derive(Debug)]
pub struct LastWordsPhase {
    speaker: PlayerId,
    timer: PhaseTimer,
    next: Option<Box<Phase>>,
}

impl LastWordsPhase {
    pub fn new(speaker: PlayerId, next: impl Into<Phase>) -> Self {
        Self {
            speaker,
            timer: PhaseTimer::default(),
            next: Some(Box::new(next.into())),
        }
    }

    /// The dead player who has the floor.
    pub fn speaker(&self) -> PlayerId {
        self.speaker
    }

    /// Hands over to the hunter's shot if the speaker may still fire.
    fn finish(&mut self, world: &mut World) -> Transition {
        self.timer.cancel(world);
        if world.hunter_can_shoot(self.speaker) {
            if let Some(next) = self.next.take() {
                return Transition::to(HunterShotPhase::new(self.speaker, *next));
            }
        }
        resume(&mut self.next)
    }
}

impl PhaseState for LastWordsPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::LastWords
    }

    fn on_enter(&mut self, world: &mut World) -> Transition {
        let limit = world.config.timing.last_words_secs;
        world.broadcast(Notice::LastWords {
            speaker: world.seat(self.speaker),
            secs: limit,
        });
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
        match action {
            Action::SkipLastWords | Action::EndSpeech if actor == self.speaker => Ok(self.finish(world)),
            Action::SkipLastWords | Action::EndSpeech => {
                Err(GameError::IllegalPhase("these are not your last words".into()))
            }
            other => Err(GameError::IllegalPhase(format!(
                "{} is not allowed during last words",
                other.name()
            ))),
        }
    }

    fn on_timeout(&mut self, world: &mut World, seq: u32) -> Option<Transition> {
        if !self.timer.fire(seq) {
            return None;
        }
        debug!(speaker = %self.speaker, "last words timed out");
        Some(self.finish(world))
    }

    fn admits_dead(&self, actor: PlayerId) -> bool {
        actor == self.speaker
    }
}
