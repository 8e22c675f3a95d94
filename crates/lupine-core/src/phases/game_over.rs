//! Terminal phase: reveal every role and refuse further actions.

use lupine_protocol::PlayerId;
use tracing::info;

use super::{PhaseKind, PhaseState, Transition};
use crate::notice::Reveal;
use crate::world::World;
use crate::{Action, GameError, Notice, Outcome};

/// The last phase of every game. It never transitions and arms no timer.
#[derive(Debug)]
pub struct GameOverPhase {
    outcome: Outcome,
}

impl GameOverPhase {
    pub fn new(outcome: Outcome) -> Self {
        Self { outcome }
    }

    /// Who won, and why.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }
}

impl PhaseState for GameOverPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::GameOver
    }

    fn on_enter(&mut self, world: &mut World) -> Transition {
        let reveal = world
            .roster
            .iter()
            .map(|p| Reveal {
                seat: p.seat(),
                role: p.role,
                alive: p.alive,
                sheriff: p.sheriff,
            })
            .collect();
        world.broadcast(Notice::GameOver {
            outcome: self.outcome,
            reveal,
        });
        info!(winner = ?self.outcome.winner, reason = ?self.outcome.reason, turn = world.turn, "game over");
        Transition::Stay
    }

    fn on_exit(&mut self, _world: &mut World) {}

    fn handle_action(
        &mut self,
        _world: &mut World,
        _actor: PlayerId,
        _action: &Action,
    ) -> Result<Transition, GameError> {
        Err(GameError::GameFinished)
    }

    fn on_timeout(&mut self, _world: &mut World, _seq: u32) -> Option<Transition> {
        None
    }
}
