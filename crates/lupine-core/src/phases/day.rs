//! Day: overnight sub-flows, then one timed speech per living player.

use std::collections::VecDeque;

use lupine_protocol::PlayerId;
use tracing::info;

use super::{
    DawnReport, HunterShotPhase, LastWordsPhase, Phase, PhaseKind, PhaseState, PhaseTimer,
    Transition, VotePhase, wolf_self_destruct,
};
use crate::config::secs;
use crate::world::World;
use crate::{Action, AliveFilter, GameError, Notice};

/// One day of discussion.
///
/// On first entry the day hands over to any sub-flows the night left behind:
/// last words for first-night deaths, or the shot of a hunter killed by the
/// wolves on a later night. Those flows come back to a fresh `DayPhase` that
/// skips straight to speeches.
#[derive(Debug)]
pub struct DayPhase {
    report: DawnReport,
    flows_done: bool,
    order: VecDeque<PlayerId>,
    speaker: Option<PlayerId>,
    timer: PhaseTimer,
}

impl DayPhase {
    pub fn new(report: DawnReport) -> Self {
        Self {
            report,
            flows_done: false,
            order: VecDeque::new(),
            speaker: None,
            timer: PhaseTimer::default(),
        }
    }

    fn resumed(report: DawnReport) -> Self {
        Self {
            flows_done: true,
            ..Self::new(report)
        }
    }

    pub fn turn(&self) -> u32 {
        self.report.turn
    }

    pub fn speaker(&self) -> Option<PlayerId> {
        self.speaker
    }

    /// Builds the chain of sub-flows ending back in this day.
    fn sub_flows(&self, world: &World) -> Option<Transition> {
        let mut next: Phase = DayPhase::resumed(self.report.clone()).into();
        let mut any = false;
        for &dead in self.report.deaths.iter().rev() {
            if self.report.turn == 0 {
                next = LastWordsPhase::new(dead, next).into();
                any = true;
            } else if world.hunter_can_shoot(dead) {
                next = HunterShotPhase::new(dead, next).into();
                any = true;
            }
        }
        any.then(|| Transition::Goto(Box::new(next)))
    }

    /// Living players, sheriff first, then onward in seat order.
    fn speaking_order(world: &World) -> Vec<PlayerId> {
        let all = AliveFilter::new();
        let mut order: Vec<PlayerId> = world.roster.alive(&all).map(|p| p.id).collect();
        if let Some(pos) = order
            .iter()
            .position(|id| world.roster.get(*id).is_some_and(|p| p.sheriff))
        {
            order.rotate_left(pos);
        }
        order
    }

    fn next_speaker(&mut self, world: &mut World) -> Transition {
        self.timer.cancel(world);
        while let Some(id) = self.order.pop_front() {
            if !world.roster.is_alive(id) {
                continue;
            }
            self.speaker = Some(id);
            let limit = world.config.timing.speech_secs;
            world.broadcast(Notice::SpeakerUp {
                speaker: world.seat(id),
                secs: limit,
            });
            self.timer.arm(world, secs(limit));
            return Transition::Stay;
        }
        self.speaker = None;
        info!(turn = self.report.turn, "speeches finished");
        Transition::to(VotePhase::new(self.report.turn))
    }
}

impl PhaseState for DayPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Day
    }

    fn on_enter(&mut self, world: &mut World) -> Transition {
        if !self.flows_done {
            self.flows_done = true;
            if let Some(flows) = self.sub_flows(world) {
                return flows;
            }
        }
        let order = Self::speaking_order(world);
        world.broadcast(Notice::DayBegins {
            turn: self.report.turn,
            order: order.iter().map(|id| world.seat(*id)).collect(),
        });
        info!(turn = self.report.turn, speakers = order.len(), "day begins");
        self.order = order.into();
        self.next_speaker(world)
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
            Action::EndSpeech if self.speaker == Some(actor) => Ok(self.next_speaker(world)),
            Action::EndSpeech => Err(GameError::IllegalPhase("it is not your turn to speak".into())),
            Action::WolfSelfDestruct => wolf_self_destruct(world, actor),
            other => Err(GameError::IllegalPhase(format!(
                "{} is not allowed during the day",
                other.name()
            ))),
        }
    }

    fn on_timeout(&mut self, world: &mut World, seq: u32) -> Option<Transition> {
        if !self.timer.fire(seq) {
            return None;
        }
        if let Some(id) = self.speaker {
            info!(turn = self.report.turn, speaker = %id, "speech timed out, moving on");
            world.broadcast(Notice::SpeechTimedOut {
                speaker: world.seat(id),
            });
        }
        Some(self.next_speaker(world))
    }
}
