//! Sheriff election: registration, candidate speeches, then a ballot.
//!
//! The election runs once, between the first night and the first day. Any
//! living player may register while registration is open; candidates then
//! speak in a shuffled order, and finally every living player may back one
//! candidate. A unique leader takes the badge. A tie, an empty ballot, or
//! an empty field leaves the table without a sheriff.

use std::collections::{BTreeMap, VecDeque};

use lupine_protocol::PlayerId;
use rand::seq::SliceRandom;
use tracing::info;

use super::{ExileVerdict, Phase, PhaseKind, PhaseState, PhaseTimer, Transition, resume, tally_votes};
use crate::config::secs;
use crate::notice::VoteLine;
use crate::world::World;
use crate::{Action, GameError, Notice};

/// Where the election stands. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Players nominate themselves until `sheriff_register_secs` runs out.
    Register,
    /// Candidates speak one at a time, each for `sheriff_speech_secs`.
    Speech,
    /// Every living player may back one candidate or abstain.
    Vote,
}

/// One sheriff election, resuming `next` when it is decided.
#[derive(Debug)]
pub struct ElectionPhase {
    stage: Stage,
    /// Registered candidates, in registration order.
    candidates: Vec<PlayerId>,
    /// Candidates still waiting to speak, in speaking order.
    speeches: VecDeque<PlayerId>,
    speaker: Option<PlayerId>,
    /// Voter to backed candidate; `None` is an abstention.
    ballots: BTreeMap<PlayerId, Option<PlayerId>>,
    timer: PhaseTimer,
    next: Option<Box<Phase>>,
}

impl ElectionPhase {
    /// Opens registration. `next` is entered once the election is over,
    /// whatever its result.
    pub fn new(next: impl Into<Phase>) -> Self {
        Self {
            stage: Stage::Register,
            candidates: Vec::new(),
            speeches: VecDeque::new(),
            speaker: None,
            ballots: BTreeMap::new(),
            timer: PhaseTimer::default(),
            next: Some(Box::new(next.into())),
        }
    }

    /// Candidates in registration order.
    pub fn candidates(&self) -> &[PlayerId] {
        &self.candidates
    }

    /// The candidate currently speaking, if the speech stage is running.
    pub fn speaker(&self) -> Option<PlayerId> {
        self.speaker
    }

    /// Ends registration and shuffles the speaking order.
    fn close_registration(&mut self, world: &mut World) -> Transition {
        self.timer.cancel(world);
        if self.candidates.is_empty() {
            world.broadcast(Notice::NoSheriffCandidates);
            info!("no sheriff candidates, skipping the election");
            return resume(&mut self.next);
        }
        let mut order = self.candidates.clone();
        order.shuffle(&mut world.rng);
        self.speeches = order.into();
        self.stage = Stage::Speech;
        self.next_speech(world)
    }

    /// Gives the floor to the next living candidate, or opens the ballot
    /// when nobody is left to speak.
    fn next_speech(&mut self, world: &mut World) -> Transition {
        self.timer.cancel(world);
        while let Some(id) = self.speeches.pop_front() {
            if !world.roster.is_alive(id) {
                continue;
            }
            self.speaker = Some(id);
            let limit = world.config.timing.sheriff_speech_secs;
            world.broadcast(Notice::SheriffSpeech {
                speaker: world.seat(id),
                secs: limit,
            });
            self.timer.arm(world, secs(limit));
            return Transition::Stay;
        }
        self.speaker = None;
        self.open_vote(world);
        Transition::Stay
    }

    fn open_vote(&mut self, world: &mut World) {
        self.stage = Stage::Vote;
        let limit = world.config.timing.sheriff_vote_secs;
        let candidates = self.candidates.iter().map(|id| world.seat(*id)).collect();
        world.broadcast(Notice::SheriffVoteOpen {
            candidates,
            secs: limit,
        });
        self.timer.arm(world, secs(limit));
    }

    fn cast(&mut self, world: &mut World, actor: PlayerId, number: Option<u32>) -> Result<Transition, GameError> {
        if self.stage != Stage::Vote {
            return Err(GameError::IllegalPhase("the sheriff ballot is not open".into()));
        }
        if self.ballots.contains_key(&actor) {
            return Err(GameError::AlreadyActed);
        }
        let target = match number {
            Some(n) => {
                let id = world.living_by_number(n)?;
                if !self.candidates.contains(&id) {
                    return Err(GameError::IllegalTarget(format!(
                        "{} is not running for sheriff",
                        world.seat(id)
                    )));
                }
                Some(id)
            }
            None => None,
        };
        self.ballots.insert(actor, target);
        match target {
            Some(id) => {
                let seat = world.seat(id);
                world.ack(actor, format!("support for {seat} recorded"));
            }
            None => world.ack(actor, "abstention recorded"),
        }
        if self.ballots.len() >= world.roster.living_count() {
            return Ok(self.resolve(world));
        }
        Ok(Transition::Stay)
    }

    fn resolve(&mut self, world: &mut World) -> Transition {
        self.timer.cancel(world);
        let tally = tally_votes(&self.ballots, None, 0.0);
        let lines: Vec<VoteLine> = tally
            .totals
            .iter()
            .map(|(target, weight)| VoteLine {
                target: world.seat(*target),
                weight: *weight,
                voters: tally
                    .voters
                    .get(target)
                    .map(|ids| ids.iter().map(|id| world.seat(*id)).collect())
                    .unwrap_or_default(),
            })
            .collect();

        let elected = match tally.verdict {
            ExileVerdict::Exile(id) if world.roster.is_alive(id) => Some(id),
            _ => None,
        };
        if let Some(id) = elected {
            if let Some(player) = world.roster.get_mut(id) {
                player.sheriff = true;
            }
            info!(sheriff = %id, "sheriff elected");
        } else {
            info!(verdict = ?tally.verdict, "no sheriff elected");
        }
        world.broadcast(Notice::SheriffElected {
            sheriff: elected.map(|id| world.seat(id)),
            tally: lines,
        });
        resume(&mut self.next)
    }
}

impl PhaseState for ElectionPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::SheriffElection
    }

    fn on_enter(&mut self, world: &mut World) -> Transition {
        let limit = world.config.timing.sheriff_register_secs;
        world.broadcast(Notice::SheriffRegistration { secs: limit });
        self.timer.arm(world, secs(limit));
        info!("sheriff registration open");
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
            Action::RegisterSheriff => {
                if self.stage != Stage::Register {
                    return Err(GameError::IllegalPhase("sheriff registration is closed".into()));
                }
                if self.candidates.contains(&actor) {
                    return Err(GameError::AlreadyActed);
                }
                self.candidates.push(actor);
                world.broadcast(Notice::SheriffCandidate {
                    candidate: world.seat(actor),
                });
                Ok(Transition::Stay)
            }
            Action::EndSpeech => {
                if self.stage != Stage::Speech || self.speaker != Some(actor) {
                    return Err(GameError::IllegalPhase("it is not your turn to speak".into()));
                }
                Ok(self.next_speech(world))
            }
            Action::Support(number) => self.cast(world, actor, Some(*number)),
            Action::Vote(number) => self.cast(world, actor, *number),
            other => Err(GameError::IllegalPhase(format!(
                "{} is not allowed during the sheriff election",
                other.name()
            ))),
        }
    }

    fn on_timeout(&mut self, world: &mut World, seq: u32) -> Option<Transition> {
        if !self.timer.fire(seq) {
            return None;
        }
        Some(match self.stage {
            Stage::Register => self.close_registration(world),
            Stage::Speech => {
                if let Some(id) = self.speaker {
                    world.broadcast(Notice::SpeechTimedOut {
                        speaker: world.seat(id),
                    });
                }
                self.next_speech(world)
            }
            Stage::Vote => {
                info!(ballots = self.ballots.len(), "sheriff ballot timed out");
                self.resolve(world)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phases::NightPhase;
    use crate::world::testing::world as new_world;
    use crate::{Effect, GameConfig, RoleKind};

    const TABLE: [RoleKind; 6] = [
        RoleKind::Wolf,
        RoleKind::Wolf,
        RoleKind::Guard,
        RoleKind::Seer,
        RoleKind::Witch,
        RoleKind::Villager,
    ];

    fn last_seq(world: &mut World) -> u32 {
        world
            .take_effects()
            .into_iter()
            .filter_map(|e| match e {
                Effect::ArmTimer { id, .. } => Some(id.seq),
                _ => None,
            })
            .last()
            .unwrap()
    }

    fn act(election: &mut ElectionPhase, world: &mut World, actor: u64, action: Action) -> Transition {
        election.handle_action(world, PlayerId(actor), &action).unwrap()
    }

    fn elected(world: &World) -> Option<PlayerId> {
        world.roster.sheriff().map(|p| p.id)
    }

    #[test]
    fn test_no_candidates_resumes() {
        let mut world = new_world(&TABLE, GameConfig::default());
        let mut election = ElectionPhase::new(NightPhase::new(1));
        election.on_enter(&mut world);
        let seq = last_seq(&mut world);
        let next = election.on_timeout(&mut world, seq).unwrap();
        assert!(matches!(next, Transition::Goto(ref p) if p.kind() == PhaseKind::Night));
        assert_eq!(elected(&world), None);
    }

    #[test]
    fn test_full_election() {
        let mut world = new_world(&TABLE, GameConfig::default());
        let mut election = ElectionPhase::new(NightPhase::new(1));
        election.on_enter(&mut world);
        act(&mut election, &mut world, 3, Action::RegisterSheriff);
        act(&mut election, &mut world, 5, Action::RegisterSheriff);
        assert_eq!(
            election.handle_action(&mut world, PlayerId(3), &Action::RegisterSheriff).unwrap_err(),
            GameError::AlreadyActed
        );

        let seq = last_seq(&mut world);
        election.on_timeout(&mut world, seq).unwrap();
        let first = election.speaker().unwrap();
        assert!(first == PlayerId(3) || first == PlayerId(5));
        assert!(election.handle_action(&mut world, PlayerId(1), &Action::EndSpeech).is_err());
        act(&mut election, &mut world, first.0, Action::EndSpeech);
        let second = election.speaker().unwrap();
        assert_ne!(first, second);
        act(&mut election, &mut world, second.0, Action::EndSpeech);
        assert_eq!(election.speaker(), None);

        // ballots must name a candidate
        assert!(matches!(
            election.handle_action(&mut world, PlayerId(1), &Action::Support(4)),
            Err(GameError::IllegalTarget(_))
        ));
        for voter in [1, 2, 3, 4] {
            act(&mut election, &mut world, voter, Action::Support(5));
        }
        act(&mut election, &mut world, 5, Action::Vote(Some(3)));
        let next = act(&mut election, &mut world, 6, Action::Vote(None));
        assert!(matches!(next, Transition::Goto(_)));
        assert_eq!(elected(&world), Some(PlayerId(5)));
    }

    #[test]
    fn test_tied_ballot_elects_nobody() {
        let mut world = new_world(&TABLE, GameConfig::default());
        let mut election = ElectionPhase::new(NightPhase::new(1));
        election.on_enter(&mut world);
        act(&mut election, &mut world, 1, Action::RegisterSheriff);
        act(&mut election, &mut world, 2, Action::RegisterSheriff);
        let seq = last_seq(&mut world);
        election.on_timeout(&mut world, seq).unwrap();
        // both speeches time out
        for _ in 0..2 {
            let seq = last_seq(&mut world);
            election.on_timeout(&mut world, seq).unwrap();
        }
        act(&mut election, &mut world, 3, Action::Support(1));
        act(&mut election, &mut world, 4, Action::Support(2));
        let seq = last_seq(&mut world);
        let next = election.on_timeout(&mut world, seq).unwrap();
        assert!(matches!(next, Transition::Goto(_)));
        assert_eq!(elected(&world), None);
    }

    #[test]
    fn test_registration_closed_after_window() {
        let mut world = new_world(&TABLE, GameConfig::default());
        let mut election = ElectionPhase::new(NightPhase::new(1));
        election.on_enter(&mut world);
        act(&mut election, &mut world, 1, Action::RegisterSheriff);
        let seq = last_seq(&mut world);
        election.on_timeout(&mut world, seq).unwrap();
        assert!(matches!(
            election.handle_action(&mut world, PlayerId(2), &Action::RegisterSheriff),
            Err(GameError::IllegalPhase(_))
        ));
        assert!(matches!(
            election.handle_action(&mut world, PlayerId(2), &Action::Support(1)),
            Err(GameError::IllegalPhase(_))
        ));
    }
}
