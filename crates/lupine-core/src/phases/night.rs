//! Night: role kinds act one after another in a fixed order.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use lupine_protocol::PlayerId;
use tracing::{debug, info};

use super::{DayPhase, ElectionPhase, PhaseKind, PhaseState, PhaseTimer, Transition};
use crate::config::secs;
use crate::roles::{Witch, tally_wolf_votes};
use crate::world::World;
use crate::{Action, AliveFilter, DeathReason, GameError, Notice, RoleAction, RoleKind, RoleOutcome, WolfVerdict};

/// Who died during a night, handed to the following day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DawnReport {
    pub turn: u32,
    pub deaths: Vec<PlayerId>,
}

/// One night occupancy.
///
/// Role kinds take turns in [`RoleKind::NIGHT_ORDER`]. A turn ends when
/// every living holder of the kind has acted or its timer fires; stragglers
/// then default to skipping (wolves to abstaining). Deaths are applied only
/// once every turn is over.
#[derive(Debug)]
pub struct NightPhase {
    turn: u32,
    queue: VecDeque<RoleKind>,
    current: Option<RoleKind>,
    completed: BTreeSet<RoleKind>,
    acted: HashMap<PlayerId, RoleAction>,
    wolf_votes: BTreeMap<PlayerId, Option<PlayerId>>,
    wolf_target: Option<PlayerId>,
    saved: bool,
    poisoned: Option<PlayerId>,
    timer: PhaseTimer,
}

impl NightPhase {
    pub fn new(turn: u32) -> Self {
        Self {
            turn,
            queue: VecDeque::new(),
            current: None,
            completed: BTreeSet::new(),
            acted: HashMap::new(),
            wolf_votes: BTreeMap::new(),
            wolf_target: None,
            saved: false,
            poisoned: None,
            timer: PhaseTimer::default(),
        }
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// The role kind whose turn it is.
    pub fn current_turn(&self) -> Option<RoleKind> {
        self.current
    }

    /// Whether `kind` has finished its turn tonight (or had nobody to act).
    pub fn is_completed(&self, kind: RoleKind) -> bool {
        self.completed.contains(&kind)
    }

    /// Tonight's pending wolf target, once the pack has decided.
    pub fn wolf_target(&self) -> Option<PlayerId> {
        self.wolf_target
    }

    /// Living holders of the current kind who have not acted yet.
    fn owed(&self, world: &World) -> Vec<PlayerId> {
        let Some(kind) = self.current else {
            return Vec::new();
        };
        world
            .living_holders(kind)
            .into_iter()
            .filter(|id| !self.acted.contains_key(id))
            .collect()
    }

    /// Starts the next role kind that has someone able to act, or resolves
    /// the night when none is left.
    fn advance(&mut self, world: &mut World) -> Transition {
        while let Some(kind) = self.queue.pop_front() {
            let filter = AliveFilter::new().with_role(kind);
            // a witch with no potions left has nothing to do
            let holders: Vec<PlayerId> = world
                .alive_with_roles(&filter)
                .filter(|(_, role)| role.as_witch().is_none_or(Witch::has_potions))
                .map(|(player, _)| player.id)
                .collect();
            if holders.is_empty() {
                debug!(turn = self.turn, role = %kind, "no eligible holder, skipping turn");
                self.completed.insert(kind);
                continue;
            }

            self.current = Some(kind);
            let limit = world.config.timing.night_secs;
            for id in holders {
                if let Some(prompt) = world.role_prompt(id, self.wolf_target, limit) {
                    world.direct(id, prompt);
                }
            }
            self.timer.arm(world, secs(limit));
            debug!(turn = self.turn, role = %kind, "night turn started");
            return Transition::Stay;
        }
        self.current = None;
        self.finish(world)
    }

    fn complete_turn(&mut self, world: &mut World) -> Transition {
        self.timer.cancel(world);
        if let Some(kind) = self.current.take() {
            self.completed.insert(kind);
            if kind == RoleKind::Wolf {
                self.resolve_wolves(world);
            }
        }
        self.advance(world)
    }

    fn resolve_wolves(&mut self, world: &mut World) {
        let wolves = world.living_wolves();
        let verdict = tally_wolf_votes(&self.wolf_votes, wolves.len());
        let notice = match verdict {
            WolfVerdict::Kill(target) => {
                self.wolf_target = Some(target);
                info!(turn = self.turn, %target, "pack chose a victim");
                Notice::WolfKillChosen {
                    target: world.seat(target),
                }
            }
            WolfVerdict::NoKill(reason) => {
                info!(turn = self.turn, ?reason, "pack kills nobody");
                Notice::WolfNoKill { reason }
            }
        };
        for wolf in wolves {
            world.direct(wolf, notice.clone());
        }
    }

    /// Applies the night's deaths: poison first, then the wolf kill unless
    /// the victim was saved or guarded.
    fn finish(&mut self, world: &mut World) -> Transition {
        let mut deaths = Vec::new();
        if let Some(target) = self.poisoned {
            if world.handle_player_death(target, DeathReason::Poison) {
                deaths.push(target);
            }
        }
        if let Some(victim) = self.wolf_target {
            let guarded = world.roster.get(victim).is_some_and(|p| p.protected);
            if self.saved {
                info!(turn = self.turn, %victim, "attack cancelled by the antidote");
            } else if guarded {
                info!(turn = self.turn, %victim, "attack blocked by the guard");
            } else if world.handle_player_death(victim, DeathReason::WolfKill) {
                deaths.push(victim);
            }
        }
        for player in world.roster.iter_mut() {
            player.protected = false;
        }

        let seats = deaths.iter().map(|id| world.seat(*id)).collect();
        world.broadcast(Notice::Dawn {
            turn: self.turn,
            deaths: seats,
        });
        info!(turn = self.turn, deaths = deaths.len(), "night resolved");

        let day = DayPhase::new(DawnReport {
            turn: self.turn,
            deaths,
        });
        if self.turn == 0 && world.config.rules.sheriff_election {
            Transition::to(ElectionPhase::new(day))
        } else {
            Transition::to(day)
        }
    }

    fn acknowledge(&mut self, world: &mut World, actor: PlayerId, outcome: RoleOutcome) {
        match outcome {
            RoleOutcome::Protected(target) => {
                let seat = world.seat(target);
                world.ack(actor, format!("protecting {seat} tonight"));
            }
            RoleOutcome::Checked { target, is_wolf } => {
                let target = world.seat(target);
                world.direct(actor, Notice::SeerResult { target, is_wolf });
            }
            RoleOutcome::Saved(target) => {
                self.saved = true;
                let seat = world.seat(target);
                world.ack(actor, format!("antidote used on {seat}"));
            }
            RoleOutcome::Poisoned(target) => {
                self.poisoned = Some(target);
                let seat = world.seat(target);
                world.ack(actor, format!("poison used on {seat}"));
            }
            RoleOutcome::WolfVote(target) => {
                self.wolf_votes.insert(actor, target);
                let notice = Notice::WolfVoteCast {
                    voter: world.seat(actor),
                    target: target.map(|id| world.seat(id)),
                };
                for wolf in world.living_wolves() {
                    world.direct(wolf, notice.clone());
                }
            }
            RoleOutcome::Skipped => world.ack(actor, "you rest tonight"),
            RoleOutcome::Shot(_) => {}
        }
    }
}

impl PhaseState for NightPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Night
    }

    fn on_enter(&mut self, world: &mut World) -> Transition {
        world.turn = self.turn;
        world.broadcast(Notice::NightFalls { turn: self.turn });
        info!(turn = self.turn, "night falls");
        self.queue = RoleKind::NIGHT_ORDER.into_iter().collect();
        self.advance(world)
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
        let (kind, role_action, number) = match action {
            Action::Guard(n) => (RoleKind::Guard, RoleAction::Protect, Some(*n)),
            Action::SeerCheck(n) => (RoleKind::Seer, RoleAction::Check, Some(*n)),
            Action::WolfKill(n) => (RoleKind::Wolf, RoleAction::Bite, *n),
            Action::WitchSave => (RoleKind::Witch, RoleAction::Save, None),
            Action::WitchPoison(n) => (RoleKind::Witch, RoleAction::Poison, Some(*n)),
            Action::WitchSkip => (RoleKind::Witch, RoleAction::Skip, None),
            other => {
                return Err(GameError::IllegalPhase(format!(
                    "{} is not a night action",
                    other.name()
                )));
            }
        };

        if world.role_of(actor) != Some(kind) {
            return Err(GameError::WrongRole { required: kind });
        }
        if self.current != Some(kind) {
            return Err(GameError::IllegalPhase(format!("it is not the {kind}'s turn")));
        }
        if self.acted.contains_key(&actor) {
            return Err(GameError::AlreadyActed);
        }
        let target = match (role_action, number) {
            (RoleAction::Save, _) => self.wolf_target,
            (_, Some(n)) => Some(world.living_by_number(n)?),
            (_, None) => None,
        };

        let outcome = world.role_act(actor, PhaseKind::Night, target, role_action, self.wolf_target)?;
        self.acted.insert(actor, role_action);
        self.acknowledge(world, actor, outcome);

        if self.owed(world).is_empty() {
            Ok(self.complete_turn(world))
        } else {
            Ok(Transition::Stay)
        }
    }

    fn on_timeout(&mut self, world: &mut World, seq: u32) -> Option<Transition> {
        if !self.timer.fire(seq) {
            return None;
        }
        let kind = self.current?;
        let stragglers = self.owed(world);
        let default = if kind == RoleKind::Wolf {
            RoleAction::Bite
        } else {
            RoleAction::Skip
        };
        for id in &stragglers {
            if kind == RoleKind::Wolf {
                self.wolf_votes.insert(*id, None);
            }
            self.acted.insert(*id, default);
        }
        info!(
            turn = self.turn,
            role = %kind,
            players = ?stragglers,
            "night turn timed out, stragglers default to {}",
            if kind == RoleKind::Wolf { "abstain" } else { "skip" }
        );
        Some(self.complete_turn(world))
    }
}
