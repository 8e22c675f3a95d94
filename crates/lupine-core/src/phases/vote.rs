//! Day vote: every living player casts one weighted ballot.

use std::collections::BTreeMap;

use lupine_protocol::PlayerId;
use tracing::info;

use super::{LastWordsPhase, NightPhase, PhaseKind, PhaseState, PhaseTimer, Transition, wolf_self_destruct};
use crate::config::secs;
use crate::notice::{VoteLine, VoteVerdict};
use crate::world::World;
use crate::{Action, AliveFilter, DeathReason, GameError, Notice};

/// Ballot weight in half-votes: 1.0 normally, 1.5 for the sheriff.
const VOTE_HALVES: u32 = 2;
const SHERIFF_VOTE_HALVES: u32 = 3;

/// What a tally decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExileVerdict {
    Exile(PlayerId),
    Tie,
    BelowMinimum,
}

/// Weighted result of a day vote.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteTally {
    /// Weighted total per target.
    pub totals: BTreeMap<PlayerId, f64>,
    /// Voters per target, in voter id order.
    pub voters: BTreeMap<PlayerId, Vec<PlayerId>>,
    pub verdict: ExileVerdict,
}

/// Tallies `ballots` (`None` abstains).
///
/// The most-weighted target is exiled only if its total is strictly above
/// `min_votes` and no other target shares it.
pub fn tally_votes(
    ballots: &BTreeMap<PlayerId, Option<PlayerId>>,
    sheriff: Option<PlayerId>,
    min_votes: f64,
) -> VoteTally {
    let mut halves: BTreeMap<PlayerId, u32> = BTreeMap::new();
    let mut voters: BTreeMap<PlayerId, Vec<PlayerId>> = BTreeMap::new();
    for (voter, target) in ballots {
        let Some(target) = target else { continue };
        let weight = if Some(*voter) == sheriff {
            SHERIFF_VOTE_HALVES
        } else {
            VOTE_HALVES
        };
        *halves.entry(*target).or_default() += weight;
        voters.entry(*target).or_default().push(*voter);
    }

    let top = halves.values().copied().max().unwrap_or(0);
    let leaders: Vec<PlayerId> = halves
        .iter()
        .filter(|(_, h)| **h == top)
        .map(|(id, _)| *id)
        .collect();
    let verdict = if f64::from(top) / 2.0 <= min_votes {
        ExileVerdict::BelowMinimum
    } else if leaders.len() > 1 {
        ExileVerdict::Tie
    } else {
        match leaders.first() {
            Some(id) => ExileVerdict::Exile(*id),
            None => ExileVerdict::BelowMinimum,
        }
    };

    VoteTally {
        totals: halves
            .into_iter()
            .map(|(id, h)| (id, f64::from(h) / 2.0))
            .collect(),
        voters,
        verdict,
    }
}

/// One exile vote.
#[derive(Debug)]
pub struct VotePhase {
    turn: u32,
    ballots: BTreeMap<PlayerId, Option<PlayerId>>,
    timer: PhaseTimer,
}

impl VotePhase {
    pub fn new(turn: u32) -> Self {
        Self {
            turn,
            ballots: BTreeMap::new(),
            timer: PhaseTimer::default(),
        }
    }

    fn resolve(&mut self, world: &mut World) -> Transition {
        self.timer.cancel(world);
        let sheriff = world.roster.sheriff().filter(|p| p.alive).map(|p| p.id);
        let tally = tally_votes(&self.ballots, sheriff, world.config.min_votes_to_exile);

        let mut lines: Vec<VoteLine> = tally
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
        lines.sort_by(|a, b| b.weight.total_cmp(&a.weight));

        let next_night = NightPhase::new(self.turn + 1);
        match tally.verdict {
            ExileVerdict::Exile(exiled) => {
                world.broadcast(Notice::VoteResult {
                    tally: lines,
                    verdict: VoteVerdict::Exiled(world.seat(exiled)),
                });
                world.handle_player_death(exiled, DeathReason::Exile);
                info!(turn = self.turn, player = %exiled, "player exiled");
                Transition::to(LastWordsPhase::new(exiled, next_night))
            }
            ExileVerdict::Tie => {
                world.broadcast(Notice::VoteResult {
                    tally: lines,
                    verdict: VoteVerdict::Tie,
                });
                info!(turn = self.turn, "vote tied, nobody exiled");
                Transition::to(next_night)
            }
            ExileVerdict::BelowMinimum => {
                world.broadcast(Notice::VoteResult {
                    tally: lines,
                    verdict: VoteVerdict::BelowMinimum,
                });
                info!(turn = self.turn, "too few votes, nobody exiled");
                Transition::to(next_night)
            }
        }
    }
}

impl PhaseState for VotePhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Vote
    }

    fn on_enter(&mut self, world: &mut World) -> Transition {
        let limit = world.config.timing.vote_secs;
        let candidates = world.living_seats(&AliveFilter::new());
        world.broadcast(Notice::VoteOpen {
            candidates,
            secs: limit,
        });
        self.timer.arm(world, secs(limit));
        info!(turn = self.turn, "exile vote open");
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
            Action::Vote(number) => {
                if self.ballots.contains_key(&actor) {
                    return Err(GameError::AlreadyActed);
                }
                let target = number.map(|n| world.living_by_number(n)).transpose()?;
                self.ballots.insert(actor, target);
                match target {
                    Some(id) => {
                        let seat = world.seat(id);
                        world.ack(actor, format!("vote for {seat} recorded"));
                    }
                    None => world.ack(actor, "abstention recorded"),
                }
                if self.ballots.len() >= world.roster.living_count() {
                    return Ok(self.resolve(world));
                }
                Ok(Transition::Stay)
            }
            Action::WolfSelfDestruct => wolf_self_destruct(world, actor),
            other => Err(GameError::IllegalPhase(format!(
                "{} is not allowed during the vote",
                other.name()
            ))),
        }
    }

    fn on_timeout(&mut self, world: &mut World, seq: u32) -> Option<Transition> {
        if !self.timer.fire(seq) {
            return None;
        }
        let all = AliveFilter::new();
        let missing: Vec<PlayerId> = world
            .roster
            .alive(&all)
            .map(|p| p.id)
            .filter(|id| !self.ballots.contains_key(id))
            .collect();
        info!(turn = self.turn, abstained = ?missing, "vote timed out, missing ballots count as abstentions");
        Some(self.resolve(world))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::testing::world as new_world;
    use crate::{GameConfig, RoleKind};

    fn ballots(votes: &[(u64, Option<u64>)]) -> BTreeMap<PlayerId, Option<PlayerId>> {
        votes
            .iter()
            .map(|(voter, target)| (PlayerId(*voter), target.map(PlayerId)))
            .collect()
    }

    #[test]
    fn test_unique_top_is_exiled() {
        let tally = tally_votes(&ballots(&[(1, Some(3)), (2, Some(3)), (3, Some(1))]), None, 0.0);
        assert_eq!(tally.verdict, ExileVerdict::Exile(PlayerId(3)));
        assert_eq!(tally.totals[&PlayerId(3)], 2.0);
        assert_eq!(tally.voters[&PlayerId(3)], vec![PlayerId(1), PlayerId(2)]);
    }

    #[test]
    fn test_tie_exiles_nobody() {
        let tally = tally_votes(
            &ballots(&[(1, Some(4)), (2, Some(4)), (3, Some(4)), (4, Some(1)), (5, Some(1)), (6, Some(1))]),
            None,
            0.0,
        );
        assert_eq!(tally.verdict, ExileVerdict::Tie);
    }

    #[test]
    fn test_sheriff_ballot_weighs_one_and_a_half() {
        // 1 (sheriff) and 2 vote for 5; 3 and 4 vote for 6: 2.5 vs 2.0
        let votes = ballots(&[(1, Some(5)), (2, Some(5)), (3, Some(6)), (4, Some(6))]);
        let tally = tally_votes(&votes, Some(PlayerId(1)), 0.0);
        assert_eq!(tally.totals[&PlayerId(5)], 2.5);
        assert_eq!(tally.totals[&PlayerId(6)], 2.0);
        assert_eq!(tally.verdict, ExileVerdict::Exile(PlayerId(5)));

        // without the sheriff it would be a tie
        assert_eq!(tally_votes(&votes, None, 0.0).verdict, ExileVerdict::Tie);
    }

    #[test]
    fn test_minimum_must_be_strictly_exceeded() {
        let votes = ballots(&[(1, Some(5)), (2, Some(5)), (3, None)]);
        assert_eq!(tally_votes(&votes, None, 2.0).verdict, ExileVerdict::BelowMinimum);
        assert_eq!(tally_votes(&votes, None, 1.5).verdict, ExileVerdict::Exile(PlayerId(5)));
    }

    #[test]
    fn test_all_abstain_is_below_minimum() {
        let votes = ballots(&[(1, None), (2, None)]);
        assert_eq!(tally_votes(&votes, None, 0.0).verdict, ExileVerdict::BelowMinimum);
        assert_eq!(tally_votes(&BTreeMap::new(), None, 0.0).verdict, ExileVerdict::BelowMinimum);
    }

    #[test]
    fn test_verdict_is_never_both_exile_and_no_exile() {
        // every 3-voter ballot combination over 3 targets plus abstain
        let options = [None, Some(1), Some(2), Some(3)];
        for a in options {
            for b in options {
                for c in options {
                    let votes = ballots(&[(1, a), (2, b), (3, c)]);
                    let tally = tally_votes(&votes, Some(PlayerId(1)), 0.0);
                    let top = tally.totals.values().copied().fold(0.0, f64::max);
                    let leaders = tally.totals.values().filter(|w| **w == top).count();
                    match tally.verdict {
                        ExileVerdict::Exile(id) => {
                            assert_eq!(tally.totals[&id], top);
                            assert_eq!(leaders, 1);
                        }
                        ExileVerdict::Tie => assert!(leaders > 1),
                        ExileVerdict::BelowMinimum => assert_eq!(top, 0.0),
                    }
                }
            }
        }
    }

    #[test]
    fn test_double_vote_rejected_and_full_turnout_resolves() {
        let roles = [RoleKind::Wolf, RoleKind::Villager, RoleKind::Villager, RoleKind::Seer];
        let mut world = new_world(&roles, GameConfig::default());
        let mut vote = VotePhase::new(1);
        vote.on_enter(&mut world);

        vote.handle_action(&mut world, PlayerId(2), &Action::Vote(Some(1))).unwrap();
        assert_eq!(
            vote.handle_action(&mut world, PlayerId(2), &Action::Vote(Some(3))).unwrap_err(),
            GameError::AlreadyActed
        );
        vote.handle_action(&mut world, PlayerId(3), &Action::Vote(Some(1))).unwrap();
        vote.handle_action(&mut world, PlayerId(4), &Action::Vote(None)).unwrap();
        let next = vote.handle_action(&mut world, PlayerId(1), &Action::Vote(Some(2))).unwrap();
        assert!(matches!(next, Transition::Goto(ref p) if p.kind() == PhaseKind::LastWords));
        assert_eq!(world.roster.get(PlayerId(1)).unwrap().death, Some(DeathReason::Exile));
    }

    #[test]
    fn test_timeout_resolves_with_partial_ballots() {
        let roles = [RoleKind::Wolf, RoleKind::Villager, RoleKind::Villager, RoleKind::Seer];
        let mut world = new_world(&roles, GameConfig::default());
        let mut vote = VotePhase::new(1);
        vote.on_enter(&mut world);
        vote.handle_action(&mut world, PlayerId(2), &Action::Vote(Some(3))).unwrap();
        let next = vote.on_timeout(&mut world, 1).unwrap();
        assert!(matches!(next, Transition::Goto(ref p) if p.kind() == PhaseKind::LastWords));
        assert!(!world.roster.is_alive(PlayerId(3)));
    }
}
