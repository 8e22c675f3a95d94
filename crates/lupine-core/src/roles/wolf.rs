use std::collections::{BTreeMap, HashMap};

use lupine_protocol::PlayerId;
use serde::{Deserialize, Serialize};

use super::{
    Capability, RoleAction, RoleContext, RoleKind, RoleOutcome, RoleView, living_target,
    unsupported,
};
use crate::{AliveFilter, Camp, GameError, Notice, PhaseKind, Player};

/// Why the pack attacked nobody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoKillReason {
    /// The top target was shared.
    Tie,
    /// Every wolf abstained.
    Abstained,
}

/// Result of the pack's vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WolfVerdict {
    Kill(PlayerId),
    NoKill(NoKillReason),
}

/// Tallies the pack's ballots (`None` abstains).
///
/// A lone living wolf decides alone. Otherwise the single most-voted target
/// is killed; a shared top count or an all-abstain pack kills nobody.
pub fn tally_wolf_votes(
    votes: &BTreeMap<PlayerId, Option<PlayerId>>,
    living_wolves: usize,
) -> WolfVerdict {
    if living_wolves == 1 && votes.len() == 1 {
        return match votes.values().next().copied().flatten() {
            Some(target) => WolfVerdict::Kill(target),
            None => WolfVerdict::NoKill(NoKillReason::Abstained),
        };
    }

    let mut counts: HashMap<PlayerId, usize> = HashMap::new();
    for target in votes.values().flatten() {
        *counts.entry(*target).or_default() += 1;
    }
    let Some(top) = counts.values().copied().max() else {
        return WolfVerdict::NoKill(NoKillReason::Abstained);
    };
    let mut leaders = counts.iter().filter(|(_, n)| **n == top).map(|(id, _)| *id);
    match (leaders.next(), leaders.next()) {
        (Some(target), None) => WolfVerdict::Kill(target),
        _ => WolfVerdict::NoKill(NoKillReason::Tie),
    }
}

/// Pack member. Wolves vote on a victim together instead of acting alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wolf;

impl Capability for Wolf {
    fn kind(&self) -> RoleKind {
        RoleKind::Wolf
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
            RoleAction::Bite if target.is_none() => Ok(()),
            RoleAction::Bite => {
                let player = living_target(view, target)?;
                if player.id == view.owner {
                    return Err(GameError::IllegalTarget("you cannot bite yourself".into()));
                }
                if player.camp() == Camp::Wolf {
                    return Err(GameError::IllegalTarget(format!(
                        "{} is in your pack",
                        player.seat()
                    )));
                }
                Ok(())
            }
            other => Err(unsupported(RoleKind::Wolf, other)),
        }
    }

    fn act(
        &mut self,
        ctx: &mut RoleContext<'_>,
        target: Option<PlayerId>,
        action: RoleAction,
    ) -> Result<RoleOutcome, GameError> {
        self.is_valid_target(&ctx.view(), target, action)?;
        Ok(RoleOutcome::WolfVote(target))
    }

    fn prompt(&self, view: &RoleView<'_>, secs: u64) -> Notice {
        let prey = AliveFilter::new().excluding_camp(Camp::Wolf);
        let pack = AliveFilter::new().with_role(RoleKind::Wolf);
        Notice::WolfPrompt {
            targets: view.roster.alive(&prey).map(Player::seat).collect(),
            pack: view.roster.alive(&pack).map(Player::seat).collect(),
            secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleConfig;
    use crate::roles::testing::roster;

    fn ballots(votes: &[(u64, Option<u64>)]) -> BTreeMap<PlayerId, Option<PlayerId>> {
        votes
            .iter()
            .map(|(voter, target)| (PlayerId(*voter), target.map(PlayerId)))
            .collect()
    }

    #[test]
    fn test_unanimous_pack_kills() {
        let votes = ballots(&[(1, Some(3)), (2, Some(3))]);
        assert_eq!(tally_wolf_votes(&votes, 2), WolfVerdict::Kill(PlayerId(3)));
    }

    #[test]
    fn test_majority_wins_over_minority() {
        let votes = ballots(&[(1, Some(4)), (2, Some(4)), (5, Some(6))]);
        assert_eq!(tally_wolf_votes(&votes, 3), WolfVerdict::Kill(PlayerId(4)));
    }

    #[test]
    fn test_split_pack_kills_nobody() {
        let votes = ballots(&[(1, Some(3)), (2, Some(4))]);
        assert_eq!(tally_wolf_votes(&votes, 2), WolfVerdict::NoKill(NoKillReason::Tie));
    }

    #[test]
    fn test_all_abstain_kills_nobody() {
        let votes = ballots(&[(1, None), (2, None)]);
        assert_eq!(
            tally_wolf_votes(&votes, 2),
            WolfVerdict::NoKill(NoKillReason::Abstained)
        );
        assert_eq!(
            tally_wolf_votes(&BTreeMap::new(), 2),
            WolfVerdict::NoKill(NoKillReason::Abstained)
        );
    }

    #[test]
    fn test_lone_wolf_is_decisive() {
        assert_eq!(
            tally_wolf_votes(&ballots(&[(2, Some(5))]), 1),
            WolfVerdict::Kill(PlayerId(5))
        );
        assert_eq!(
            tally_wolf_votes(&ballots(&[(2, None)]), 1),
            WolfVerdict::NoKill(NoKillReason::Abstained)
        );
    }

    #[test]
    fn test_one_abstain_does_not_block_the_other() {
        let votes = ballots(&[(1, None), (2, Some(3))]);
        assert_eq!(tally_wolf_votes(&votes, 2), WolfVerdict::Kill(PlayerId(3)));
    }

    #[test]
    fn test_cannot_bite_self_or_pack() {
        let mut roster = roster(&[RoleKind::Wolf, RoleKind::Wolf, RoleKind::Villager]);
        let rules = RuleConfig::default();
        let mut ctx = RoleContext {
            owner: PlayerId(1),
            roster: &mut roster,
            turn: 0,
            night_victim: None,
            rules: &rules,
        };
        let mut wolf = Wolf;
        for target in [1, 2] {
            assert!(matches!(
                wolf.act(&mut ctx, Some(PlayerId(target)), RoleAction::Bite),
                Err(GameError::IllegalTarget(_))
            ));
        }
        assert_eq!(
            wolf.act(&mut ctx, Some(PlayerId(3)), RoleAction::Bite),
            Ok(RoleOutcome::WolfVote(Some(PlayerId(3))))
        );
        assert_eq!(
            wolf.act(&mut ctx, None, RoleAction::Bite),
            Ok(RoleOutcome::WolfVote(None))
        );
    }
}
