use lupine_protocol::PlayerId;
use tracing::debug;

use super::{
    Capability, RoleAction, RoleContext, RoleKind, RoleOutcome, RoleView, living_others,
    living_target, unsupported,
};
use crate::{GameError, Notice, PhaseKind, Player};

/// Holds one antidote and one poison, each usable once per game and never
/// both on the same night.
#[derive(Debug, Clone)]
pub struct Witch {
    antidote: bool,
    poison: bool,
    last_used_turn: Option<u32>,
}

impl Default for Witch {
    fn default() -> Self {
        Self {
            antidote: true,
            poison: true,
            last_used_turn: None,
        }
    }
}

impl Witch {
    pub fn has_antidote(&self) -> bool {
        self.antidote
    }

    pub fn has_poison(&self) -> bool {
        self.poison
    }

    /// Whether any potion is left.
    pub fn has_potions(&self) -> bool {
        self.antidote || self.poison
    }

    fn used_tonight(&self, turn: u32) -> bool {
        self.last_used_turn == Some(turn)
    }
}

impl Capability for Witch {
    fn kind(&self) -> RoleKind {
        RoleKind::Witch
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
            RoleAction::Skip => Ok(()),
            RoleAction::Save => {
                if !self.antidote {
                    return Err(GameError::IllegalPhase("the antidote is used up".into()));
                }
                if self.used_tonight(view.turn) {
                    return Err(GameError::AlreadyActed);
                }
                let Some(victim) = view.night_victim else {
                    return Err(GameError::IllegalTarget("nobody was attacked tonight".into()));
                };
                if target != Some(victim) {
                    return Err(GameError::IllegalTarget(
                        "the antidote only works on tonight's victim".into(),
                    ));
                }
                if victim == view.owner && !view.rules.witch_self_save {
                    return Err(GameError::IllegalTarget("you cannot save yourself".into()));
                }
                Ok(())
            }
            RoleAction::Poison => {
                if !self.poison {
                    return Err(GameError::IllegalPhase("the poison is used up".into()));
                }
                if self.used_tonight(view.turn) {
                    return Err(GameError::AlreadyActed);
                }
                living_target(view, target)?;
                Ok(())
            }
            other => Err(unsupported(RoleKind::Witch, other)),
        }
    }

    fn act(
        &mut self,
        ctx: &mut RoleContext<'_>,
        target: Option<PlayerId>,
        action: RoleAction,
    ) -> Result<RoleOutcome, GameError> {
        self.is_valid_target(&ctx.view(), target, action)?;
        let outcome = match (action, target) {
            (RoleAction::Save, Some(id)) => {
                self.antidote = false;
                RoleOutcome::Saved(id)
            }
            (RoleAction::Poison, Some(id)) => {
                self.poison = false;
                RoleOutcome::Poisoned(id)
            }
            _ => return Ok(RoleOutcome::Skipped),
        };
        self.last_used_turn = Some(ctx.turn);
        debug!(witch = %ctx.owner, ?outcome, turn = ctx.turn, "potion used");
        Ok(outcome)
    }

    fn prompt(&self, view: &RoleView<'_>, secs: u64) -> Notice {
        Notice::WitchPrompt {
            victim: view
                .night_victim
                .and_then(|id| view.roster.get(id))
                .map(Player::seat),
            antidote: self.antidote,
            poison: self.poison,
            targets: if self.poison { living_others(view) } else { Vec::new() },
            secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::testing::roster;
    use crate::{Roster, RuleConfig};

    fn use_potion(
        witch: &mut Witch,
        roster: &mut Roster,
        rules: &RuleConfig,
        victim: Option<u64>,
        target: u64,
        action: RoleAction,
        turn: u32,
    ) -> Result<RoleOutcome, GameError> {
        let mut ctx = RoleContext {
            owner: PlayerId(1),
            roster,
            turn,
            night_victim: victim.map(PlayerId),
            rules,
        };
        witch.act(&mut ctx, Some(PlayerId(target)), action)
    }

    fn table() -> Roster {
        roster(&[RoleKind::Witch, RoleKind::Wolf, RoleKind::Villager, RoleKind::Villager])
    }

    #[test]
    fn test_antidote_only_on_tonights_victim() {
        let mut roster = table();
        let rules = RuleConfig::default();
        let mut witch = Witch::default();
        assert!(matches!(
            use_potion(&mut witch, &mut roster, &rules, Some(3), 4, RoleAction::Save, 0),
            Err(GameError::IllegalTarget(_))
        ));
        assert!(matches!(
            use_potion(&mut witch, &mut roster, &rules, None, 3, RoleAction::Save, 0),
            Err(GameError::IllegalTarget(_))
        ));
        assert_eq!(
            use_potion(&mut witch, &mut roster, &rules, Some(3), 3, RoleAction::Save, 0),
            Ok(RoleOutcome::Saved(PlayerId(3)))
        );
        assert!(!witch.has_antidote());
    }

    #[test]
    fn test_cannot_use_both_potions_in_one_night() {
        let mut roster = table();
        let rules = RuleConfig::default();
        let mut witch = Witch::default();
        use_potion(&mut witch, &mut roster, &rules, Some(3), 3, RoleAction::Save, 0).unwrap();
        assert_eq!(
            use_potion(&mut witch, &mut roster, &rules, Some(3), 4, RoleAction::Poison, 0),
            Err(GameError::AlreadyActed)
        );
        assert!(witch.has_poison(), "rejected poison is not consumed");

        // next night the poison is fine
        assert_eq!(
            use_potion(&mut witch, &mut roster, &rules, None, 4, RoleAction::Poison, 1),
            Ok(RoleOutcome::Poisoned(PlayerId(4)))
        );
        assert!(!witch.has_potions());
    }

    #[test]
    fn test_poison_then_antidote_same_night_rejected() {
        let mut roster = table();
        let rules = RuleConfig::default();
        let mut witch = Witch::default();
        use_potion(&mut witch, &mut roster, &rules, Some(3), 2, RoleAction::Poison, 0).unwrap();
        assert_eq!(
            use_potion(&mut witch, &mut roster, &rules, Some(3), 3, RoleAction::Save, 0),
            Err(GameError::AlreadyActed)
        );
    }

    #[test]
    fn test_self_save_follows_rule() {
        let mut roster = table();
        let mut witch = Witch::default();
        let strict = RuleConfig::default();
        assert!(matches!(
            use_potion(&mut witch, &mut roster, &strict, Some(1), 1, RoleAction::Save, 0),
            Err(GameError::IllegalTarget(_))
        ));
        let lenient = RuleConfig {
            witch_self_save: true,
            ..RuleConfig::default()
        };
        assert!(use_potion(&mut witch, &mut roster, &lenient, Some(1), 1, RoleAction::Save, 0).is_ok());
    }

    #[test]
    fn test_used_potion_is_gone() {
        let mut roster = table();
        let rules = RuleConfig::default();
        let mut witch = Witch::default();
        use_potion(&mut witch, &mut roster, &rules, None, 2, RoleAction::Poison, 0).unwrap();
        assert!(matches!(
            use_potion(&mut witch, &mut roster, &rules, None, 3, RoleAction::Poison, 2),
            Err(GameError::IllegalPhase(_))
        ));
    }

    #[test]
    fn test_witch_may_poison_herself() {
        let mut roster = table();
        let rules = RuleConfig::default();
        let mut witch = Witch::default();
        assert_eq!(
            use_potion(&mut witch, &mut roster, &rules, None, 1, RoleAction::Poison, 0),
            Ok(RoleOutcome::Poisoned(PlayerId(1)))
        );
        assert!(!witch.has_poison());
    }
}
