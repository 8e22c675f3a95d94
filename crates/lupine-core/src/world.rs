//! Game-wide mutable state shared by every phase.
//!
//! [`World`] is everything the orchestrator owns except the current phase.
//! Keeping the two apart lets a phase handler borrow the world mutably while
//! the orchestrator still holds the phase.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use lupine_protocol::{PlayerId, Recipient};
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::roles::{RoleContext, RoleView};
use crate::{
    AliveFilter, Camp, DeathReason, Effect, GameConfig, GameError, Notice, Outcome, PhaseKind,
    PhaseToken, Player, Role, RoleAction, RoleKind, RoleOutcome, Roster, Seat, TimerId, WinReason,
    Winner,
};

pub struct World {
    pub(crate) roster: Roster,
    pub(crate) roles: HashMap<PlayerId, Role>,
    pub(crate) config: GameConfig,
    /// Day/night cycle; 0 is the first night.
    pub(crate) turn: u32,
    /// Token of the phase occupancy currently installed.
    pub(crate) token: PhaseToken,
    pub(crate) rng: StdRng,
    /// Dead sheriffs still owed a transfer phase, oldest first.
    pub(crate) pending_transfers: VecDeque<PlayerId>,
    pub(crate) outcome: Option<Outcome>,
    effects: Vec<Effect>,
}

impl World {
    pub(crate) fn new(roster: Roster, roles: HashMap<PlayerId, Role>, config: GameConfig, rng: StdRng) -> Self {
        Self {
            roster,
            roles,
            config,
            turn: 0,
            token: PhaseToken(0),
            rng,
            pending_transfers: VecDeque::new(),
            outcome: None,
            effects: Vec::new(),
        }
    }

    // -- effects ------------------------------------------------------------

    pub(crate) fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub(crate) fn broadcast(&mut self, notice: Notice) {
        self.effects.push(Effect::Notify {
            to: Recipient::Group,
            notice,
        });
    }

    pub(crate) fn direct(&mut self, player: PlayerId, notice: Notice) {
        self.effects.push(Effect::Notify {
            to: Recipient::Player(player),
            notice,
        });
    }

    pub(crate) fn ack(&mut self, player: PlayerId, detail: impl Into<String>) {
        self.direct(
            player,
            Notice::Accepted {
                detail: detail.into(),
            },
        );
    }

    pub(crate) fn arm_timer(&mut self, seq: u32, after: Duration) -> TimerId {
        let id = TimerId {
            token: self.token,
            seq,
        };
        self.effects.push(Effect::ArmTimer { id, after });
        id
    }

    pub(crate) fn cancel_timer(&mut self, id: TimerId) {
        self.effects.push(Effect::CancelTimer { id });
    }

    // -- lookups ------------------------------------------------------------

    pub(crate) fn seat(&self, id: PlayerId) -> Seat {
        self.roster
            .get(id)
            .map(Player::seat)
            .unwrap_or_else(|| Seat::unknown(id))
    }

    pub(crate) fn living_seats(&self, filter: &AliveFilter) -> Vec<Seat> {
        self.roster.alive(filter).map(Player::seat).collect()
    }

    /// Living players matching `filter`, each paired with their role.
    pub(crate) fn alive_with_roles<'a>(
        &'a self,
        filter: &'a AliveFilter,
    ) -> impl Iterator<Item = (&'a Player, &'a Role)> + 'a {
        self.roster
            .alive(filter)
            .filter_map(|player| self.roles.get(&player.id).map(|role| (player, role)))
    }

    /// The living player sitting in seat `number`.
    pub(crate) fn living_by_number(&self, number: u32) -> Result<PlayerId, GameError> {
        let player = self
            .roster
            .by_number(number)
            .ok_or_else(|| GameError::IllegalTarget(format!("there is no player #{number}")))?;
        if !player.alive {
            return Err(GameError::IllegalTarget(format!("{} is dead", player.seat())));
        }
        Ok(player.id)
    }

    pub(crate) fn role_of(&self, id: PlayerId) -> Option<RoleKind> {
        self.roster.get(id).map(|p| p.role)
    }

    /// Living holders of `kind`, in seat order.
    pub(crate) fn living_holders(&self, kind: RoleKind) -> Vec<PlayerId> {
        let filter = AliveFilter::new().with_role(kind);
        self.roster.alive(&filter).map(|p| p.id).collect()
    }

    pub(crate) fn living_wolves(&self) -> Vec<PlayerId> {
        self.living_holders(RoleKind::Wolf)
    }

    /// Whether `id` is a dead hunter who may still fire.
    pub(crate) fn hunter_can_shoot(&self, id: PlayerId) -> bool {
        match (self.roster.get(id), self.roles.get(&id)) {
            (Some(player), Some(role @ Role::Hunter(_))) => {
                role.capability().can_act(player, PhaseKind::HunterShot)
            }
            _ => false,
        }
    }

    pub(crate) fn forfeit_hunter_shot(&mut self, id: PlayerId) {
        if let Some(hunter) = self.roles.get_mut(&id).and_then(Role::as_hunter_mut) {
            hunter.forfeit();
        }
    }

    // -- roles --------------------------------------------------------------

    /// Builds the prompt `id`'s role shows when its turn comes.
    pub(crate) fn role_prompt(&self, id: PlayerId, night_victim: Option<PlayerId>, secs: u64) -> Option<Notice> {
        let role = self.roles.get(&id)?;
        let view = RoleView {
            owner: id,
            roster: &self.roster,
            turn: self.turn,
            night_victim,
            rules: &self.config.rules,
        };
        Some(role.capability().prompt(&view, secs))
    }

    /// Runs `actor`'s role ability: eligibility first, then the role's own
    /// target checks, then the effect.
    pub(crate) fn role_act(
        &mut self,
        actor: PlayerId,
        phase: PhaseKind,
        target: Option<PlayerId>,
        action: RoleAction,
        night_victim: Option<PlayerId>,
    ) -> Result<RoleOutcome, GameError> {
        let player = self
            .roster
            .get(actor)
            .ok_or(GameError::NotParticipant(actor))?;
        let role = self
            .roles
            .get_mut(&actor)
            .ok_or(GameError::NotParticipant(actor))?;
        if !role.capability().can_act(player, phase) {
            return Err(GameError::IllegalPhase(format!(
                "the {} cannot act now",
                role.kind()
            )));
        }
        let mut ctx = RoleContext {
            owner: actor,
            roster: &mut self.roster,
            turn: self.turn,
            night_victim,
            rules: &self.config.rules,
        };
        role.capability_mut().act(&mut ctx, target, action)
    }

    // -- death & victory ----------------------------------------------------

    /// Kills `id`. Returns `false`, changing nothing, if they are already
    /// dead or not seated.
    ///
    /// A dead sheriff with living successors is queued for a transfer phase;
    /// otherwise the title is dropped. The win condition is re-evaluated.
    pub(crate) fn handle_player_death(&mut self, id: PlayerId, reason: DeathReason) -> bool {
        let Some(player) = self.roster.get_mut(id) else {
            return false;
        };
        if !player.alive {
            debug!(player = %id, %reason, "already dead, ignoring");
            return false;
        }
        player.alive = false;
        player.death = Some(reason);
        player.protected = false;
        let was_sheriff = player.sheriff;
        info!(player = %id, %reason, turn = self.turn, "player died");

        if was_sheriff {
            if self.roster.living_count() > 0 {
                self.pending_transfers.push_back(id);
            } else if let Some(player) = self.roster.get_mut(id) {
                player.sheriff = false;
            }
        }
        self.evaluate_winner();
        true
    }

    /// Sets the outcome once a side has won. Good is checked first.
    pub(crate) fn evaluate_winner(&mut self) -> Option<Outcome> {
        if self.outcome.is_some() {
            return self.outcome;
        }
        let mut wolves = 0;
        let mut special = 0;
        let mut villagers = 0;
        for player in self.roster.iter().filter(|p| p.alive) {
            match player.camp() {
                Camp::Wolf => wolves += 1,
                Camp::SpecialGood => special += 1,
                Camp::Villager => villagers += 1,
            }
        }

        let outcome = if wolves == 0 {
            Some(Outcome {
                winner: Winner::Good,
                reason: WinReason::WolvesEliminated,
            })
        } else if special == 0 && villagers == 0 {
            Some(Outcome {
                winner: Winner::Wolves,
                reason: WinReason::GoodEliminated,
            })
        } else if self.config.rules.camp_sweep && (special == 0 || villagers == 0) {
            let swept = if special == 0 {
                Camp::SpecialGood
            } else {
                Camp::Villager
            };
            Some(Outcome {
                winner: Winner::Wolves,
                reason: WinReason::CampSwept(swept),
            })
        } else {
            None
        };

        if let Some(outcome) = outcome {
            info!(winner = ?outcome.winner, reason = ?outcome.reason, turn = self.turn, "win condition met");
            self.outcome = Some(outcome);
        }
        self.outcome
    }

    // -- wolf chat ----------------------------------------------------------

    /// Relays `text` from a living wolf to the rest of the living pack.
    pub(crate) fn wolf_chat(&mut self, from: PlayerId, text: &str) -> Result<(), GameError> {
        if self.role_of(from) != Some(RoleKind::Wolf) {
            return Err(GameError::WrongRole {
                required: RoleKind::Wolf,
            });
        }
        if !self.roster.is_alive(from) {
            return Err(GameError::IllegalPhase("the dead cannot talk to the pack".into()));
        }
        let others: Vec<PlayerId> = self
            .living_wolves()
            .into_iter()
            .filter(|id| *id != from)
            .collect();
        if others.is_empty() {
            return Err(GameError::IllegalTarget("no other wolf is alive".into()));
        }
        let seat = self.seat(from);
        for wolf in others {
            self.direct(
                wolf,
                Notice::WolfChat {
                    from: seat.clone(),
                    text: text.to_string(),
                },
            );
        }
        debug!(wolf = %from, "pack message relayed");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use rand::SeedableRng;

    use super::*;
    use crate::roles::testing::roster;

    /// A world with players 1..=n holding `roles`, numbers assigned.
    pub fn world(roles: &[RoleKind], config: GameConfig) -> World {
        let roster = roster(roles);
        let bindings = roster.iter().map(|p| (p.id, Role::new(p.role))).collect();
        World::new(roster, bindings, config, StdRng::seed_from_u64(1))
    }
}

#[cfg(test)]
mod tests {
    use super::testing::world;
    use super::*;
    use crate::RuleConfig;

    const TABLE: [RoleKind; 6] = [
        RoleKind::Wolf,
        RoleKind::Wolf,
        RoleKind::Guard,
        RoleKind::Seer,
        RoleKind::Witch,
        RoleKind::Villager,
    ];

    fn snapshot(world: &World) -> Vec<Player> {
        world.roster.iter().cloned().collect()
    }

    #[test]
    fn test_death_is_idempotent() {
        let mut world = world(&TABLE, GameConfig::default());
        assert!(world.handle_player_death(PlayerId(6), DeathReason::WolfKill));
        let once = snapshot(&world);
        let transfers = world.pending_transfers.clone();

        assert!(!world.handle_player_death(PlayerId(6), DeathReason::Exile));
        assert_eq!(snapshot(&world), once);
        assert_eq!(world.pending_transfers, transfers);
        assert_eq!(
            world.roster.get(PlayerId(6)).unwrap().death,
            Some(DeathReason::WolfKill)
        );
    }

    #[test]
    fn test_sheriff_death_queues_one_transfer() {
        let mut world = world(&TABLE, GameConfig::default());
        world.roster.get_mut(PlayerId(3)).unwrap().sheriff = true;
        world.handle_player_death(PlayerId(3), DeathReason::Exile);
        world.handle_player_death(PlayerId(3), DeathReason::Exile);
        assert_eq!(world.pending_transfers, VecDeque::from([PlayerId(3)]));
    }

    #[test]
    fn test_good_wins_when_wolves_die() {
        let mut world = world(&TABLE, GameConfig::default());
        world.handle_player_death(PlayerId(1), DeathReason::Exile);
        assert_eq!(world.outcome, None);
        world.handle_player_death(PlayerId(2), DeathReason::Poison);
        assert_eq!(
            world.outcome,
            Some(Outcome {
                winner: Winner::Good,
                reason: WinReason::WolvesEliminated
            })
        );
    }

    #[test]
    fn test_wolves_win_when_all_good_die() {
        let mut world = world(&TABLE, GameConfig::default());
        for id in 3..=5 {
            world.handle_player_death(PlayerId(id), DeathReason::WolfKill);
        }
        assert_eq!(world.outcome, None, "villager still alive, no sweep rule");
        world.handle_player_death(PlayerId(6), DeathReason::WolfKill);
        assert_eq!(world.outcome.map(|o| o.winner), Some(Winner::Wolves));
    }

    #[test]
    fn test_camp_sweep_rule() {
        let config = GameConfig {
            rules: RuleConfig {
                camp_sweep: true,
                ..RuleConfig::default()
            },
            ..GameConfig::default()
        };
        let mut world = world(&TABLE, config);
        world.handle_player_death(PlayerId(6), DeathReason::WolfKill);
        assert_eq!(
            world.outcome,
            Some(Outcome {
                winner: Winner::Wolves,
                reason: WinReason::CampSwept(Camp::Villager)
            })
        );
    }

    #[test]
    fn test_wolf_chat_reaches_other_wolves_only() {
        let mut world = world(&TABLE, GameConfig::default());
        world.wolf_chat(PlayerId(1), "bite 4").unwrap();
        let effects = world.take_effects();
        assert_eq!(effects.len(), 1);
        assert!(matches!(
            &effects[0],
            Effect::Notify { to: Recipient::Player(PlayerId(2)), notice: Notice::WolfChat { .. } }
        ));

        assert_eq!(
            world.wolf_chat(PlayerId(3), "hi"),
            Err(GameError::WrongRole { required: RoleKind::Wolf })
        );
        world.handle_player_death(PlayerId(2), DeathReason::Exile);
        assert!(matches!(
            world.wolf_chat(PlayerId(1), "alone"),
            Err(GameError::IllegalTarget(_))
        ));
    }

    #[test]
    fn test_alive_with_roles_pairs_each_player_with_their_role() {
        let mut world = world(&TABLE, GameConfig::default());
        world.handle_player_death(PlayerId(2), DeathReason::Exile);

        let pack = AliveFilter::new().with_role(RoleKind::Wolf);
        let pairs: Vec<(PlayerId, RoleKind)> = world
            .alive_with_roles(&pack)
            .map(|(player, role)| (player.id, role.kind()))
            .collect();
        assert_eq!(pairs, vec![(PlayerId(1), RoleKind::Wolf)]);

        let all = AliveFilter::new();
        assert!(world.alive_with_roles(&all).all(|(player, role)| player.role == role.kind()));
        assert_eq!(world.alive_with_roles(&all).count(), 5);
    }
}
