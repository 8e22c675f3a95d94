//! The game orchestrator.
//!
//! [`Game`] owns the [`World`] and the single current [`Phase`]. Every player
//! action and every timer firing enters through here, is checked against the
//! actor and the phase, and is then delegated to the phase. Phase changes are
//! performed only by [`Game`], one at a time.

use std::collections::{HashMap, VecDeque};

use lupine_protocol::{PlayerId, Verb};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::phases::{GameOverPhase, NightPhase, Phase, PhaseKind, Transition, TransferPhase};
use crate::world::World;
use crate::{
    Action, Effect, GameConfig, GameError, Notice, Outcome, PhaseToken, Player, PlayerProfile,
    Role, RoleKind, Roster, TimerId,
};

/// How many past phases [`Game::history`] remembers.
const HISTORY_LIMIT: usize = 50;

/// One running game at one table.
pub struct Game {
    phase: Phase,
    world: World,
    history: VecDeque<PhaseKind>,
    transitioning: bool,
    next_token: u64,
}

impl Game {
    /// Seats `profiles` in order with `roles[i]` going to `profiles[i]` and
    /// enters the first night.
    ///
    /// # Errors
    /// - [`GameError::RosterTooSmall`] / [`GameError::RosterFull`] if the
    ///   player count is outside the configured range.
    /// - [`GameError::NoRoleTable`] if `roles` does not have one entry per
    ///   player.
    /// - [`GameError::DuplicatePlayer`] if a profile id repeats.
    pub fn new(config: GameConfig, profiles: Vec<PlayerProfile>, roles: Vec<RoleKind>) -> Result<Self, GameError> {
        Self::build(config, profiles, roles, StdRng::from_os_rng())
    }

    /// Like [`Game::new`] with a fixed seed for the speech-order shuffle.
    pub fn with_seed(
        config: GameConfig,
        profiles: Vec<PlayerProfile>,
        roles: Vec<RoleKind>,
        seed: u64,
    ) -> Result<Self, GameError> {
        Self::build(config, profiles, roles, StdRng::seed_from_u64(seed))
    }

    fn build(
        config: GameConfig,
        profiles: Vec<PlayerProfile>,
        roles: Vec<RoleKind>,
        rng: StdRng,
    ) -> Result<Self, GameError> {
        let config = config.validated();
        let count = profiles.len();
        if count < config.min_players {
            return Err(GameError::RosterTooSmall {
                have: count,
                need: config.min_players,
            });
        }
        if count > config.max_players {
            return Err(GameError::RosterFull(config.max_players));
        }
        if roles.len() != count {
            return Err(GameError::NoRoleTable(count));
        }

        let mut roster = Roster::new(count);
        for (profile, role) in profiles.iter().zip(&roles) {
            roster.add_player(profile, *role)?;
        }
        roster.assign_numbers();
        let bindings: HashMap<PlayerId, Role> = roster.iter().map(|p| (p.id, Role::new(p.role))).collect();

        let mut game = Self {
            phase: NightPhase::new(0).into(),
            world: World::new(roster, bindings, config, rng),
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            transitioning: false,
            next_token: 0,
        };
        game.announce_roles();
        info!(players = count, "game started");
        game.begin();
        Ok(game)
    }

    fn announce_roles(&mut self) {
        let players = self.world.roster.iter().map(Player::seat).collect();
        self.world.broadcast(Notice::GameStarted { players });
        let assignments: Vec<_> = self
            .world
            .roster
            .iter()
            .map(|p| (p.id, p.seat(), p.role))
            .collect();
        for (id, seat, role) in assignments {
            self.world.direct(id, Notice::RoleAssigned { seat, role });
        }
    }

    // -- transitions --------------------------------------------------------

    /// Enters the phase installed at construction.
    fn begin(&mut self) {
        self.transitioning = true;
        self.stamp();
        self.run_entry();
        self.transitioning = false;
    }

    /// Leaves the current phase and enters `next`.
    ///
    /// A request made while another transition is in flight is dropped.
    fn change_state(&mut self, next: Phase) {
        if self.transitioning {
            warn!(
                current = %self.phase.kind(),
                requested = %next.kind(),
                "transition already in progress, dropping request"
            );
            return;
        }
        self.transitioning = true;
        let next = self.wrap(next);
        self.phase.state_mut().on_exit(&mut self.world);
        self.swap_in(next);
        self.run_entry();
        self.transitioning = false;
    }

    /// Runs `on_enter` on the current phase, following any phases it
    /// immediately hands over to.
    fn run_entry(&mut self) {
        loop {
            let Transition::Goto(next) = self.phase.state_mut().on_enter(&mut self.world) else {
                return;
            };
            let next = self.wrap(*next);
            self.phase.state_mut().on_exit(&mut self.world);
            self.swap_in(next);
        }
    }

    /// Applies game-level overrides to a requested phase: a decided game
    /// ends, and a dead sheriff's transfer runs before anything else.
    fn wrap(&mut self, next: Phase) -> Phase {
        if next.kind() == PhaseKind::GameOver {
            return next;
        }
        if let Some(outcome) = self.world.outcome {
            self.world.pending_transfers.clear();
            return GameOverPhase::new(outcome).into();
        }
        match self.world.pending_transfers.pop_front() {
            Some(sheriff) => TransferPhase::new(sheriff, next).into(),
            None => next,
        }
    }

    fn swap_in(&mut self, next: Phase) {
        let from = self.phase.kind();
        self.phase = next;
        self.stamp();
        info!(%from, to = %self.phase.kind(), token = %self.world.token, "phase changed");
    }

    /// Mints a token for the phase just installed and records it.
    fn stamp(&mut self) {
        self.next_token += 1;
        self.world.token = PhaseToken(self.next_token);
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(self.phase.kind());
    }

    fn settle(&mut self, transition: Transition) {
        match transition {
            Transition::Goto(next) => self.change_state(*next),
            Transition::Stay => {
                if let Some(outcome) = self.world.outcome {
                    if self.phase.kind() != PhaseKind::GameOver {
                        self.change_state(GameOverPhase::new(outcome).into());
                    }
                }
            }
        }
    }

    // -- entry points -------------------------------------------------------

    /// Applies one typed action from `actor`.
    ///
    /// On error nothing has changed; the caller decides how to tell the
    /// player (see [`Game::submit`]).
    pub fn handle_action(&mut self, actor: PlayerId, action: Action) -> Result<(), GameError> {
        if !self.world.roster.contains(actor) {
            return Err(GameError::NotParticipant(actor));
        }
        if self.is_finished() {
            return Err(GameError::GameFinished);
        }
        if let Action::WolfDiscuss(text) = &action {
            return self.world.wolf_chat(actor, text);
        }
        if !self.world.roster.is_alive(actor) && !self.phase.state().admits_dead(actor) {
            return Err(GameError::IllegalPhase("dead players cannot act".into()));
        }

        let transition = self
            .phase
            .state_mut()
            .handle_action(&mut self.world, actor, &action)?;
        debug!(player = %actor, action = action.name(), phase = %self.phase.kind(), "action applied");
        self.settle(transition);
        Ok(())
    }

    /// Parses and applies a raw command. A failure is also sent to the actor
    /// as a [`Notice::Rejected`].
    pub fn submit(&mut self, actor: PlayerId, verb: Verb, raw: &str) -> Result<(), GameError> {
        let result = Action::parse(verb, raw).and_then(|action| self.handle_action(actor, action));
        if let Err(err) = &result {
            debug!(player = %actor, %verb, error = %err, "action rejected");
            self.world.direct(
                actor,
                Notice::Rejected {
                    reason: err.to_string(),
                },
            );
        }
        result
    }

    /// Delivers a fired timer. Timers from phases already left are ignored.
    pub fn on_timer(&mut self, id: TimerId) {
        if id.token != self.world.token {
            debug!(timer = %id, current = %self.world.token, "stale timer ignored");
            return;
        }
        match self.phase.state_mut().on_timeout(&mut self.world, id.seq) {
            Some(transition) => self.settle(transition),
            None => debug!(timer = %id, "timer no longer awaited"),
        }
    }

    /// Drains the effects queued since the last call.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        self.world.take_effects()
    }

    // -- accessors ----------------------------------------------------------

    pub fn phase_kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Current day/night cycle; 0 is the first night.
    pub fn turn(&self) -> u32 {
        self.world.turn
    }

    pub fn token(&self) -> PhaseToken {
        self.world.token
    }

    pub fn roster(&self) -> &Roster {
        &self.world.roster
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.world.roster.get(id)
    }

    pub fn role(&self, id: PlayerId) -> Option<&Role> {
        self.world.roles.get(&id)
    }

    pub fn config(&self) -> &GameConfig {
        &self.world.config
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.world.outcome
    }

    /// Phases entered, oldest first, capped at the last 50.
    pub fn history(&self) -> impl Iterator<Item = PhaseKind> + '_ {
        self.history.iter().copied()
    }

    pub fn is_finished(&self) -> bool {
        self.phase.kind() == PhaseKind::GameOver
    }
}
