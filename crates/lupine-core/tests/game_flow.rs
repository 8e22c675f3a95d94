//! Whole-game flows driven through the public `Game` API.
//!
//! The harness plays the part of the table actor: it drains effects after
//! every step, keeps the set of armed timers, and fires the newest one when
//! a test wants a deadline to pass.

use lupine_core::{
    Action, DeathReason, Effect, Game, GameConfig, GameError, Notice, PhaseKind, PlayerProfile,
    RoleKind, RuleConfig, TimerId, VoteVerdict, Winner,
};
use lupine_protocol::{PlayerId, Recipient};

struct Harness {
    game: Game,
    timers: Vec<TimerId>,
    notices: Vec<(Recipient, Notice)>,
}

impl Harness {
    fn new(roles: &[RoleKind], config: GameConfig) -> Self {
        let profiles = (1..=roles.len() as u64)
            .map(|i| PlayerProfile::new(PlayerId(i)).with_nickname(format!("p{i}")))
            .collect();
        let game = Game::with_seed(config, profiles, roles.to_vec(), 42).unwrap();
        let mut harness = Self {
            game,
            timers: Vec::new(),
            notices: Vec::new(),
        };
        harness.pump();
        harness
    }

    fn pump(&mut self) {
        for effect in self.game.take_effects() {
            match effect {
                Effect::ArmTimer { id, .. } => self.timers.push(id),
                Effect::CancelTimer { id } => self.timers.retain(|t| *t != id),
                Effect::Notify { to, notice } => self.notices.push((to, notice)),
            }
        }
    }

    /// Lets the newest armed deadline pass.
    fn expire(&mut self) {
        let id = self.timers.pop().expect("no timer armed");
        self.game.on_timer(id);
        self.pump();
    }

    fn act(&mut self, actor: u64, action: Action) {
        if let Err(err) = self.game.handle_action(PlayerId(actor), action.clone()) {
            panic!("player {actor} could not {action:?}: {err}");
        }
        self.pump();
    }

    fn try_act(&mut self, actor: u64, action: Action) -> Result<(), GameError> {
        let result = self.game.handle_action(PlayerId(actor), action);
        self.pump();
        result
    }

    fn phase(&self) -> PhaseKind {
        self.game.phase_kind()
    }

    fn group(&self) -> impl Iterator<Item = &Notice> {
        self.notices
            .iter()
            .filter(|(to, _)| *to == Recipient::Group)
            .map(|(_, n)| n)
    }

    fn death(&self, id: u64) -> Option<DeathReason> {
        self.game.player(PlayerId(id)).and_then(|p| p.death)
    }

    fn sheriffs(&self) -> Vec<u64> {
        self.game
            .roster()
            .iter()
            .filter(|p| p.sheriff)
            .map(|p| p.id.0)
            .collect()
    }

    /// Ends every speech of the current day in order.
    fn talk_through_day(&mut self) {
        while self.phase() == PhaseKind::Day {
            let speaker = match self.game.phase() {
                lupine_core::Phase::Day(day) => day.speaker().expect("a speaker is up"),
                _ => unreachable!(),
            };
            self.act(speaker.0, Action::EndSpeech);
        }
    }
}

const SIX: [RoleKind; 6] = [
    RoleKind::Wolf,
    RoleKind::Wolf,
    RoleKind::Guard,
    RoleKind::Seer,
    RoleKind::Witch,
    RoleKind::Villager,
];

fn no_election() -> GameConfig {
    GameConfig {
        rules: RuleConfig {
            sheriff_election: false,
            ..RuleConfig::default()
        },
        ..GameConfig::default()
    }
}

#[test]
fn test_first_night_kill_then_sheriff_election() {
    let mut table = Harness::new(&SIX, GameConfig::default());
    assert_eq!(table.phase(), PhaseKind::Night);

    table.expire(); // guard
    table.expire(); // seer
    table.act(1, Action::WolfKill(Some(3)));
    table.act(2, Action::WolfKill(Some(3)));
    assert!(table.game.player(PlayerId(3)).unwrap().alive, "kill waits for dawn");
    table.expire(); // witch

    assert_eq!(table.death(3), Some(DeathReason::WolfKill));
    assert_eq!(table.phase(), PhaseKind::SheriffElection);
    assert_eq!(table.game.turn(), 0);
    assert!(table.group().any(|n| matches!(
        n,
        Notice::Dawn { turn: 0, deaths } if deaths.len() == 1 && deaths[0].number == 3
    )));
}

#[test]
fn test_tied_exile_vote_goes_straight_to_night() {
    let mut table = Harness::new(&SIX, no_election());
    while table.phase() == PhaseKind::Night {
        table.expire();
    }
    assert_eq!(table.game.roster().living_count(), 6, "wolves abstained");
    table.talk_through_day();
    assert_eq!(table.phase(), PhaseKind::Vote);

    for voter in [1, 2, 3] {
        table.act(voter, Action::Vote(Some(4)));
    }
    for voter in [4, 5, 6] {
        table.act(voter, Action::Vote(Some(1)));
    }

    assert_eq!(table.phase(), PhaseKind::Night);
    assert_eq!(table.game.turn(), 1);
    assert_eq!(table.game.roster().living_count(), 6);
    assert!(table.group().any(|n| matches!(
        n,
        Notice::VoteResult { verdict: VoteVerdict::Tie, .. }
    )));
}

#[test]
fn test_exiled_sheriff_hands_over_before_last_words() {
    let mut table = Harness::new(&SIX, GameConfig::default());
    table.expire();
    table.expire();
    table.act(1, Action::WolfKill(Some(6)));
    table.act(2, Action::WolfKill(Some(6)));
    table.expire();
    assert_eq!(table.phase(), PhaseKind::SheriffElection);

    table.act(3, Action::RegisterSheriff);
    table.expire(); // registration closes
    table.act(3, Action::EndSpeech);
    for voter in 1..=5 {
        table.act(voter, Action::Support(3));
    }
    assert_eq!(table.sheriffs(), vec![3]);

    // the first day opens with the night victim's last words
    assert_eq!(table.phase(), PhaseKind::LastWords);
    table.act(6, Action::SkipLastWords);
    table.talk_through_day();

    for voter in [1, 2, 4, 5] {
        table.act(voter, Action::Vote(Some(3)));
    }
    table.act(3, Action::Vote(Some(1)));
    assert_eq!(table.death(3), Some(DeathReason::Exile));
    assert_eq!(table.game.roster().living_count(), 4);
    assert_eq!(table.phase(), PhaseKind::SheriffTransfer);

    // only the outgoing sheriff may act, even though they are dead
    assert!(table.try_act(4, Action::TransferSheriff(5)).is_err());
    table.act(3, Action::TransferSheriff(4));
    assert_eq!(table.sheriffs(), vec![4]);
    let transfers = table
        .group()
        .filter(|n| matches!(n, Notice::SheriffTransferred { .. }))
        .count();
    assert_eq!(transfers, 1);

    assert_eq!(table.phase(), PhaseKind::LastWords);
    table.act(3, Action::SkipLastWords);
    assert_eq!(table.phase(), PhaseKind::Night);
    assert_eq!(table.game.turn(), 1);
    assert_eq!(table.sheriffs(), vec![4]);
}

#[test]
fn test_guarded_or_saved_victims_survive() {
    let mut table = Harness::new(&SIX, no_election());
    table.act(3, Action::Guard(6));
    table.expire(); // seer
    table.act(1, Action::WolfKill(Some(6)));
    table.act(2, Action::WolfKill(Some(6)));
    table.act(5, Action::WitchSkip);
    assert_eq!(table.phase(), PhaseKind::Day);
    assert_eq!(table.death(6), None);

    table.talk_through_day();
    for voter in 1..=6 {
        table.act(voter, Action::Vote(None));
    }
    assert_eq!(table.phase(), PhaseKind::Night);

    // night 1: the guard may not repeat, the witch saves instead
    assert!(matches!(
        table.try_act(3, Action::Guard(6)),
        Err(GameError::IllegalTarget(_))
    ));
    table.act(3, Action::Guard(4));
    table.expire();
    table.act(1, Action::WolfKill(Some(6)));
    table.act(2, Action::WolfKill(Some(6)));
    table.act(5, Action::WitchSave);
    assert_eq!(table.death(6), None);
    assert!(table.group().any(|n| matches!(n, Notice::Dawn { turn: 1, deaths } if deaths.is_empty())));
}

#[test]
fn test_exiled_hunter_takes_a_wolf_along() {
    let seven = [
        RoleKind::Wolf,
        RoleKind::Wolf,
        RoleKind::Guard,
        RoleKind::Seer,
        RoleKind::Witch,
        RoleKind::Hunter,
        RoleKind::Villager,
    ];
    let mut table = Harness::new(&seven, no_election());
    while table.phase() == PhaseKind::Night {
        table.expire();
    }
    table.talk_through_day();
    for voter in 1..=7 {
        table.act(voter, Action::Vote(Some(6)));
    }
    assert_eq!(table.phase(), PhaseKind::LastWords);
    table.expire();
    assert_eq!(table.phase(), PhaseKind::HunterShot);

    table.act(6, Action::HunterShoot(1));
    assert_eq!(table.death(1), Some(DeathReason::HunterShot));
    assert_eq!(table.phase(), PhaseKind::Night);
    assert_eq!(table.game.turn(), 1);
}

#[test]
fn test_last_wolf_exiled_ends_the_game() {
    let roles = [
        RoleKind::Wolf,
        RoleKind::Guard,
        RoleKind::Seer,
        RoleKind::Witch,
        RoleKind::Villager,
        RoleKind::Villager,
    ];
    let mut table = Harness::new(&roles, no_election());
    while table.phase() == PhaseKind::Night {
        table.expire();
    }
    table.talk_through_day();
    for voter in 1..=6 {
        table.act(voter, Action::Vote(Some(1)));
    }

    assert_eq!(table.phase(), PhaseKind::GameOver);
    assert_eq!(table.game.outcome().map(|o| o.winner), Some(Winner::Good));
    assert!(table.timers.is_empty(), "no deadline outlives the game");
    let reveal = table
        .group()
        .find_map(|n| match n {
            Notice::GameOver { reveal, .. } => Some(reveal.clone()),
            _ => None,
        })
        .expect("game over announced");
    assert_eq!(reveal.len(), 6);
    assert_eq!(
        table.try_act(2, Action::EndSpeech),
        Err(GameError::GameFinished)
    );
}

#[test]
fn test_lone_wolf_decides_alone() {
    let roles = [
        RoleKind::Wolf,
        RoleKind::Guard,
        RoleKind::Seer,
        RoleKind::Witch,
        RoleKind::Villager,
        RoleKind::Villager,
    ];
    let mut table = Harness::new(&roles, no_election());
    table.expire();
    table.expire();
    table.act(1, Action::WolfKill(Some(5)));
    table.act(4, Action::WitchSkip);
    assert_eq!(table.death(5), Some(DeathReason::WolfKill));
}

#[test]
fn test_sheriff_ballot_breaks_an_even_split() {
    let mut table = Harness::new(&SIX, GameConfig::default());
    while table.phase() == PhaseKind::Night {
        table.expire();
    }
    table.act(4, Action::RegisterSheriff);
    table.expire();
    table.act(4, Action::EndSpeech);
    for voter in 1..=6 {
        table.act(voter, Action::Vote(Some(4)));
    }
    assert_eq!(table.sheriffs(), vec![4]);
    assert_eq!(table.phase(), PhaseKind::Day);
    table.talk_through_day();

    // 4 (sheriff, 1.5) and 5 vote for #1; 2 and 3 vote for #2: 2.5 vs 2.0
    table.act(4, Action::Vote(Some(1)));
    table.act(5, Action::Vote(Some(1)));
    table.act(2, Action::Vote(Some(2)));
    table.act(3, Action::Vote(Some(2)));
    table.act(1, Action::Vote(None));
    table.act(6, Action::Vote(None));
    assert_eq!(table.death(1), Some(DeathReason::Exile));
    assert!(table.group().any(|n| matches!(
        n,
        Notice::VoteResult { tally, verdict: VoteVerdict::Exiled(seat) }
            if seat.number == 1 && tally[0].weight == 2.5
    )));
}
