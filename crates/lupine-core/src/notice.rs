//! Typed notices the game sends to the group or to single players.
//!
//! A notice is data, not chat markup. The `Display` impl renders a plain
//! English line that a console or a minimal adapter can print as is; richer
//! adapters match on the variant and render their own format.

use std::fmt;

use lupine_protocol::PlayerId;
use serde::{Deserialize, Serialize};

use crate::roster::UNKNOWN_PLAYER;
use crate::{Camp, DeathReason, NoKillReason, RoleKind};

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// A player as shown in notices: seat number and display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: PlayerId,
    pub number: u32,
    pub name: String,
}

impl Seat {
    /// Placeholder for an id missing from the roster.
    pub fn unknown(id: PlayerId) -> Self {
        Self {
            id,
            number: 0,
            name: UNKNOWN_PLAYER.to_string(),
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.number, self.name)
    }
}

/// One row of a vote tally. `weight` is the weighted vote total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteLine {
    pub target: Seat,
    pub weight: f64,
    pub voters: Vec<Seat>,
}

/// Result of a day vote as announced to the group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VoteVerdict {
    Exiled(Seat),
    Tie,
    BelowMinimum,
}

/// Which side won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Good,
    Wolves,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinReason {
    /// No wolf is alive.
    WolvesEliminated,
    /// Neither good camp has a living member.
    GoodEliminated,
    /// One good camp was wiped out (camp-sweep rule).
    CampSwept(Camp),
}

/// Final result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub winner: Winner,
    pub reason: WinReason,
}

/// One line of the end-of-game role reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reveal {
    pub seat: Seat,
    pub role: RoleKind,
    pub alive: bool,
    pub sheriff: bool,
}

// ---------------------------------------------------------------------------
// Notice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Notice {
    // -- lifecycle ----------------------------------------------------------
    GameStarted { players: Vec<Seat> },
    RoleAssigned { seat: Seat, role: RoleKind },
    GameOver { outcome: Outcome, reveal: Vec<Reveal> },

    // -- night --------------------------------------------------------------
    NightFalls { turn: u32 },
    GuardPrompt { targets: Vec<Seat>, blocked: Option<Seat>, secs: u64 },
    SeerPrompt { targets: Vec<Seat>, secs: u64 },
    WolfPrompt { targets: Vec<Seat>, pack: Vec<Seat>, secs: u64 },
    WitchPrompt {
        victim: Option<Seat>,
        antidote: bool,
        poison: bool,
        targets: Vec<Seat>,
        secs: u64,
    },
    /// Shown to roles with nothing to do.
    Wait { role: RoleKind },
    SeerResult { target: Seat, is_wolf: bool },
    WolfVoteCast { voter: Seat, target: Option<Seat> },
    WolfKillChosen { target: Seat },
    WolfNoKill { reason: NoKillReason },
    /// Dawn report. An empty list is a peaceful night.
    Dawn { turn: u32, deaths: Vec<Seat> },

    // -- day ----------------------------------------------------------------
    DayBegins { turn: u32, order: Vec<Seat> },
    SpeakerUp { speaker: Seat, secs: u64 },
    SpeechTimedOut { speaker: Seat },
    VoteOpen { candidates: Vec<Seat>, secs: u64 },
    VoteResult { tally: Vec<VoteLine>, verdict: VoteVerdict },
    PlayerDied { player: Seat, reason: DeathReason },
    LastWords { speaker: Seat, secs: u64 },
    HunterPrompt { targets: Vec<Seat>, secs: u64 },
    HunterFired { hunter: Seat, target: Seat },
    WolfSelfDestructed { wolf: Seat },

    // -- sheriff ------------------------------------------------------------
    SheriffRegistration { secs: u64 },
    SheriffCandidate { candidate: Seat },
    NoSheriffCandidates,
    SheriffSpeech { speaker: Seat, secs: u64 },
    SheriffVoteOpen { candidates: Vec<Seat>, secs: u64 },
    SheriffElected { sheriff: Option<Seat>, tally: Vec<VoteLine> },
    SheriffTransferPending { sheriff: Seat, secs: u64 },
    SheriffTransferPrompt { targets: Vec<Seat>, secs: u64 },
    SheriffTransferred { from: Seat, to: Seat },
    SheriffTitleDropped { from: Seat },

    // -- misc ---------------------------------------------------------------
    WolfChat { from: Seat, text: String },
    Accepted { detail: String },
    Rejected { reason: String },
}

fn seat_list(seats: &[Seat]) -> String {
    if seats.is_empty() {
        return "nobody".to_string();
    }
    seats
        .iter()
        .map(Seat::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn tally_lines(tally: &[VoteLine]) -> String {
    tally
        .iter()
        .map(|line| format!("{} ({})", line.target, line.weight))
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GameStarted { players } => {
                write!(f, "The game begins with {} players: {}", players.len(), seat_list(players))
            }
            Self::RoleAssigned { seat, role } => write!(f, "You are {seat}. Your role: {role}"),
            Self::GameOver { outcome, reveal } => {
                let side = match outcome.winner {
                    Winner::Good => "The good side",
                    Winner::Wolves => "The wolves",
                };
                write!(f, "Game over. {side} win")?;
                match outcome.reason {
                    WinReason::WolvesEliminated => write!(f, " (every wolf is dead).")?,
                    WinReason::GoodEliminated => write!(f, " (the good side is wiped out).")?,
                    WinReason::CampSwept(camp) => write!(f, " (no {camp} left alive).")?,
                }
                for line in reveal {
                    let status = if line.alive { "alive" } else { "dead" };
                    write!(f, "\n  {} {} [{status}]", line.seat, line.role)?;
                    if line.sheriff {
                        write!(f, " sheriff")?;
                    }
                }
                Ok(())
            }
            Self::NightFalls { turn } => write!(f, "Night {} falls. Everyone close your eyes.", turn + 1),
            Self::GuardPrompt { targets, blocked, secs } => {
                write!(f, "Guard, choose someone to protect ({secs}s): {}", seat_list(targets))?;
                if let Some(blocked) = blocked {
                    write!(f, ". You cannot protect {blocked} again tonight")?;
                }
                Ok(())
            }
            Self::SeerPrompt { targets, secs } => {
                write!(f, "Seer, choose someone to check ({secs}s): {}", seat_list(targets))
            }
            Self::WolfPrompt { targets, pack, secs } => write!(
                f,
                "Wolves ({}), vote for tonight's victim ({secs}s): {}",
                seat_list(pack),
                seat_list(targets)
            ),
            Self::WitchPrompt { victim, antidote, poison, targets, secs } => {
                match victim {
                    Some(victim) => write!(f, "Witch, {victim} was attacked tonight.")?,
                    None => write!(f, "Witch, nobody was attacked tonight.")?,
                }
                write!(f, " Antidote: {}.", if *antidote { "available" } else { "used" })?;
                write!(f, " Poison: {}.", if *poison { "available" } else { "used" })?;
                write!(f, " You have {secs}s. Poison targets: {}", seat_list(targets))
            }
            Self::Wait { role } => write!(f, "You are the {role}. Nothing to do tonight, please wait."),
            Self::SeerResult { target, is_wolf } => {
                let verdict = if *is_wolf { "a wolf" } else { "not a wolf" };
                write!(f, "{target} is {verdict}.")
            }
            Self::WolfVoteCast { voter, target } => match target {
                Some(target) => write!(f, "{voter} votes to kill {target}."),
                None => write!(f, "{voter} abstains."),
            },
            Self::WolfKillChosen { target } => write!(f, "The pack has chosen {target}."),
            Self::WolfNoKill { reason } => match reason {
                NoKillReason::Tie => write!(f, "The pack is split. Nobody is attacked tonight."),
                NoKillReason::Abstained => write!(f, "The pack abstains. Nobody is attacked tonight."),
            },
            Self::Dawn { turn, deaths } => {
                if deaths.is_empty() {
                    write!(f, "Day {} dawns. It was a peaceful night.", turn + 1)
                } else {
                    write!(f, "Day {} dawns. Last night {} died.", turn + 1, seat_list(deaths))
                }
            }
            Self::DayBegins { turn, order } => {
                write!(f, "Day {} discussion. Speaking order: {}", turn + 1, seat_list(order))
            }
            Self::SpeakerUp { speaker, secs } => write!(f, "{speaker}, you have the floor ({secs}s)."),
            Self::SpeechTimedOut { speaker } => write!(f, "{speaker} ran out of time."),
            Self::VoteOpen { candidates, secs } => {
                write!(f, "Vote to exile ({secs}s). Candidates: {}", seat_list(candidates))
            }
            Self::VoteResult { tally, verdict } => {
                write!(f, "Votes: {}. ", tally_lines(tally))?;
                match verdict {
                    VoteVerdict::Exiled(seat) => write!(f, "{seat} is exiled."),
                    VoteVerdict::Tie => write!(f, "Tie, nobody is exiled."),
                    VoteVerdict::BelowMinimum => write!(f, "Not enough votes, nobody is exiled."),
                }
            }
            Self::PlayerDied { player, reason } => write!(f, "{player} {reason}."),
            Self::LastWords { speaker, secs } => write!(f, "{speaker}, your last words ({secs}s)."),
            Self::HunterPrompt { targets, secs } => {
                write!(f, "Hunter, you may shoot one player ({secs}s): {}", seat_list(targets))
            }
            Self::HunterFired { hunter, target } => write!(f, "{hunter} is the hunter and shoots {target}."),
            Self::WolfSelfDestructed { wolf } => {
                write!(f, "{wolf} reveals as a wolf and self-destructs. Night falls early.")
            }
            Self::SheriffRegistration { secs } => {
                write!(f, "Sheriff election: register within {secs}s.")
            }
            Self::SheriffCandidate { candidate } => write!(f, "{candidate} runs for sheriff."),
            Self::NoSheriffCandidates => write!(f, "Nobody ran for sheriff."),
            Self::SheriffSpeech { speaker, secs } => {
                write!(f, "Candidate {speaker}, make your case ({secs}s).")
            }
            Self::SheriffVoteOpen { candidates, secs } => {
                write!(f, "Elect a sheriff ({secs}s). Candidates: {}", seat_list(candidates))
            }
            Self::SheriffElected { sheriff, tally } => {
                if !tally.is_empty() {
                    write!(f, "Votes: {}. ", tally_lines(tally))?;
                }
                match sheriff {
                    Some(seat) => write!(f, "{seat} is the new sheriff."),
                    None => write!(f, "No sheriff was elected."),
                }
            }
            Self::SheriffTransferPending { sheriff, secs } => {
                write!(f, "Sheriff {sheriff} has died and may pass the badge ({secs}s).")
            }
            Self::SheriffTransferPrompt { targets, secs } => {
                write!(f, "Pass the badge or tear it up ({secs}s): {}", seat_list(targets))
            }
            Self::SheriffTransferred { from, to } => write!(f, "{from} passes the badge to {to}."),
            Self::SheriffTitleDropped { from } => write!(f, "{from} tears up the badge. There is no sheriff."),
            Self::WolfChat { from, text } => write!(f, "[pack] {from}: {text}"),
            Self::Accepted { detail } => write!(f, "OK: {detail}"),
            Self::Rejected { reason } => write!(f, "Rejected: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(n: u32, name: &str) -> Seat {
        Seat {
            id: PlayerId(n as u64),
            number: n,
            name: name.into(),
        }
    }

    #[test]
    fn test_dawn_peaceful_and_deaths() {
        let quiet = Notice::Dawn { turn: 0, deaths: vec![] };
        assert_eq!(quiet.to_string(), "Day 1 dawns. It was a peaceful night.");

        let deaths = Notice::Dawn {
            turn: 1,
            deaths: vec![seat(3, "carol")],
        };
        assert_eq!(deaths.to_string(), "Day 2 dawns. Last night #3 carol died.");
    }

    #[test]
    fn test_no_kill_reasons_are_worded_differently() {
        let tie = Notice::WolfNoKill { reason: NoKillReason::Tie }.to_string();
        let abstain = Notice::WolfNoKill { reason: NoKillReason::Abstained }.to_string();
        assert_ne!(tie, abstain);
    }

    #[test]
    fn test_notice_json_is_tagged() {
        let json = serde_json::to_value(Notice::SeerResult {
            target: seat(2, "bob"),
            is_wolf: true,
        })
        .unwrap();
        assert_eq!(json["kind"], "seer-result");
        assert_eq!(json["target"]["number"], 2);
    }
}
