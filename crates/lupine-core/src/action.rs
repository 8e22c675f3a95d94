//! Typed player actions parsed from a verb and its raw argument.

use lupine_protocol::Verb;

use crate::GameError;

/// Everything a seated player can ask the game to do.
///
/// Player targets are seat numbers as typed by the player. `None` on
/// [`Action::Vote`] and [`Action::WolfKill`] means abstain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Vote(Option<u32>),
    SkipLastWords,
    RegisterSheriff,
    TransferSheriff(u32),
    DeclineTransfer,
    Support(u32),
    WolfDiscuss(String),
    EndSpeech,
    Guard(u32),
    HunterShoot(u32),
    SeerCheck(u32),
    WitchPoison(u32),
    WitchSave,
    WitchSkip,
    WolfKill(Option<u32>),
    WolfSelfDestruct,
}

impl Action {
    /// Interprets `raw` according to what `verb` expects.
    pub fn parse(verb: Verb, raw: &str) -> Result<Self, GameError> {
        let raw = raw.trim();
        Ok(match verb {
            Verb::Vote => Self::Vote(parse_optional_seat(raw)?),
            Verb::SkipLastWords => Self::SkipLastWords,
            Verb::ElectSheriff => Self::RegisterSheriff,
            Verb::TransferSheriff => Self::TransferSheriff(parse_seat(raw)?),
            Verb::DeclineTransfer => Self::DeclineTransfer,
            Verb::Support => Self::Support(parse_seat(raw)?),
            Verb::WolfDiscuss => {
                if raw.is_empty() {
                    return Err(GameError::InvalidArgument("nothing to say".into()));
                }
                Self::WolfDiscuss(raw.to_string())
            }
            Verb::EndSpeech => Self::EndSpeech,
            Verb::Guard => Self::Guard(parse_seat(raw)?),
            Verb::HunterShoot => Self::HunterShoot(parse_seat(raw)?),
            Verb::SeerCheck => Self::SeerCheck(parse_seat(raw)?),
            Verb::WitchPoison => Self::WitchPoison(parse_seat(raw)?),
            Verb::WitchSave => Self::WitchSave,
            Verb::WitchSkip => Self::WitchSkip,
            Verb::WolfKill => Self::WolfKill(parse_optional_seat(raw)?),
            Verb::WolfSuicide => Self::WolfSelfDestruct,
        })
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Vote(_) => "vote",
            Self::SkipLastWords => "skip-last-words",
            Self::RegisterSheriff => "register-sheriff",
            Self::TransferSheriff(_) => "transfer-sheriff",
            Self::DeclineTransfer => "decline-transfer",
            Self::Support(_) => "support",
            Self::WolfDiscuss(_) => "wolf-discuss",
            Self::EndSpeech => "end-speech",
            Self::Guard(_) => "guard",
            Self::HunterShoot(_) => "hunter-shoot",
            Self::SeerCheck(_) => "seer-check",
            Self::WitchPoison(_) => "witch-poison",
            Self::WitchSave => "witch-save",
            Self::WitchSkip => "witch-skip",
            Self::WolfKill(_) => "wolf-kill",
            Self::WolfSelfDestruct => "wolf-self-destruct",
        }
    }
}

/// A seat number, optionally written as `#3` or `3号`.
fn parse_seat(raw: &str) -> Result<u32, GameError> {
    let digits = raw
        .trim()
        .trim_start_matches('#')
        .trim_end_matches('号')
        .trim();
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => Err(GameError::InvalidArgument(format!(
            "expected a player number, got {raw:?}"
        ))),
        Ok(n) => Ok(n),
    }
}

/// Like [`parse_seat`] but empty, `0`, and `abstain` mean no target.
fn parse_optional_seat(raw: &str) -> Result<Option<u32>, GameError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "0" || trimmed.eq_ignore_ascii_case("abstain") {
        return Ok(None);
    }
    parse_seat(trimmed).map(Some)
}
