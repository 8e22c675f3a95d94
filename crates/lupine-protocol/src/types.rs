//! Core protocol types: identities, addressing, and the command vocabulary.
//!
//! Everything here is plain data. A chat adapter turns a message such as
//! `#vote 3` into a [`Command`]; the game crates turn notices back into
//! chat text. Neither direction lives in this crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A stable external identifier for a player (the chat account id).
///
/// Newtype wrapper so a `GroupId` can never be passed where a `PlayerId` is
/// expected. `#[serde(transparent)]` keeps the JSON form a plain number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Identifier of the chat group a table is bound to. One running game per
/// group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient: who should receive a notice?
// ---------------------------------------------------------------------------

/// Addressing for an outbound notice.
///
/// The game never formats transport payloads; it only says whether a notice
/// goes to the whole group or privately to one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Broadcast to the group the table is bound to.
    Group,

    /// Direct (private) message to one player.
    Player(PlayerId),
}

// ---------------------------------------------------------------------------
// Verb: the in-game command vocabulary
// ---------------------------------------------------------------------------

/// Every in-game verb a player can issue.
///
/// Serialized in kebab-case (`"transfer-sheriff"`) which is also the form
/// accepted by [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verb {
    /// Day vote: argument is a player number, or empty/`abstain` to abstain.
    Vote,
    SkipLastWords,
    /// Self-nomination during the sheriff election.
    ElectSheriff,
    TransferSheriff,
    DeclineTransfer,
    /// Sheriff election ballot for a registered candidate.
    Support,
    /// Private wolf team chat; the argument is free text.
    WolfDiscuss,
    EndSpeech,
    Guard,
    HunterShoot,
    SeerCheck,
    WitchPoison,
    WitchSave,
    WitchSkip,
    WolfKill,
    WolfSuicide,
}

impl Verb {
    /// All verbs, in declaration order.
    pub const ALL: [Verb; 16] = [
        Verb::Vote,
        Verb::SkipLastWords,
        Verb::ElectSheriff,
        Verb::TransferSheriff,
        Verb::DeclineTransfer,
        Verb::Support,
        Verb::WolfDiscuss,
        Verb::EndSpeech,
        Verb::Guard,
        Verb::HunterShoot,
        Verb::SeerCheck,
        Verb::WitchPoison,
        Verb::WitchSave,
        Verb::WitchSkip,
        Verb::WolfKill,
        Verb::WolfSuicide,
    ];

    /// The canonical kebab-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vote => "vote",
            Self::SkipLastWords => "skip-last-words",
            Self::ElectSheriff => "elect-sheriff",
            Self::TransferSheriff => "transfer-sheriff",
            Self::DeclineTransfer => "decline-transfer",
            Self::Support => "support",
            Self::WolfDiscuss => "wolf-discuss",
            Self::EndSpeech => "end-speech",
            Self::Guard => "guard",
            Self::HunterShoot => "hunter-shoot",
            Self::SeerCheck => "seer-check",
            Self::WitchPoison => "witch-poison",
            Self::WitchSave => "witch-save",
            Self::WitchSkip => "witch-skip",
            Self::WolfKill => "wolf-kill",
            Self::WolfSuicide => "wolf-suicide",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches('#').to_ascii_lowercase();
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str() == wanted)
            .ok_or_else(|| ProtocolError::UnknownVerb(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Command: what the router delivers
// ---------------------------------------------------------------------------

/// One routed player command: `(actor, group, verb, raw argument)`.
///
/// The argument stays raw here; interpreting it (player number, free text)
/// is the game's job because only the game knows what the verb expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub actor: PlayerId,
    pub group: GroupId,
    pub verb: Verb,
    #[serde(default)]
    pub argument: String,
}

impl Command {
    /// Parses a text line of the form `verb [argument...]`.
    ///
    /// ```rust
    /// use lupine_protocol::{Command, GroupId, PlayerId, Verb};
    ///
    /// let cmd = Command::parse_line(PlayerId(1), GroupId(2), "#wolf-discuss bite 4 tonight").unwrap();
    /// assert_eq!(cmd.verb, Verb::WolfDiscuss);
    /// assert_eq!(cmd.argument, "bite 4 tonight");
    /// ```
    pub fn parse_line(actor: PlayerId, group: GroupId, line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ProtocolError::InvalidCommand("empty command".into()));
        }
        let (verb, argument) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        Ok(Self {
            actor,
            group,
            verb: verb.parse()?,
            argument: argument.to_string(),
        })
    }
}

// ===========================================================================
// Tests
// ===========================================================================
