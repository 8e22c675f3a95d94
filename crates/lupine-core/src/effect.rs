//! Side effects requested by the game.
//!
//! The core never sends a message or sleeps. It queues [`Effect`]s and the
//! table actor executes them: notices go to the notification sink, timers go
//! to the deadline scheduler. When a timer fires the actor hands its
//! [`TimerId`] back to [`Game::on_timer`](crate::Game::on_timer).

use std::fmt;
use std::time::Duration;

use lupine_protocol::Recipient;
use serde::{Deserialize, Serialize};

use crate::Notice;

/// Identity of one phase occupancy.
///
/// Every time the game enters a phase it mints a fresh token. A timer
/// carrying an older token belongs to a phase that has already been left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhaseToken(pub u64);

impl fmt::Display for PhaseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "phase#{}", self.0)
    }
}

/// A timer armed by a phase: the occupancy it belongs to and a sequence
/// number local to that occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId {
    pub token: PhaseToken,
    pub seq: u32,
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/t{}", self.token, self.seq)
    }
}

/// One requested side effect.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Deliver a notice to the group or to one player.
    Notify { to: Recipient, notice: Notice },
    /// Call [`Game::on_timer`](crate::Game::on_timer) with `id` after `after`.
    ArmTimer { id: TimerId, after: Duration },
    /// Forget a previously armed timer.
    CancelTimer { id: TimerId },
}
