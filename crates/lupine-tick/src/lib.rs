//! One-shot deadline scheduler for Lupine.
//!
//! A werewolf table has no frame loop. It waits on players, and every wait
//! is bounded by a timer (speech, vote, night turn, last words). The timers
//! race against player input, so they live next to the command channel in
//! the table actor's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         fired = deadlines.wait_for_deadline() => {
//!             game.on_timer(fired.key);
//!         }
//!     }
//! }
//! ```
//!
//! # Cancel safety
//!
//! [`DeadlineScheduler::wait_for_deadline`] only mutates the table after its
//! sleep has completed. If `select!` drops the future because a command
//! arrived first, no deadline is lost.
//!
//! # Empty table
//!
//! With nothing armed, `wait_for_deadline` pends forever, which lets
//! `select!` keep serving the other branches.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

/// A deadline that woke later than this is reported with a warning.
const LATE_WARN_THRESHOLD: Duration = Duration::from_millis(250);

// ---------------------------------------------------------------------------
// Fired deadline (returned to caller)
// ---------------------------------------------------------------------------

/// A deadline that expired, returned by [`DeadlineScheduler::wait_for_deadline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<K> {
    /// The key the deadline was armed with.
    pub key: K,
    /// How late the wake-up was relative to the requested instant.
    pub late_by: Duration,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Counters for the deadline scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeadlineMetrics {
    /// Deadlines armed (including re-arms of an existing key).
    pub armed: u64,
    /// Re-arms that replaced a pending deadline for the same key.
    pub replaced: u64,
    /// Deadlines removed by [`DeadlineScheduler::cancel`] or [`DeadlineScheduler::clear`].
    pub cancelled: u64,
    /// Deadlines that fired.
    pub fired: u64,
    /// Fired deadlines whose wake-up exceeded the lateness threshold.
    pub late: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// A table of pending one-shot deadlines keyed by `K`.
///
/// One scheduler per table actor. Arming an existing key replaces its
/// deadline; each key fires at most once per arm.
pub struct DeadlineScheduler<K> {
    pending: HashMap<K, TokioInstant>,
    metrics: DeadlineMetrics,
}

impl<K> DeadlineScheduler<K>
where
    K: Copy + Eq + Hash + Debug,
{
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
            metrics: DeadlineMetrics::default(),
        }
    }

    /// Arms `key` to fire `after` from now, replacing any pending deadline
    /// for the same key.
    pub fn arm(&mut self, key: K, after: Duration) {
        let at = TokioInstant::now() + after;
        if self.pending.insert(key, at).is_some() {
            self.metrics.replaced += 1;
            debug!(?key, "deadline re-armed");
        }
        self.metrics.armed += 1;
        trace!(?key, after_ms = after.as_millis() as u64, "deadline armed");
    }

    /// Cancels a pending deadline. Returns `true` if one was removed.
    pub fn cancel(&mut self, key: &K) -> bool {
        let removed = self.pending.remove(key).is_some();
        if removed {
            self.metrics.cancelled += 1;
            trace!(?key, "deadline cancelled");
        }
        removed
    }

    /// Cancels every pending deadline.
    pub fn clear(&mut self) {
        let n = self.pending.len() as u64;
        self.pending.clear();
        self.metrics.cancelled += n;
        if n > 0 {
            debug!(cancelled = n, "all deadlines cleared");
        }
    }

    /// Waits for the earliest pending deadline and removes it.
    ///
    /// Pends forever while nothing is armed. Ties are broken arbitrarily;
    /// the other deadline fires on the next call.
    pub async fn wait_for_deadline(&mut self) -> Fired<K> {
        let Some((key, at)) = self.earliest() else {
            std::future::pending::<()>().await;
            unreachable!()
        };

        time::sleep_until(at).await;

        let late_by = TokioInstant::now().saturating_duration_since(at);
        self.pending.remove(&key);
        self.metrics.fired += 1;

        if late_by > LATE_WARN_THRESHOLD {
            self.metrics.late += 1;
            warn!(
                ?key,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "deadline fired late"
            );
        } else {
            trace!(?key, "deadline fired");
        }

        Fired { key, late_by }
    }

    /// Whether `key` has a pending deadline.
    pub fn is_armed(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    /// Time left until `key` fires, or `None` if it is not armed.
    pub fn remaining(&self, key: &K) -> Option<Duration> {
        self.pending
            .get(key)
            .map(|at| at.saturating_duration_since(TokioInstant::now()))
    }

    /// Number of pending deadlines.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is armed.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Snapshot of the counters.
    pub fn metrics(&self) -> &DeadlineMetrics {
        &self.metrics
    }

    fn earliest(&self) -> Option<(K, TokioInstant)> {
        self.pending
            .iter()
            .min_by_key(|(_, at)| **at)
            .map(|(key, at)| (*key, *at))
    }
}

impl<K> Default for DeadlineScheduler<K>
where
    K: Copy + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
