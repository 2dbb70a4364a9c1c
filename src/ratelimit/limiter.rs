//! Core sliding-window rate limiter implementation.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};
use super::rules::ActionLimit;
use super::window::SlidingWindow;

/// Default cap on the number of distinct keys tracked at once.
pub const DEFAULT_MAX_TRACKED_KEYS: usize = 10_000;

/// Outcome of a single rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    /// Whether the attempt was admitted and recorded
    pub allowed: bool,
    /// Admissions left in the current window after this check
    pub remaining: u32,
    /// Milliseconds until another attempt could be admitted; 0 while a slot
    /// is still free, non-zero once this check took the last one
    pub retry_after_ms: u64,
}

/// Sliding-window rate limiter keyed by opaque action keys.
///
/// Each key owns a [`SlidingWindow`] of recent attempt timestamps. The
/// read-prune-compare-append sequence for a key runs under that key's map
/// shard lock, so concurrent checks on one key are serialized while distinct
/// keys proceed independently.
///
/// This struct is thread-safe and can be shared across multiple tasks.
pub struct RateLimiter {
    /// Attempt windows indexed by key
    windows: DashMap<String, SlidingWindow>,
    /// Time source
    clock: Arc<dyn Clock>,
    /// Soft cap on tracked keys; 0 disables the cap
    max_tracked_keys: usize,
}

impl RateLimiter {
    /// Create a new rate limiter on the wall clock with the default key cap.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a new rate limiter driven by the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: DashMap::new(),
            clock,
            max_tracked_keys: DEFAULT_MAX_TRACKED_KEYS,
        }
    }

    /// Set the cap on distinct tracked keys (0 for unbounded).
    pub fn with_max_tracked_keys(mut self, max_tracked_keys: usize) -> Self {
        self.max_tracked_keys = max_tracked_keys;
        self
    }

    /// Admit or deny one attempt for `key` under `max_attempts` per
    /// `window_ms`, recording the attempt when admitted.
    pub fn is_allowed(&self, key: &str, max_attempts: u32, window_ms: u64) -> bool {
        self.check(key, &ActionLimit::new(max_attempts, window_ms))
            .allowed
    }

    /// Check the rate limit for a key.
    ///
    /// Expired timestamps are pruned on every call, admitted or not.
    pub fn check(&self, key: &str, limit: &ActionLimit) -> Decision {
        let now = self.clock.now_ms();

        trace!(
            key = %key,
            max_attempts = limit.max_attempts,
            window_ms = limit.window_ms,
            "Checking rate limit"
        );

        if self.max_tracked_keys > 0
            && !self.windows.contains_key(key)
            && self.windows.len() >= self.max_tracked_keys
            && !self.make_room(now)
        {
            debug!(
                key = %key,
                max_tracked_keys = self.max_tracked_keys,
                "Key cap reached with no idle keys, denying new key"
            );
            return Decision {
                allowed: false,
                remaining: 0,
                retry_after_ms: limit.window_ms,
            };
        }

        let decision = {
            let mut window = self
                .windows
                .entry(key.to_string())
                .or_insert_with(|| SlidingWindow::new(limit.window_ms));

            let allowed = window.try_admit(now, limit.max_attempts, limit.window_ms);
            Decision {
                allowed,
                remaining: window.remaining(limit.max_attempts),
                retry_after_ms: window.retry_after_ms(now, limit.max_attempts),
            }
        };

        if !decision.allowed {
            debug!(
                key = %key,
                retry_after_ms = decision.retry_after_ms,
                "Rate limit exceeded"
            );
        }

        decision
    }

    /// Number of attempts currently counted for a key.
    ///
    /// Returns `None` if the key is not tracked.
    pub fn attempts(&self, key: &str) -> Option<usize> {
        let now = self.clock.now_ms();
        self.windows.get_mut(key).map(|mut window| {
            window.prune(now);
            window.len()
        })
    }

    /// Evict every key with no attempt left in its window.
    ///
    /// Returns the number of keys evicted.
    pub fn purge_idle(&self) -> usize {
        self.purge_idle_at(self.clock.now_ms())
    }

    /// Clear all windows.
    ///
    /// This is primarily useful for testing.
    pub fn clear(&self) {
        self.windows.clear();
    }

    /// Get the number of tracked keys.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    fn purge_idle_at(&self, now: i64) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| {
            window.prune(now);
            !window.is_empty()
        });
        let evicted = before.saturating_sub(self.windows.len());
        if evicted > 0 {
            debug!(evicted = evicted, "Evicted idle rate limit keys");
        }
        evicted
    }

    /// Free a slot for a new key by dropping idle keys.
    ///
    /// Keys with attempts still in their window are never evicted, so a
    /// flood of new keys cannot reset another key's budget.
    fn make_room(&self, now: i64) -> bool {
        self.purge_idle_at(now);
        self.windows.len() < self.max_tracked_keys
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
