//! Sliding window of attempt timestamps for a single key.

use std::collections::VecDeque;

/// Recent attempt timestamps for one action key.
///
/// Timestamps are kept in arrival order. A timestamp `t` counts toward the
/// limit at time `now` only while `now - t < window_ms`.
#[derive(Debug, Clone, Default)]
pub struct SlidingWindow {
    /// Attempt timestamps in milliseconds, oldest first
    attempts: VecDeque<i64>,
    /// Window length used by the most recent check
    window_ms: u64,
}

impl SlidingWindow {
    /// Create an empty window.
    pub fn new(window_ms: u64) -> Self {
        Self {
            attempts: VecDeque::new(),
            window_ms,
        }
    }

    /// Drop every timestamp that has slid out of the window ending at `now_ms`.
    pub fn prune(&mut self, now_ms: i64) {
        let window = i128::from(self.window_ms);
        while let Some(&oldest) = self.attempts.front() {
            if i128::from(now_ms) - i128::from(oldest) < window {
                break;
            }
            self.attempts.pop_front();
        }
    }

    /// Prune, then record an attempt at `now_ms` if fewer than
    /// `max_attempts` remain in the window.
    ///
    /// Returns `true` if the attempt was admitted. Pruning is kept on denial.
    pub fn try_admit(&mut self, now_ms: i64, max_attempts: u32, window_ms: u64) -> bool {
        self.window_ms = window_ms;
        self.prune(now_ms);

        if self.attempts.len() >= max_attempts as usize {
            return false;
        }

        self.attempts.push_back(now_ms);
        true
    }

    /// Number of attempts currently counted.
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    /// Whether no attempt is currently counted.
    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Remaining admissions under `max_attempts`.
    pub fn remaining(&self, max_attempts: u32) -> u32 {
        (max_attempts as usize).saturating_sub(self.attempts.len()) as u32
    }

    /// Milliseconds until enough attempts leave the window for one more
    /// admission under `max_attempts`.
    pub fn retry_after_ms(&self, now_ms: i64, max_attempts: u32) -> u64 {
        if self.attempts.len() < max_attempts as usize {
            return 0;
        }
        if max_attempts == 0 {
            return self.window_ms;
        }

        // The attempt that has to expire is the one that leaves exactly
        // max_attempts - 1 behind it.
        let blocking = self.attempts.len() - max_attempts as usize;
        match self.attempts.get(blocking) {
            Some(&ts) => {
                let expires_at = i128::from(ts) + i128::from(self.window_ms);
                let wait = (expires_at - i128::from(now_ms)).max(0);
                u64::try_from(wait).unwrap_or(u64::MAX)
            }
            None => 0,
        }
    }
}
