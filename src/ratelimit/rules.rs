//! Per-action rate limit budgets.
//!
//! Budgets are caller-owned configuration. The limiter receives the budget on
//! every call and never stores it, so the same limiter can serve actions with
//! different limits.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{GateError, Result};

/// Action name for account creation.
pub const SIGN_UP: &str = "signup";
/// Action name for credential verification.
pub const SIGN_IN: &str = "signin";
/// Action name for todo item creation.
pub const ADD_TODO: &str = "addTodo";

/// Largest accepted window, the span of a millisecond timestamp.
pub const MAX_WINDOW_MS: u64 = i64::MAX as u64;

/// A budget: at most `max_attempts` admissions in any trailing `window_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLimit {
    /// Maximum admissions allowed in the window
    pub max_attempts: u32,
    /// Window length in milliseconds
    pub window_ms: u64,
}

impl ActionLimit {
    /// Create a new budget.
    pub const fn new(max_attempts: u32, window_ms: u64) -> Self {
        Self {
            max_attempts,
            window_ms,
        }
    }

    /// Reject budgets that could never admit anything, never count anything,
    /// or reach past the millisecond timestamp range.
    pub fn validate(&self, action: &str) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(GateError::Config(format!(
                "rate limit for '{}' must allow at least one attempt",
                action
            )));
        }
        if self.window_ms == 0 {
            return Err(GateError::Config(format!(
                "rate limit window for '{}' must be positive",
                action
            )));
        }
        if self.window_ms > MAX_WINDOW_MS {
            return Err(GateError::Config(format!(
                "rate limit window for '{}' must be at most {} ms",
                action, MAX_WINDOW_MS
            )));
        }
        Ok(())
    }
}

/// Budgets keyed by action name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionLimits {
    limits: HashMap<String, ActionLimit>,
}

impl Default for ActionLimits {
    /// The budgets of the todo service: sign-up 3/min, sign-in 5/min,
    /// item creation 10/min.
    fn default() -> Self {
        let mut limits = HashMap::new();
        limits.insert(SIGN_UP.to_string(), ActionLimit::new(3, 60_000));
        limits.insert(SIGN_IN.to_string(), ActionLimit::new(5, 60_000));
        limits.insert(ADD_TODO.to_string(), ActionLimit::new(10, 60_000));
        Self { limits }
    }
}

impl ActionLimits {
    /// Create an empty set of budgets.
    pub fn empty() -> Self {
        Self {
            limits: HashMap::new(),
        }
    }

    /// Set the budget for an action, replacing any previous one.
    pub fn with(mut self, action: impl Into<String>, limit: ActionLimit) -> Self {
        self.limits.insert(action.into(), limit);
        self
    }

    /// Overlay `other` on these budgets. Actions `other` names win; the rest
    /// keep their current budget.
    pub fn merge(mut self, other: ActionLimits) -> Self {
        self.limits.extend(other.limits);
        self
    }

    /// Get the budget for an action.
    pub fn get(&self, action: &str) -> Option<&ActionLimit> {
        self.limits.get(action)
    }

    /// Check every budget.
    pub fn validate(&self) -> Result<()> {
        for (action, limit) in &self.limits {
            limit.validate(action)?;
        }
        Ok(())
    }

    /// Number of configured actions.
    pub fn len(&self) -> usize {
        self.limits.len()
    }

    /// Whether no budget is configured.
    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budgets() {
        let limits = ActionLimits::default();

        assert_eq!(limits.len(), 3);
        assert_eq!(limits.get(SIGN_UP), Some(&ActionLimit::new(3, 60_000)));
        assert_eq!(limits.get(SIGN_IN), Some(&ActionLimit::new(5, 60_000)));
        assert_eq!(limits.get(ADD_TODO), Some(&ActionLimit::new(10, 60_000)));
        assert!(limits.get("deleteTodo").is_none());
    }

    #[test]
    fn test_parse_budgets() {
        let yaml = r#"
signup:
  max_attempts: 1
  window_ms: 1000
addTodo:
  max_attempts: 20
  window_ms: 30000
"#;
        let limits: ActionLimits = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(limits.len(), 2);
        assert_eq!(limits.get(SIGN_UP), Some(&ActionLimit::new(1, 1_000)));
        assert_eq!(limits.get(ADD_TODO), Some(&ActionLimit::new(20, 30_000)));
    }

    #[test]
    fn test_validate_rejects_zero() {
        let limits = ActionLimits::empty().with(SIGN_IN, ActionLimit::new(0, 1_000));
        assert!(matches!(limits.validate(), Err(GateError::Config(_))));

        let limits = ActionLimits::empty().with(SIGN_IN, ActionLimit::new(5, 0));
        assert!(matches!(limits.validate(), Err(GateError::Config(_))));

        assert!(ActionLimits::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_window_past_timestamp_range() {
        let limits = ActionLimits::empty().with(SIGN_UP, ActionLimit::new(3, MAX_WINDOW_MS + 1));
        assert!(matches!(limits.validate(), Err(GateError::Config(_))));

        let limits = ActionLimits::empty().with(SIGN_UP, ActionLimit::new(3, u64::MAX));
        assert!(matches!(limits.validate(), Err(GateError::Config(_))));

        let limits = ActionLimits::empty().with(SIGN_UP, ActionLimit::new(3, MAX_WINDOW_MS));
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn test_merge_keeps_unnamed_defaults() {
        let overrides = ActionLimits::empty().with(SIGN_UP, ActionLimit::new(1, 5_000));
        let limits = ActionLimits::default().merge(overrides);

        assert_eq!(limits.len(), 3);
        assert_eq!(limits.get(SIGN_UP), Some(&ActionLimit::new(1, 5_000)));
        assert_eq!(limits.get(SIGN_IN), Some(&ActionLimit::new(5, 60_000)));
        assert_eq!(limits.get(ADD_TODO), Some(&ActionLimit::new(10, 60_000)));
    }

    #[test]
    fn test_with_replaces() {
        let limits = ActionLimits::default().with(SIGN_UP, ActionLimit::new(7, 5_000));
        assert_eq!(limits.get(SIGN_UP), Some(&ActionLimit::new(7, 5_000)));
        assert_eq!(limits.len(), 3);
    }
}
