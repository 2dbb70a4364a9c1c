//! Configuration management for Todo Gate.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{GateError, Result};
use crate::ratelimit::{ActionLimits, DEFAULT_MAX_TRACKED_KEYS};

/// Main configuration for the gate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateConfig {
    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// Cap on distinct keys tracked at once (0 for unbounded)
    #[serde(default = "default_max_tracked_keys")]
    pub max_tracked_keys: usize,

    /// Budgets by action name, overlaid on the built-in budgets
    #[serde(default, deserialize_with = "limits_over_defaults")]
    pub limits: ActionLimits,
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            max_tracked_keys: default_max_tracked_keys(),
            limits: ActionLimits::default(),
        }
    }
}

fn default_max_tracked_keys() -> usize {
    DEFAULT_MAX_TRACKED_KEYS
}

/// Actions missing from the configured map keep their built-in budget.
fn limits_over_defaults<'de, D>(deserializer: D) -> std::result::Result<ActionLimits, D::Error>
where
    D: Deserializer<'de>,
{
    let configured = ActionLimits::deserialize(deserializer)?;
    Ok(ActionLimits::default().merge(configured))
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl GateConfig {
    /// Load configuration from a file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: GateConfig = serde_yaml::from_str(yaml)
            .map_err(|e| GateError::Config(format!("Failed to parse configuration: {}", e)))?;
        config.rate_limiting.limits.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::{ActionLimit, ADD_TODO, SIGN_IN, SIGN_UP};

    #[test]
    fn test_defaults() {
        let config = GateConfig::default();
        assert_eq!(config.rate_limiting.max_tracked_keys, 10_000);
        assert_eq!(config.rate_limiting.limits, ActionLimits::default());
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = GateConfig::from_yaml("{}").unwrap();
        assert_eq!(config.rate_limiting.limits.len(), 3);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
rate_limiting:
  max_tracked_keys: 50
  limits:
    signup:
      max_attempts: 2
      window_ms: 10000
    addTodo:
      max_attempts: 100
      window_ms: 60000
logging:
  level: debug
  json: true
"#;
        let config = GateConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.rate_limiting.max_tracked_keys, 50);
        assert_eq!(
            config.rate_limiting.limits.get(SIGN_UP),
            Some(&ActionLimit::new(2, 10_000))
        );
        assert_eq!(
            config.rate_limiting.limits.get(ADD_TODO),
            Some(&ActionLimit::new(100, 60_000))
        );
        assert_eq!(
            config.rate_limiting.limits.get(SIGN_IN),
            Some(&ActionLimit::new(5, 60_000))
        );
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_partial_limits_keep_other_defaults() {
        let yaml = r#"
rate_limiting:
  limits:
    signup:
      max_attempts: 1
      window_ms: 1000
"#;
        let config = GateConfig::from_yaml(yaml).unwrap();
        let limits = &config.rate_limiting.limits;
        assert_eq!(limits.len(), 3);
        assert_eq!(limits.get(SIGN_UP), Some(&ActionLimit::new(1, 1_000)));
        assert_eq!(limits.get(SIGN_IN), Some(&ActionLimit::new(5, 60_000)));
        assert_eq!(limits.get(ADD_TODO), Some(&ActionLimit::new(10, 60_000)));
    }

    #[test]
    fn test_rejects_zero_budget() {
        let yaml = r#"
rate_limiting:
  limits:
    signin:
      max_attempts: 0
      window_ms: 60000
"#;
        assert!(matches!(GateConfig::from_yaml(yaml), Err(GateError::Config(_))));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(
            GateConfig::from_yaml("rate_limiting: [1, 2]"),
            Err(GateError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            GateConfig::from_file("/nonexistent/todo-gate.yaml"),
            Err(GateError::Io(_))
        ));
    }
}
