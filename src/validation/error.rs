//! Validation failures.

use serde::Serialize;
use std::fmt;

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationReason {
    Required,
    #[serde(rename = "min_length")]
    TooShort { min: usize },
    #[serde(rename = "max_length")]
    TooLong { max: usize },
    InvalidEmail,
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
    Mismatch,
}

impl ValidationReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationReason::Required => "required",
            ValidationReason::TooShort { .. } => "min_length",
            ValidationReason::TooLong { .. } => "max_length",
            ValidationReason::InvalidEmail => "invalid_email",
            ValidationReason::MissingUppercase => "missing_uppercase",
            ValidationReason::MissingLowercase => "missing_lowercase",
            ValidationReason::MissingDigit => "missing_digit",
            ValidationReason::Mismatch => "mismatch",
        }
    }
}

/// The first rule an input violated.
///
/// `Display` renders the user-facing message, which callers show verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Field name as it appears in raw input
    pub field: &'static str,
    /// Human-readable field label
    #[serde(skip)]
    pub label: &'static str,
    /// The violated rule
    pub reason: ValidationReason,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(field: &'static str, label: &'static str, reason: ValidationReason) -> Self {
        Self {
            field,
            label,
            reason,
        }
    }

    /// The user-facing message.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.label;
        match self.reason {
            ValidationReason::Required => write!(f, "{} is required", label),
            ValidationReason::TooShort { min } => {
                write!(f, "{} must be at least {} characters", label, min)
            }
            ValidationReason::TooLong { max } => {
                write!(f, "{} must be at most {} characters", label, max)
            }
            ValidationReason::InvalidEmail => write!(f, "Invalid email address"),
            ValidationReason::MissingUppercase => {
                write!(f, "{} must contain at least one uppercase letter", label)
            }
            ValidationReason::MissingLowercase => {
                write!(f, "{} must contain at least one lowercase letter", label)
            }
            ValidationReason::MissingDigit => {
                write!(f, "{} must contain at least one number", label)
            }
            ValidationReason::Mismatch => write!(f, "Passwords do not match"),
        }
    }
}

impl std::error::Error for ValidationError {}
