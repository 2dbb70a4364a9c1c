//! Field constraints: type, length bounds, normalization and format rules.

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::ValidationReason;

// Email: local part, then dotted domain with an alphabetic TLD
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9](?:[a-z0-9-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)*\.[a-z]{2,}$")
        .unwrap()
});

/// Semantic type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Password,
}

/// Normalization applied to a present value before any check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// Use the value verbatim (passwords)
    Verbatim,
    /// Trim surrounding whitespace
    Trim,
    /// Trim, then lowercase
    TrimLowercase,
}

impl Normalization {
    /// Apply this normalization.
    pub fn apply(&self, value: &str) -> String {
        match self {
            Normalization::Verbatim => value.to_string(),
            Normalization::Trim => value.trim().to_string(),
            Normalization::TrimLowercase => value.trim().to_lowercase(),
        }
    }
}

/// A format predicate a normalized value must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatRule {
    Email,
    HasUppercase,
    HasLowercase,
    HasDigit,
}

impl FormatRule {
    /// Check the rule, returning the violation if it fails.
    pub fn check(&self, value: &str) -> Result<(), ValidationReason> {
        let ok = match self {
            FormatRule::Email => EMAIL_RE.is_match(value),
            FormatRule::HasUppercase => value.chars().any(|c| c.is_ascii_uppercase()),
            FormatRule::HasLowercase => value.chars().any(|c| c.is_ascii_lowercase()),
            FormatRule::HasDigit => value.chars().any(|c| c.is_ascii_digit()),
        };
        if ok {
            Ok(())
        } else {
            Err(self.violation())
        }
    }

    fn violation(&self) -> ValidationReason {
        match self {
            FormatRule::Email => ValidationReason::InvalidEmail,
            FormatRule::HasUppercase => ValidationReason::MissingUppercase,
            FormatRule::HasLowercase => ValidationReason::MissingLowercase,
            FormatRule::HasDigit => ValidationReason::MissingDigit,
        }
    }
}

const EMAIL_RULES: &[FormatRule] = &[FormatRule::Email];
const STRONG_PASSWORD_RULES: &[FormatRule] = &[
    FormatRule::HasUppercase,
    FormatRule::HasLowercase,
    FormatRule::HasDigit,
];

/// Constraints for one input field.
///
/// Lengths are counted in characters, after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldConstraint {
    /// Field name as it appears in raw input
    pub name: &'static str,
    /// Human-readable label used in error messages
    pub label: &'static str,
    /// Semantic type
    pub kind: FieldKind,
    /// Whether the field must be present and non-empty
    pub required: bool,
    /// Minimum length
    pub min_len: usize,
    /// Maximum length, if bounded
    pub max_len: Option<usize>,
    /// Normalization applied before checks
    pub normalization: Normalization,
    /// Format predicates, checked in order
    pub formats: &'static [FormatRule],
}

impl FieldConstraint {
    /// An email field: 5-100 characters, trimmed and lowercased.
    pub const fn email(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Email,
            required: true,
            min_len: 5,
            max_len: Some(100),
            normalization: Normalization::TrimLowercase,
            formats: EMAIL_RULES,
        }
    }

    /// A new password: 8-100 characters with upper, lower and digit.
    pub const fn strong_password(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Password,
            required: true,
            min_len: 8,
            max_len: Some(100),
            normalization: Normalization::Verbatim,
            formats: STRONG_PASSWORD_RULES,
        }
    }

    /// A password that only has to be present.
    pub const fn password_present(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Password,
            required: true,
            min_len: 1,
            max_len: None,
            normalization: Normalization::Verbatim,
            formats: &[],
        }
    }

    /// A trimmed free-text field.
    pub const fn text(name: &'static str, label: &'static str, min_len: usize, max_len: usize) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            required: true,
            min_len,
            max_len: Some(max_len),
            normalization: Normalization::Trim,
            formats: &[],
        }
    }

    /// Make this field optional.
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Normalize and check a raw value.
    ///
    /// Returns `Ok(None)` for an optional field that is absent or empty
    /// after normalization. The first failing rule is reported.
    pub fn check(&self, raw: Option<&str>) -> Result<Option<String>, ValidationReason> {
        let value = match raw.map(|v| self.normalization.apply(v)) {
            Some(v) if !v.is_empty() => v,
            _ if self.required => return Err(ValidationReason::Required),
            _ => return Ok(None),
        };

        let len = value.chars().count();
        if len < self.min_len {
            return Err(ValidationReason::TooShort { min: self.min_len });
        }
        if let Some(max) = self.max_len {
            if len > max {
                return Err(ValidationReason::TooLong { max });
            }
        }

        for rule in self.formats {
            rule.check(&value)?;
        }

        Ok(Some(value))
    }
}
