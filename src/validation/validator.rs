//! Schema application producing typed, normalized input.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::error::{ValidationError, ValidationReason};
use super::schema::{schema, NormalizedFields, SchemaName, ValidationSchema};

/// Raw field values as submitted by a form.
///
/// A missing key and an explicit `null` both mean "absent".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct RawInput {
    fields: HashMap<String, Option<String>>,
}

impl RawInput {
    /// Create an empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field.into(), Some(value.into()));
        self
    }

    /// Parse a JSON object of field values.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Get a field value, if present.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_deref())
    }
}

/// Normalized account-creation input.
#[derive(Clone, PartialEq, Eq)]
pub struct SignUpForm {
    /// Trimmed, lowercased email
    pub email: String,
    /// Password, verbatim
    pub password: String,
}

/// Normalized credential-verification input.
#[derive(Clone, PartialEq, Eq)]
pub struct SignInForm {
    /// Trimmed, lowercased email
    pub email: String,
    /// Password, verbatim
    pub password: String,
}

impl fmt::Debug for SignUpForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for SignInForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Normalized todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoForm {
    /// Trimmed title
    pub title: String,
    /// Trimmed description, `None` when absent or blank
    pub description: Option<String>,
}

/// The typed result of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedInput {
    SignUp(SignUpForm),
    SignIn(SignInForm),
    TodoItem(TodoForm),
}

impl ValidatedInput {
    /// The schema that produced this input.
    pub fn schema(&self) -> SchemaName {
        match self {
            ValidatedInput::SignUp(_) => SchemaName::SignUp,
            ValidatedInput::SignIn(_) => SchemaName::SignIn,
            ValidatedInput::TodoItem(_) => SchemaName::TodoItem,
        }
    }
}

/// Validate raw input against a schema.
///
/// Fields are checked in schema order and validation stops at the first
/// violated rule. On success every field is normalized.
pub fn validate(name: SchemaName, raw: &RawInput) -> Result<ValidatedInput, ValidationError> {
    let schema = schema(name);
    let mut fields = schema.apply(|field| raw.get(field))?;

    let input = match name {
        SchemaName::SignUp => ValidatedInput::SignUp(SignUpForm {
            email: take_required(schema, &mut fields, "email")?,
            password: take_required(schema, &mut fields, "password")?,
        }),
        SchemaName::SignIn => ValidatedInput::SignIn(SignInForm {
            email: take_required(schema, &mut fields, "email")?,
            password: take_required(schema, &mut fields, "password")?,
        }),
        SchemaName::TodoItem => ValidatedInput::TodoItem(TodoForm {
            title: take_required(schema, &mut fields, "title")?,
            description: fields.take("description"),
        }),
    };

    Ok(input)
}

fn take_required(
    schema: &ValidationSchema,
    fields: &mut NormalizedFields,
    field: &'static str,
) -> Result<String, ValidationError> {
    fields.take(field).ok_or_else(|| {
        let label = schema.field(field).map(|f| f.label).unwrap_or(field);
        ValidationError::new(field, label, ValidationReason::Required)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_up(email: &str, password: &str, confirm: &str) -> RawInput {
        RawInput::new()
            .with("email", email)
            .with("password", password)
            .with("confirmPassword", confirm)
    }

    #[test]
    fn test_sign_up_success_normalizes_email() {
        let raw = sign_up("  Alice@Example.COM ", "Secret123", "Secret123");
        let input = validate(SchemaName::SignUp, &raw).unwrap();

        match input {
            ValidatedInput::SignUp(form) => {
                assert_eq!(form.email, "alice@example.com");
                assert_eq!(form.password, "Secret123");
            }
            other => panic!("unexpected input: {:?}", other),
        }
    }

    #[test]
    fn test_sign_up_mismatch() {
        let raw = sign_up("alice@example.com", "Secret123", "secret123");
        let err = validate(SchemaName::SignUp, &raw).unwrap_err();

        assert_eq!(err.field, "confirmPassword");
        assert_eq!(err.reason, ValidationReason::Mismatch);
        assert_eq!(err.to_string(), "Passwords do not match");
    }

    #[test]
    fn test_sign_up_reports_earlier_field_first() {
        let raw = sign_up("not-an-email", "Secret123", "Other123");
        let err = validate(SchemaName::SignUp, &raw).unwrap_err();
        assert_eq!(err.field, "email");
        assert_eq!(err.reason, ValidationReason::InvalidEmail);

        let raw = sign_up("alice@example.com", "weak", "different");
        let err = validate(SchemaName::SignUp, &raw).unwrap_err();
        assert_eq!(err.field, "password");
        assert_eq!(err.reason, ValidationReason::TooShort { min: 8 });
    }

    #[test]
    fn test_sign_up_missing_confirmation() {
        let raw = RawInput::new()
            .with("email", "alice@example.com")
            .with("password", "Secret123");
        let err = validate(SchemaName::SignUp, &raw).unwrap_err();
        assert_eq!(err.field, "confirmPassword");
        assert_eq!(err.reason, ValidationReason::Required);
    }

    #[test]
    fn test_sign_up_password_whitespace_is_significant() {
        let raw = sign_up("alice@example.com", "Secret123", "Secret123 ");
        let err = validate(SchemaName::SignUp, &raw).unwrap_err();
        assert_eq!(err.reason, ValidationReason::Mismatch);
    }

    #[test]
    fn test_sign_in_only_needs_password_presence() {
        let raw = RawInput::new()
            .with("email", "Bob@Example.com")
            .with("password", "x");
        let input = validate(SchemaName::SignIn, &raw).unwrap();
        assert_eq!(
            input,
            ValidatedInput::SignIn(SignInForm {
                email: "bob@example.com".to_string(),
                password: "x".to_string(),
            })
        );

        let raw = RawInput::new().with("email", "bob@example.com");
        let err = validate(SchemaName::SignIn, &raw).unwrap_err();
        assert_eq!((err.field, err.reason), ("password", ValidationReason::Required));
    }

    #[test]
    fn test_title_boundary() {
        let raw = RawInput::new().with("title", "t".repeat(200));
        assert!(validate(SchemaName::TodoItem, &raw).is_ok());

        let raw = RawInput::new().with("title", "t".repeat(201));
        let err = validate(SchemaName::TodoItem, &raw).unwrap_err();
        assert_eq!(err.field, "title");
        assert_eq!(err.reason, ValidationReason::TooLong { max: 200 });
    }

    #[test]
    fn test_email_boundary() {
        // 88 + 12 = 100 characters
        let email = format!("{}@example.com", "a".repeat(88));
        let raw = sign_up(&email, "Secret123", "Secret123");
        assert!(validate(SchemaName::SignUp, &raw).is_ok());

        let email = format!("{}@example.com", "a".repeat(89));
        let raw = sign_up(&email, "Secret123", "Secret123");
        let err = validate(SchemaName::SignUp, &raw).unwrap_err();
        assert_eq!(err.field, "email");
        assert_eq!(err.reason, ValidationReason::TooLong { max: 100 });
    }

    #[test]
    fn test_todo_description_at_limit() {
        let raw = RawInput::new()
            .with("title", "Plan")
            .with("description", "d".repeat(1000));
        match validate(SchemaName::TodoItem, &raw).unwrap() {
            ValidatedInput::TodoItem(form) => {
                assert_eq!(form.description.map(|d| d.chars().count()), Some(1000));
            }
            other => panic!("expected a todo item, got {:?}", other),
        }
    }

    #[test]
    fn test_todo_description_absent_is_none() {
        let raw = RawInput::new().with("title", "  Buy milk ");
        let input = validate(SchemaName::TodoItem, &raw).unwrap();
        assert_eq!(
            input,
            ValidatedInput::TodoItem(TodoForm {
                title: "Buy milk".to_string(),
                description: None,
            })
        );
        assert_eq!(input.schema(), SchemaName::TodoItem);
    }

    #[test]
    fn test_todo_description_too_long() {
        let raw = RawInput::new()
            .with("title", "Plan")
            .with("description", "d".repeat(1001));
        let err = validate(SchemaName::TodoItem, &raw).unwrap_err();
        assert_eq!(err.field, "description");
        assert_eq!(err.reason, ValidationReason::TooLong { max: 1000 });
    }

    #[test]
    fn test_raw_input_from_json_with_null() {
        let raw = RawInput::from_json(r#"{"title": "Plan", "description": null}"#).unwrap();
        assert_eq!(raw.get("title"), Some("Plan"));
        assert_eq!(raw.get("description"), None);

        let input = validate(SchemaName::TodoItem, &raw).unwrap();
        assert!(matches!(input, ValidatedInput::TodoItem(TodoForm { description: None, .. })));
    }

    #[test]
    fn test_raw_input_rejects_non_strings() {
        assert!(RawInput::from_json(r#"{"title": 5}"#).is_err());
        assert!(RawInput::from_json("[]").is_err());
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let form = SignUpForm {
            email: "a@b.co".to_string(),
            password: "Secret123".to_string(),
        };
        let debug = format!("{:?}", form);
        assert!(!debug.contains("Secret123"));
        assert!(debug.contains("a@b.co"));
    }
}
