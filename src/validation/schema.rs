//! The process-wide validation schemas.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::constraint::FieldConstraint;
use super::error::{ValidationError, ValidationReason};

/// Identifies one of the input schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaName {
    /// Account creation: email, password, confirmation
    SignUp,
    /// Credential verification: email and password presence
    SignIn,
    /// Todo item: title and optional description
    TodoItem,
}

impl SchemaName {
    /// Parse a schema name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "sign-up" | "signup" => Some(SchemaName::SignUp),
            "sign-in" | "signin" => Some(SchemaName::SignIn),
            "todo-item" | "todo" => Some(SchemaName::TodoItem),
            _ => None,
        }
    }

    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaName::SignUp => "sign-up",
            SchemaName::SignIn => "sign-in",
            SchemaName::TodoItem => "todo-item",
        }
    }
}

impl std::fmt::Display for SchemaName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule spanning two fields, checked after every field passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossFieldRule {
    /// `field` must equal `other` exactly; failures are reported on `field`.
    Equals {
        field: &'static str,
        label: &'static str,
        other: &'static str,
    },
}

/// An ordered set of field constraints plus cross-field rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationSchema {
    /// Which schema this is
    pub name: SchemaName,
    /// Fields in check order
    pub fields: &'static [FieldConstraint],
    /// Rules checked once every field passed
    pub cross_field: &'static [CrossFieldRule],
}

/// Field values after normalization, by field name.
///
/// Optional fields that were absent or empty map to `None`.
#[derive(Debug, Default)]
pub struct NormalizedFields {
    values: HashMap<&'static str, Option<String>>,
}

impl NormalizedFields {
    /// Get a normalized value.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).and_then(|v| v.as_deref())
    }

    /// Take a value out.
    pub fn take(&mut self, field: &str) -> Option<String> {
        self.values.get_mut(field).and_then(Option::take)
    }
}

impl ValidationSchema {
    /// Check every field in order, then the cross-field rules, stopping at
    /// the first violation.
    pub fn apply<'a>(
        &self,
        raw: impl Fn(&str) -> Option<&'a str>,
    ) -> Result<NormalizedFields, ValidationError> {
        let mut normalized = NormalizedFields::default();

        for constraint in self.fields {
            let value = constraint
                .check(raw(constraint.name))
                .map_err(|reason| ValidationError::new(constraint.name, constraint.label, reason))?;
            normalized.values.insert(constraint.name, value);
        }

        for rule in self.cross_field {
            match *rule {
                CrossFieldRule::Equals { field, label, other } => {
                    if normalized.get(field) != normalized.get(other) {
                        return Err(ValidationError::new(field, label, ValidationReason::Mismatch));
                    }
                }
            }
        }

        Ok(normalized)
    }

    /// Find a field constraint by name.
    pub fn field(&self, name: &str) -> Option<&FieldConstraint> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Account creation schema.
pub static SIGN_UP: ValidationSchema = ValidationSchema {
    name: SchemaName::SignUp,
    fields: &[
        FieldConstraint::email("email", "Email"),
        FieldConstraint::strong_password("password", "Password"),
        FieldConstraint::password_present("confirmPassword", "Confirm password"),
    ],
    cross_field: &[CrossFieldRule::Equals {
        field: "confirmPassword",
        label: "Confirm password",
        other: "password",
    }],
};

/// Credential verification schema.
pub static SIGN_IN: ValidationSchema = ValidationSchema {
    name: SchemaName::SignIn,
    fields: &[
        FieldConstraint::email("email", "Email"),
        FieldConstraint::password_present("password", "Password"),
    ],
    cross_field: &[],
};

/// Todo item schema.
pub static TODO_ITEM: ValidationSchema = ValidationSchema {
    name: SchemaName::TodoItem,
    fields: &[
        FieldConstraint::text("title", "Title", 1, 200),
        FieldConstraint::text("description", "Description", 0, 1000).optional(),
    ],
    cross_field: &[],
};

/// Look up a schema by name.
pub fn schema(name: SchemaName) -> &'static ValidationSchema {
    match name {
        SchemaName::SignUp => &SIGN_UP,
        SchemaName::SignIn => &SIGN_IN,
        SchemaName::TodoItem => &TODO_ITEM,
    }
}
