//! Structural input validation with typed constraints and normalization.

mod constraint;
mod error;
mod schema;
mod validator;

pub use constraint::{FieldConstraint, FieldKind, FormatRule, Normalization};
pub use error::{ValidationError, ValidationReason};
pub use schema::{schema, CrossFieldRule, NormalizedFields, SchemaName, ValidationSchema};
pub use validator::{validate, RawInput, SignInForm, SignUpForm, TodoForm, ValidatedInput};
