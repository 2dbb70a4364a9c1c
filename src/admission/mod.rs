//! The admission pipeline.
//!
//! Every mutating action runs: rate limit check, schema validation with
//! normalization, sanitization of free text, then handoff to the
//! [`Collaborator`]. The first stage that rejects ends the pipeline.

mod collaborator;

pub use collaborator::{Collaborator, CollaboratorError, TracingCollaborator};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::ratelimit::{ActionKey, ActionLimits, Decision, RateLimiter, ADD_TODO, SIGN_IN, SIGN_UP};
use crate::sanitize::sanitize;
use crate::validation::{
    validate, RawInput, SchemaName, TodoForm, ValidatedInput, ValidationError, ValidationReason,
};

/// A mutating action subject to admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "signup")]
    SignUp,
    #[serde(rename = "signin")]
    SignIn,
    #[serde(rename = "addTodo")]
    AddTodo,
}

impl Action {
    /// The rate limit action name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::SignUp => SIGN_UP,
            Action::SignIn => SIGN_IN,
            Action::AddTodo => ADD_TODO,
        }
    }

    /// The schema this action's input is validated against.
    pub fn schema(&self) -> SchemaName {
        match self {
            Action::SignUp => SchemaName::SignUp,
            Action::SignIn => SchemaName::SignIn,
            Action::AddTodo => SchemaName::TodoItem,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an action was not admitted or not completed.
#[derive(Error, Debug)]
pub enum AdmissionError {
    /// The action's budget is exhausted for this key
    #[error("Too many attempts. Please try again in {retry_after_ms} ms")]
    RateLimited { key: String, retry_after_ms: u64 },

    /// The input violated a schema rule
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The downstream service failed
    #[error("Request failed: {0}")]
    Collaborator(#[source] CollaboratorError),
}

/// An action that passed every admission stage.
#[derive(Debug, Clone)]
pub struct Admitted {
    /// The admitted action
    pub action: Action,
    /// The rate limit key the attempt was recorded under
    pub key: String,
    /// Validated, normalized and sanitized input
    pub input: ValidatedInput,
    /// The rate limiter's decision
    pub decision: Decision,
}

/// Request admission gate.
///
/// Owns a shared [`RateLimiter`], the per-action budgets, and the
/// collaborator admitted input is handed to.
pub struct Gate<C: Collaborator> {
    /// The rate limiter instance
    limiter: Arc<RateLimiter>,
    /// Budgets by action name
    limits: RwLock<ActionLimits>,
    /// Downstream service
    collaborator: Arc<C>,
}

impl<C: Collaborator> Gate<C> {
    /// Create a new gate.
    pub fn new(limiter: Arc<RateLimiter>, limits: ActionLimits, collaborator: Arc<C>) -> Self {
        Self {
            limiter,
            limits: RwLock::new(limits),
            collaborator,
        }
    }

    /// Replace the budgets.
    pub fn set_limits(&self, limits: ActionLimits) {
        *self.limits.write() = limits;
    }

    /// Get the current budgets.
    pub fn limits(&self) -> ActionLimits {
        self.limits.read().clone()
    }

    /// The shared rate limiter.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Run the rate limit, validation and sanitization stages.
    ///
    /// `subject`, when given, scopes the rate limit key (for example to a
    /// user id); without it the budget is shared by every caller of the
    /// action.
    #[instrument(skip(self, raw))]
    pub fn admit(
        &self,
        action: Action,
        subject: Option<&str>,
        raw: &RawInput,
    ) -> Result<Admitted, AdmissionError> {
        let mut key = ActionKey::new(action.as_str());
        if let Some(subject) = subject {
            key = key.scoped(subject);
        }
        let key = key.to_string_key();

        let limit = self.limits.read().get(action.as_str()).copied();
        let decision = match limit {
            Some(limit) => self.limiter.check(&key, &limit),
            None => {
                warn!(key = %key, "No rate limit configured for action, admitting");
                Decision {
                    allowed: true,
                    remaining: u32::MAX,
                    retry_after_ms: 0,
                }
            }
        };

        if !decision.allowed {
            return Err(AdmissionError::RateLimited {
                key,
                retry_after_ms: decision.retry_after_ms,
            });
        }

        let input = validate(action.schema(), raw).map_err(|e| {
            debug!(field = e.field, reason = e.reason.code(), "Input rejected");
            e
        })?;
        let input = sanitize_input(input)?;

        Ok(Admitted {
            action,
            key,
            input,
            decision,
        })
    }

    /// Admit an action and hand it to the collaborator.
    pub async fn submit(
        &self,
        action: Action,
        subject: Option<&str>,
        raw: &RawInput,
    ) -> Result<Admitted, AdmissionError> {
        let admitted = self.admit(action, subject, raw)?;

        self.collaborator
            .handle(action, &admitted.input)
            .await
            .map_err(|e| {
                warn!(action = %action, error = %e, "Collaborator failed");
                AdmissionError::Collaborator(e)
            })?;

        info!(action = %action, key = %admitted.key, "Action admitted and handed off");
        Ok(admitted)
    }
}

/// Sanitize free-text fields. Credentials pass through untouched.
fn sanitize_input(input: ValidatedInput) -> Result<ValidatedInput, ValidationError> {
    match input {
        ValidatedInput::TodoItem(item) => {
            let title = sanitize(&item.title);
            if title.is_empty() {
                return Err(ValidationError::new("title", "Title", ValidationReason::Required));
            }
            let description = item
                .description
                .map(|d| sanitize(&d))
                .filter(|d| !d.is_empty());
            Ok(ValidatedInput::TodoItem(TodoForm { title, description }))
        }
        credentials => Ok(credentials),
    }
}
