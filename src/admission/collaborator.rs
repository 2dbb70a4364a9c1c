//! Trait for the external service admitted input is handed to.

use async_trait::async_trait;
use tracing::info;

use super::Action;
use crate::validation::ValidatedInput;

/// Opaque error surfaced by a collaborator.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// The account/storage service downstream of admission.
///
/// The gate neither retries nor interprets collaborator failures; uniqueness
/// and authorization are the collaborator's own business.
#[async_trait]
pub trait Collaborator: Send + Sync {
    /// Carry out an admitted action.
    async fn handle(&self, action: Action, input: &ValidatedInput) -> Result<(), CollaboratorError>;
}

/// A collaborator that only logs what it would have done.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingCollaborator;

#[async_trait]
impl Collaborator for TracingCollaborator {
    async fn handle(&self, action: Action, input: &ValidatedInput) -> Result<(), CollaboratorError> {
        match input {
            ValidatedInput::SignUp(form) => {
                info!(action = %action, email = %form.email, "Would create account");
            }
            ValidatedInput::SignIn(form) => {
                info!(action = %action, email = %form.email, "Would verify credentials");
            }
            ValidatedInput::TodoItem(item) => {
                info!(
                    action = %action,
                    title_len = item.title.chars().count(),
                    has_description = item.description.is_some(),
                    "Would store todo item"
                );
            }
        }
        Ok(())
    }
}
