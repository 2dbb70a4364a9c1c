//! Action key generation and handling.

/// A key that identifies one rate limit budget.
///
/// The key is an action name, optionally scoped to a subject such as a
/// user id or client address. Unscoped keys share one budget across every
/// caller of that action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionKey {
    /// The action this key limits
    pub action: String,
    /// Optional subject the budget is scoped to
    pub subject: Option<String>,
}

impl ActionKey {
    /// Create an unscoped key for an action.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            subject: None,
        }
    }

    /// Scope this key to a subject.
    pub fn scoped(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Convert the key to the string the limiter stores it under.
    pub fn to_string_key(&self) -> String {
        match &self.subject {
            Some(subject) => format!("{}:{}", self.action, subject),
            None => self.action.clone(),
        }
    }
}

impl std::fmt::Display for ActionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_key())
    }
}
