//! Error types.
//!
//! Three classes of failure reach a caller in different ways:
//!
//! - [`ValidationErrors`] are raised before any profile or transport work and
//!   are always returned to the caller.
//! - [`ProfileError`] indicates a deployment mistake (unknown profile, no
//!   default profile, bad sender address) and is always returned.
//! - [`TransportError`] happens while building or sending a message. The send
//!   operations of [`MailTemplate`](crate::MailTemplate) log it together with
//!   the request and return normally.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Configuration errors around named profiles.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("no mail profile named '{0}'")]
    NotFound(String),

    #[error("no default mail profile configured")]
    NoDefault,

    #[error("mail profile '{0}' is registered more than once")]
    Duplicate(String),

    #[error("mail profile '{profile}' has an invalid sender address '{address}'")]
    InvalidSender { profile: String, address: String },

    #[error("mail profile '{profile}': {message}")]
    Smtp { profile: String, message: String },
}

/// Failures while building or delivering one message.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("SMTP error: {0}")]
    Smtp(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("failed to read attachment {}: {source}", .path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dispatch aborted: {0}")]
    Aborted(String),

    #[error("dispatch executor is closed")]
    Closed,
}

impl From<lettre::transport::smtp::Error> for TransportError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        TransportError::Smtp(e.to_string())
    }
}

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All field-level reasons a request was rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Whether any error was reported for `field`.
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when nothing was reported.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_errors_are_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn display_lists_every_field() {
        let mut errors = ValidationErrors::new();
        errors.add("to", "recipient address is required");
        errors.add("subject", "subject is required");

        assert!(errors.has("to"));
        assert!(!errors.has("text"));
        assert_eq!(
            errors.to_string(),
            "to: recipient address is required; subject: subject is required"
        );
    }
}
