//! Authentication errors.

use storefront_fetch::FetchError;
use storefront_store::StoreError;
use thiserror::Error;

use crate::validation::FieldErrors;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// One or more form fields are invalid. Nothing was sent.
    #[error("invalid input: {0}")]
    Validation(FieldErrors),

    /// The server refused the request and said why.
    #[error("{0}")]
    Rejected(String),

    /// The server reported success but the body was incomplete.
    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    /// No session is stored.
    #[error("not logged in")]
    NotLoggedIn,

    /// Transport or HTTP failure.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl AuthError {
    /// Check if this is a form validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, AuthError::Validation(_))
    }

    /// Check if the server turned the credentials down.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            AuthError::Rejected(_) | AuthError::NotLoggedIn => true,
            AuthError::Fetch(e) => matches!(e.status(), Some(401) | Some(403)),
            _ => false,
        }
    }

    /// Field errors, when this is a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AuthError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Message suitable for a toast or a form-level error line.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Validation(_) => "Please fix the highlighted fields".to_string(),
            AuthError::Rejected(message) => message.clone(),
            AuthError::Fetch(e) => e.user_message(),
            AuthError::NotLoggedIn => "Please log in to continue".to_string(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(e: serde_json::Error) -> Self {
        AuthError::Serialization(e.to_string())
    }
}
