//! Commerce error types.

use storefront_fetch::FetchError;
use storefront_store::StoreError;
use thiserror::Error;

/// Errors that can occur in storefront operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// No size was selected for a sized product.
    #[error("Please select a size")]
    SizeRequired,

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// An add-to-cart run stopped part way. Earlier units stay in the cart.
    #[error("Added {added} of {requested} item(s): {message}")]
    PartialAdd {
        added: u32,
        requested: u32,
        message: String,
    },

    /// Review not found in the loaded list.
    #[error("Review not found: {0}")]
    ReviewNotFound(String),

    /// The action needs a logged-in user.
    #[error("Please log in to continue")]
    NotAuthenticated,

    /// The user may not perform this action.
    #[error("Not allowed: {0}")]
    NotAuthorized(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The API answered but reported failure.
    #[error("{0}")]
    Api(String),

    /// Transport or HTTP failure.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Storage error.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CommerceError {
    /// Message suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            CommerceError::Fetch(e) => e.user_message(),
            CommerceError::Store(_) | CommerceError::SerializationError(_) => {
                "Something went wrong. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}
