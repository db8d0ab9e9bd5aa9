//! Store error types.

use thiserror::Error;

/// Errors that can occur when using the store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing storage cannot be used.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Failed to serialize or parse a value.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to read or write the backing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored value carries a schema version this build cannot read.
    #[error("Unsupported schema version for {key}: found {found}, expected {expected}")]
    UnsupportedVersion {
        key: &'static str,
        found: u32,
        expected: u32,
    },

    /// The stored value has an unrecognised shape.
    #[error("Corrupt value for {key}: {reason}")]
    Corrupt { key: &'static str, reason: String },
}
