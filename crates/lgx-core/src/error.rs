//! # Error Types
//!
//! Errors shared by every LGX crate. Crate-specific failures (milestone
//! transitions, catalog loading, export) live next to the code that raises
//! them; this module holds the validation and canonicalization errors the
//! foundational types produce.

use thiserror::Error;

/// Top-level error type for the foundational LGX types.
#[derive(Error, Debug)]
pub enum LgxError {
    /// An identifier failed validation.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A taxonomy value (direction, mode, category) was not recognised.
    #[error("unknown {kind}: {value:?}")]
    UnknownVariant {
        /// Which taxonomy was being parsed.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// A date or timestamp failed to parse.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
