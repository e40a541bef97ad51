//! Export errors.

use thiserror::Error;

/// Errors raised while rendering or digesting a snapshot.
#[derive(Debug, Error)]
pub enum ExportError {
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// CSV writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Rendered CSV was not valid UTF-8.
    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Canonicalization for the content digest failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] lgx_core::CanonicalizationError),

    /// Export format name not recognised.
    #[error("unknown export format: {0:?} (expected json, yaml or csv)")]
    UnknownFormat(String),
}
