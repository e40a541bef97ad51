//! Catalog and message table errors.

use std::path::PathBuf;

use lgx_core::{ShipmentDirection, TransportMode};
use thiserror::Error;

/// Errors raised while loading or querying catalogs and message tables.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog has no template for this combination.
    #[error("no milestone template for {direction} {mode}")]
    MissingTemplate {
        direction: ShipmentDirection,
        mode: TransportMode,
    },

    /// Two templates in one catalog target the same combination.
    #[error("duplicate milestone template for {direction} {mode}")]
    DuplicateTemplate {
        direction: ShipmentDirection,
        mode: TransportMode,
    },

    /// A template lists the same milestone id twice.
    #[error("template {direction} {mode} lists milestone {id} more than once")]
    DuplicateMilestone {
        direction: ShipmentDirection,
        mode: TransportMode,
        id: String,
    },

    /// A template has no milestones.
    #[error("template {direction} {mode} has no milestones")]
    EmptyTemplate {
        direction: ShipmentDirection,
        mode: TransportMode,
    },

    /// A milestone id failed validation.
    #[error("invalid milestone id: {0}")]
    InvalidId(#[from] lgx_core::LgxError),

    /// Locale identifier not recognised.
    #[error("unknown locale: {0:?} (expected en or es)")]
    UnknownLocale(String),

    /// YAML parsing failed for a file on disk.
    #[error("failed to parse YAML at {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// Reading a file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parsing failed for an in-memory document.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
