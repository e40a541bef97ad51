//! # lgx-export: Milestone Snapshots
//!
//! Captures a shipment's milestone sequence as a flat, localized
//! [`Snapshot`] and renders it as JSON, YAML or CSV text.
//!
//! A snapshot's [`Snapshot::content_digest`] covers everything except the
//! capture time, so two exports of an unchanged sequence carry the same
//! digest.

pub mod error;
pub mod snapshot;

pub use error::ExportError;
pub use snapshot::{render, ExportFormat, Snapshot, SnapshotRow};
