//! # lgx-cli: Command-Line Front End for LGX
//!
//! Provides the `lgx` binary. Each invocation loads one shipment session,
//! applies at most one mutation through `lgx_state::MilestoneTracker`, and
//! writes the session back only if the tracker reported a change.
//!
//! ## Subcommands
//!
//! - `lgx init`: start a session from a catalog template.
//! - `lgx select | complete | reactivate`: selection and completion.
//! - `lgx date | details | assign`: per-milestone fields.
//! - `lgx status | progress | list`: read-only views.
//! - `lgx export`: JSON, YAML or CSV snapshot.
//! - `lgx retype`: swap the template after a direction or mode change.
//!
//! ```bash
//! lgx init --shipment SHP-1 --direction import --mode sea --select-all
//! lgx complete --shipment SHP-1 --milestone order_received
//! lgx export --shipment SHP-1 --format csv --out shp-1.csv
//! ```
//!
//! Guard rejections print `REJECTED: <reason>` and exit with status 2.
//! Any other failure exits with status 1.

pub mod commands;
pub mod config;
pub mod render;
pub mod session;
pub mod theme;

use std::path::{Path, PathBuf};

/// Resolve a path that may be relative to a base directory.
///
/// Absolute paths are returned as-is. A relative path that exists under
/// `base` resolves there; otherwise it is taken relative to the current
/// directory.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let based = base.join(path);
    if based.exists() {
        based
    } else {
        path.to_path_buf()
    }
}
