//! # lgx-state: Sequential Milestone Tracker
//!
//! Owns the ordered list of shipment milestones and enforces the rules that
//! make it a timeline rather than a checklist.
//!
//! ## Rules
//!
//! Ordering is evaluated over the *selected subsequence* only: milestones
//! with `selected == false` do not apply to the shipment and are skipped
//! when looking for predecessors and successors.
//!
//! 1. Completion is prefix-closed: if a selected milestone is complete,
//!    every selected milestone before it is complete.
//! 2. A milestone may be completed only when every selected predecessor is.
//! 3. A milestone may be reactivated only when no selected successor is
//!    complete.
//! 4. Date and details are editable only while the milestone is neither
//!    completed nor blocked.
//!
//! ## Layout
//!
//! - [`milestone`]: `Milestone`, `MilestoneDefinition`, `MilestoneSequence`.
//! - [`row_state`]: pure derived state per milestone (`RowState`,
//!   `MilestoneStatus`), recomputed on every read and never stored.
//! - [`progress`]: completion percentage over the selected subsequence.
//! - [`classify`]: category and department summaries.
//! - [`tracker`]: `MilestoneTracker`, the only mutation path. Rejected
//!   requests return `Err` and leave the sequence untouched.

pub mod classify;
pub mod error;
pub mod milestone;
pub mod progress;
pub mod row_state;
pub mod tracker;

// ─── Sequence re-exports ─────────────────────────────────────────────

pub use milestone::{Milestone, MilestoneDefinition, MilestoneSequence};

// ─── Derived state re-exports ────────────────────────────────────────

pub use progress::{progress, Progress};
pub use row_state::{compute_row_state, MilestoneStatus, RowState};

// ─── Classification re-exports ───────────────────────────────────────

pub use classify::{
    next_actionable, pending_for_department, summarize_by_category, summarize_by_department,
    GroupSummary,
};

// ─── Tracker re-exports ──────────────────────────────────────────────

pub use error::MilestoneError;
pub use tracker::{
    MilestoneTracker, ReplaceOutcome, ReplacePolicy, SequenceListener, TransitionAction,
    TransitionRecord,
};
