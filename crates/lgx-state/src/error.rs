//! Errors raised by milestone operations.
//!
//! Every error leaves the sequence exactly as it was. Most variants are
//! guard rejections: the presentation layer should already have disabled the
//! control, and the tracker re-checks regardless.

use thiserror::Error;

use crate::row_state::MilestoneStatus;

/// Errors that can occur during milestone tracker operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MilestoneError {
    /// No milestone with this id exists in the sequence.
    #[error("milestone not found: {id}")]
    NotFound {
        /// The requested id.
        id: String,
    },

    /// Completion requested while a selected predecessor is still open.
    #[error("milestone {id} is blocked: selected predecessor {blocking} is not completed")]
    Blocked {
        /// The milestone that was to be completed.
        id: String,
        /// The earliest incomplete selected predecessor.
        blocking: String,
    },

    /// Reactivation requested while a selected successor is completed.
    #[error("milestone {id} cannot be reactivated: selected successor {later} is completed")]
    CompletedAfter {
        /// The milestone that was to be reactivated.
        id: String,
        /// The first completed selected successor.
        later: String,
    },

    /// Date or details edited on a milestone that is completed or blocked.
    #[error("milestone {id} is read-only while {status}")]
    ReadOnly {
        /// The milestone being edited.
        id: String,
        /// Its derived status at the time of the request.
        status: MilestoneStatus,
    },

    /// A date or details value was empty after trimming.
    #[error("milestone {id}: {field} must not be empty")]
    EmptyValue {
        /// The milestone being edited.
        id: String,
        /// Which field was empty.
        field: &'static str,
    },

    /// Re-selecting the milestone would put a completed milestone after an
    /// incomplete one in the selected subsequence.
    #[error("selecting milestone {id} conflicts with {conflicting}")]
    SelectionConflict {
        /// The milestone being selected.
        id: String,
        /// The selected milestone whose completion state conflicts.
        conflicting: String,
    },

    /// Two definitions or milestones share an id.
    #[error("duplicate milestone id: {id}")]
    DuplicateId {
        /// The repeated id.
        id: String,
    },

    /// A loaded sequence is not prefix-closed over its selected milestones.
    #[error("invariant violation: {later} is completed but earlier selected milestone {earlier} is not")]
    InvariantViolation {
        /// The incomplete selected milestone.
        earlier: String,
        /// The completed selected milestone after it.
        later: String,
    },
}

impl MilestoneError {
    /// Whether this is an ordering or editing guard rejecting a request, as
    /// opposed to a lookup or construction failure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Blocked { .. }
                | Self::CompletedAfter { .. }
                | Self::ReadOnly { .. }
                | Self::EmptyValue { .. }
                | Self::SelectionConflict { .. }
        )
    }
}
