//! # Derived Row State
//!
//! [`compute_row_state`] answers "what may the user do with this milestone
//! right now?" from the sequence alone. It is recomputed on every read and
//! never cached, so it cannot drift from the flags it is derived from.
//!
//! ## Status machine
//!
//! ```text
//!                 all predecessors complete
//!   NOT_REACHED ───────────────────────────▶ AVAILABLE
//!                                              │   ▲
//!                                   complete() │   │ reactivate()
//!                                              ▼   │
//!                                         COMPLETED_FINAL
//!                                              │   ▲
//!                         a later milestone    │   │ the later milestone
//!                         completes            ▼   │ is reactivated
//!                                         COMPLETED_LOCKED
//! ```
//!
//! Only `complete()` and `reactivate()` are stored transitions; every other
//! edge is derived. Unselected milestones report `EXCLUDED`.

use serde::{Deserialize, Serialize};

use lgx_core::MilestoneId;

use crate::milestone::MilestoneSequence;

/// Interaction flags for one milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowState {
    /// No selected milestone precedes this one, or the closest selected
    /// predecessor is completed.
    pub is_previous_completed: bool,
    /// The milestone can be marked complete now.
    pub can_complete: bool,
    /// An incomplete selected predecessor prevents completion and editing.
    pub is_blocked: bool,
    /// The milestone is completed and is the last completed selected one.
    pub can_reactivate: bool,
    /// Some selected milestone strictly after this one is completed.
    pub has_completed_after: bool,
    /// Whether the milestone is completed.
    pub completed: bool,
}

impl RowState {
    /// Collapse the flags into a single status for a milestone with the
    /// given selection.
    pub fn status(&self, selected: bool) -> MilestoneStatus {
        if !selected {
            MilestoneStatus::Excluded
        } else if self.completed && self.can_reactivate {
            MilestoneStatus::CompletedFinal
        } else if self.completed {
            MilestoneStatus::CompletedLocked
        } else if self.can_complete {
            MilestoneStatus::Available
        } else {
            MilestoneStatus::NotReached
        }
    }

    /// Whether date and details may be edited.
    pub fn is_editable(&self) -> bool {
        !self.completed && !self.is_blocked
    }
}

/// Derived lifecycle status of a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilestoneStatus {
    /// Blocked by an incomplete selected predecessor.
    NotReached,
    /// Can be completed now.
    Available,
    /// Completed and still reactivatable.
    CompletedFinal,
    /// Completed, with a later selected milestone also completed.
    CompletedLocked,
    /// Not selected for this shipment.
    Excluded,
}

impl MilestoneStatus {
    /// All statuses in display order.
    pub fn all() -> &'static [MilestoneStatus] {
        &[
            Self::NotReached,
            Self::Available,
            Self::CompletedFinal,
            Self::CompletedLocked,
            Self::Excluded,
        ]
    }

    /// Canonical name, matching the serde format.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotReached => "NOT_REACHED",
            Self::Available => "AVAILABLE",
            Self::CompletedFinal => "COMPLETED_FINAL",
            Self::CompletedLocked => "COMPLETED_LOCKED",
            Self::Excluded => "EXCLUDED",
        }
    }
}

impl std::fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Compute the interaction flags of milestone `id`.
///
/// Returns `None` when the id is not in the sequence.
pub fn compute_row_state(sequence: &MilestoneSequence, id: &MilestoneId) -> Option<RowState> {
    let index = sequence.position(id)?;
    row_state_at(sequence, index)
}

pub(crate) fn row_state_at(sequence: &MilestoneSequence, index: usize) -> Option<RowState> {
    let milestone = sequence.at(index)?;
    let completed = milestone.completed;
    let is_previous_completed = sequence
        .previous_selected(index)
        .map_or(true, |prev| prev.completed);
    let has_completed_after = sequence.first_completed_selected_after(index).is_some();

    Some(RowState {
        is_previous_completed,
        can_complete: is_previous_completed && !completed,
        is_blocked: !is_previous_completed && !completed,
        can_reactivate: completed && !has_completed_after,
        has_completed_after,
        completed,
    })
}
