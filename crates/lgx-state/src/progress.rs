//! Completion progress over the selected subsequence.

use serde::{Deserialize, Serialize};

use crate::milestone::MilestoneSequence;

/// Completed-versus-selected counts with a rounded percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Progress {
    /// Selected milestones that are completed.
    pub completed_count: usize,
    /// Selected milestones.
    pub selected_count: usize,
    /// `round(100 * completed / selected)`, halves rounded up; `0` when
    /// nothing is selected.
    pub percentage: u8,
}

impl Progress {
    /// Whether every selected milestone is completed (and at least one is selected).
    pub fn is_finished(&self) -> bool {
        self.selected_count > 0 && self.completed_count == self.selected_count
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} ({}%)",
            self.completed_count, self.selected_count, self.percentage
        )
    }
}

/// Compute progress for a sequence. Unselected milestones are ignored even
/// when they carry a completed flag.
pub fn progress(sequence: &MilestoneSequence) -> Progress {
    let (completed_count, selected_count) = sequence
        .selected()
        .fold((0usize, 0usize), |(done, total), m| {
            (done + usize::from(m.completed), total + 1)
        });
    Progress {
        completed_count,
        selected_count,
        percentage: percentage(completed_count, selected_count),
    }
}

fn percentage(completed: usize, selected: usize) -> u8 {
    if selected == 0 {
        return 0;
    }
    // floor(100c/s + 1/2) in integers.
    let (c, s) = (completed as u64, selected as u64);
    let pct = (200 * c + s) / (2 * s);
    u8::try_from(pct.min(100)).unwrap_or(100)
}
