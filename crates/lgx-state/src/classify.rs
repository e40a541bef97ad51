//! # Category and Department Classification
//!
//! Dashboards group milestones by category for colouring and route them to
//! a department for the agent work queues. Both views are computed from the
//! sequence on demand; neither affects ordering.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use lgx_core::{Department, MilestoneCategory};

use crate::milestone::{Milestone, MilestoneSequence};
use crate::row_state::row_state_at;

/// Counts for one group of milestones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Milestones in the group, selected or not.
    pub total: usize,
    /// Selected milestones in the group.
    pub selected: usize,
    /// Selected and completed milestones in the group.
    pub completed: usize,
    /// Selected milestones still open.
    pub pending: usize,
}

impl GroupSummary {
    fn add(&mut self, m: &Milestone) {
        self.total += 1;
        if m.selected {
            self.selected += 1;
            if m.completed {
                self.completed += 1;
            } else {
                self.pending += 1;
            }
        }
    }
}

/// Summary per category. Every category appears, in canonical order, even
/// when the sequence has no milestone of that category.
pub fn summarize_by_category(
    sequence: &MilestoneSequence,
) -> BTreeMap<MilestoneCategory, GroupSummary> {
    let mut out: BTreeMap<MilestoneCategory, GroupSummary> = MilestoneCategory::all()
        .iter()
        .map(|c| (*c, GroupSummary::default()))
        .collect();
    for m in sequence {
        out.entry(m.category).or_default().add(m);
    }
    out
}

/// Summary per department, using [`MilestoneCategory::department`].
pub fn summarize_by_department(sequence: &MilestoneSequence) -> BTreeMap<Department, GroupSummary> {
    let mut out: BTreeMap<Department, GroupSummary> = Department::all()
        .iter()
        .map(|d| (*d, GroupSummary::default()))
        .collect();
    for m in sequence {
        out.entry(m.category.department()).or_default().add(m);
    }
    out
}

/// Selected, incomplete milestones owned by `department`, in sequence order.
pub fn pending_for_department(sequence: &MilestoneSequence, department: Department) -> Vec<&Milestone> {
    sequence
        .iter()
        .filter(|m| m.selected && !m.completed && m.category.department() == department)
        .collect()
}

/// The first selected milestone that can be completed right now.
pub fn next_actionable(sequence: &MilestoneSequence) -> Option<&Milestone> {
    sequence.iter().enumerate().find_map(|(i, m)| {
        let can_complete = m.selected && row_state_at(sequence, i).is_some_and(|rs| rs.can_complete);
        can_complete.then_some(m)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milestone::MilestoneDefinition;
    use lgx_core::MilestoneId;

    fn seq(rows: &[(&str, MilestoneCategory, bool, bool)]) -> MilestoneSequence {
        let milestones = rows
            .iter()
            .map(|(id, category, selected, completed)| {
                let mut m = Milestone::from_definition(MilestoneDefinition::new(
                    MilestoneId::new(*id).unwrap(),
                    *id,
                    *category,
                ));
                m.selected = *selected;
                m.completed = *completed;
                m
            })
            .collect();
        MilestoneSequence::from_milestones(milestones).unwrap()
    }

    fn sample() -> MilestoneSequence {
        use MilestoneCategory::*;
        seq(&[
            ("booking", Operations, true, true),
            ("declaration", Customs, true, true),
            ("inspection", Customs, false, false),
            ("departure", Transport, true, false),
            ("invoice", Commercial, true, false),
        ])
    }

    #[test]
    fn category_summary_counts() {
        let summary = summarize_by_category(&sample());
        assert_eq!(summary.len(), MilestoneCategory::all().len());
        let customs = summary[&MilestoneCategory::Customs];
        assert_eq!(customs.total, 2);
        assert_eq!(customs.selected, 1);
        assert_eq!(customs.completed, 1);
        assert_eq!(customs.pending, 0);
        assert_eq!(summary[&MilestoneCategory::Logistics], GroupSummary::default());
    }

    #[test]
    fn department_summary_folds_transport_into_operations() {
        let summary = summarize_by_department(&sample());
        let ops = summary[&Department::Operations];
        assert_eq!(ops.total, 2);
        assert_eq!(ops.completed, 1);
        assert_eq!(ops.pending, 1);
        assert_eq!(summary[&Department::Finance].pending, 1);
    }

    #[test]
    fn pending_queue_per_department() {
        let s = sample();
        let finance: Vec<_> = pending_for_department(&s, Department::Finance)
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(finance, vec!["invoice"]);
        assert!(pending_for_department(&s, Department::Customs).is_empty());
    }

    #[test]
    fn next_actionable_skips_completed_and_unselected() {
        let s = sample();
        assert_eq!(next_actionable(&s).unwrap().id.as_str(), "departure");
    }

    #[test]
    fn next_actionable_none_when_finished_or_empty() {
        use MilestoneCategory::*;
        let done = seq(&[("a", Operations, true, true), ("b", Customs, false, false)]);
        assert!(next_actionable(&done).is_none());
        assert!(next_actionable(&MilestoneSequence::default()).is_none());
    }
}
