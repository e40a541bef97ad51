//! # Milestones and Sequences
//!
//! A [`MilestoneSequence`] is an ordered list of [`Milestone`]s built once
//! from catalog [`MilestoneDefinition`]s. Positions never change after
//! construction; only the per-milestone flags and free-text fields do, and
//! only through [`crate::MilestoneTracker`].
//!
//! The read helpers here (`previous_selected`, `first_incomplete_selected_before`,
//! `first_completed_selected_after`) are the ordering primitives every rule in
//! the crate is expressed with.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use lgx_core::{MilestoneCategory, MilestoneId};

use crate::error::MilestoneError;

// ─── Definition ──────────────────────────────────────────────────────

/// Static description of a milestone as supplied by a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneDefinition {
    /// Stable identifier, unique within one sequence.
    pub id: MilestoneId,
    /// Localisation key for the display name.
    pub name_key: String,
    /// Presentation category.
    pub category: MilestoneCategory,
    /// Localisation key for the longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_key: Option<String>,
}

impl MilestoneDefinition {
    /// Convenience constructor for a definition without description.
    pub fn new(id: MilestoneId, name_key: impl Into<String>, category: MilestoneCategory) -> Self {
        Self {
            id,
            name_key: name_key.into(),
            category,
            description_key: None,
        }
    }

    /// Attach a description key.
    pub fn with_description(mut self, description_key: impl Into<String>) -> Self {
        self.description_key = Some(description_key.into());
        self
    }
}

// ─── Milestone ───────────────────────────────────────────────────────

/// One tracked step of a shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Stable identifier, unique within the sequence.
    pub id: MilestoneId,
    /// Localisation key for the display name.
    pub name_key: String,
    /// Localisation key for the description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_key: Option<String>,
    /// Presentation category.
    pub category: MilestoneCategory,
    /// Whether this milestone applies to the shipment.
    pub selected: bool,
    /// Whether the milestone has been marked done.
    pub completed: bool,
    /// Calendar date the milestone was reached.
    #[serde(default)]
    pub date: Option<String>,
    /// Free-text notes.
    #[serde(default)]
    pub details: Option<String>,
    /// Responsible party, display only.
    #[serde(default)]
    pub agent_name: Option<String>,
}

impl Milestone {
    /// Fresh, unselected, incomplete milestone for a definition.
    pub fn from_definition(def: MilestoneDefinition) -> Self {
        Self {
            id: def.id,
            name_key: def.name_key,
            description_key: def.description_key,
            category: def.category,
            selected: false,
            completed: false,
            date: None,
            details: None,
            agent_name: None,
        }
    }
}

// ─── Sequence ────────────────────────────────────────────────────────

/// Ordered milestones of one shipment. Order is list position.
///
/// Serializes as a plain list. Deserialization rejects duplicate ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Milestone>", into = "Vec<Milestone>")]
pub struct MilestoneSequence {
    milestones: Vec<Milestone>,
}

impl MilestoneSequence {
    /// Build a fresh sequence (`selected = false`, `completed = false`).
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = MilestoneDefinition>,
    ) -> Result<Self, MilestoneError> {
        Self::from_milestones(definitions.into_iter().map(Milestone::from_definition).collect())
    }

    /// Wrap existing milestones, rejecting duplicate ids.
    ///
    /// Ordering invariants are not checked here; loaded sequences go through
    /// [`MilestoneSequence::check_prefix_closed`] when handed to a tracker.
    pub fn from_milestones(milestones: Vec<Milestone>) -> Result<Self, MilestoneError> {
        let mut seen = HashSet::with_capacity(milestones.len());
        for m in &milestones {
            if !seen.insert(m.id.as_str()) {
                return Err(MilestoneError::DuplicateId {
                    id: m.id.to_string(),
                });
            }
        }
        Ok(Self { milestones })
    }

    /// Number of milestones, selected or not.
    pub fn len(&self) -> usize {
        self.milestones.len()
    }

    /// Whether the sequence has no milestones.
    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }

    /// Milestones in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Milestone> {
        self.milestones.iter()
    }

    /// Milestones as a slice.
    pub fn as_slice(&self) -> &[Milestone] {
        &self.milestones
    }

    /// Position of a milestone in the sequence.
    pub fn position(&self, id: &MilestoneId) -> Option<usize> {
        self.milestones.iter().position(|m| &m.id == id)
    }

    /// Look up a milestone by id.
    pub fn get(&self, id: &MilestoneId) -> Option<&Milestone> {
        self.milestones.iter().find(|m| &m.id == id)
    }

    /// Milestone at a position.
    pub fn at(&self, index: usize) -> Option<&Milestone> {
        self.milestones.get(index)
    }

    pub(crate) fn at_mut(&mut self, index: usize) -> Option<&mut Milestone> {
        self.milestones.get_mut(index)
    }

    /// The selected subsequence, in order.
    pub fn selected(&self) -> impl Iterator<Item = &Milestone> {
        self.milestones.iter().filter(|m| m.selected)
    }

    /// The closest selected milestone strictly before `index`.
    pub fn previous_selected(&self, index: usize) -> Option<&Milestone> {
        self.milestones[..index.min(self.len())]
            .iter()
            .rev()
            .find(|m| m.selected)
    }

    /// The earliest selected milestone before `index` that is not completed.
    pub fn first_incomplete_selected_before(&self, index: usize) -> Option<&Milestone> {
        self.milestones[..index.min(self.len())]
            .iter()
            .find(|m| m.selected && !m.completed)
    }

    /// The earliest selected milestone after `index` that is completed.
    pub fn first_completed_selected_after(&self, index: usize) -> Option<&Milestone> {
        self.milestones
            .iter()
            .skip(index.saturating_add(1))
            .find(|m| m.selected && m.completed)
    }

    /// Verify that completion is prefix-closed over the selected subsequence.
    pub fn check_prefix_closed(&self) -> Result<(), MilestoneError> {
        let mut first_open: Option<&Milestone> = None;
        for m in self.selected() {
            match (m.completed, first_open) {
                (false, None) => first_open = Some(m),
                (true, Some(open)) => {
                    return Err(MilestoneError::InvariantViolation {
                        earlier: open.id.to_string(),
                        later: m.id.to_string(),
                    })
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl TryFrom<Vec<Milestone>> for MilestoneSequence {
    type Error = MilestoneError;

    fn try_from(milestones: Vec<Milestone>) -> Result<Self, Self::Error> {
        Self::from_milestones(milestones)
    }
}

impl From<MilestoneSequence> for Vec<Milestone> {
    fn from(sequence: MilestoneSequence) -> Self {
        sequence.milestones
    }
}

impl<'a> IntoIterator for &'a MilestoneSequence {
    type Item = &'a Milestone;
    type IntoIter = std::slice::Iter<'a, Milestone>;

    fn into_iter(self) -> Self::IntoIter {
        self.milestones.iter()
    }
}
