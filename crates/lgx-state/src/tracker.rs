//! # Milestone Tracker
//!
//! [`MilestoneTracker`] is the only way to mutate a [`MilestoneSequence`].
//! Each operation validates first and writes second, so a rejected request
//! leaves every field untouched, notifies nobody and logs nothing to the
//! transition log.
//!
//! ## Operations
//!
//! | Operation            | Guard                                                        |
//! |----------------------|--------------------------------------------------------------|
//! | `toggle_selected`    | re-selection must keep completion prefix-closed              |
//! | `set_completed(true)`| every selected predecessor completed                         |
//! | `set_completed(false)`| no selected successor completed                             |
//! | `set_date`/`set_details` | milestone neither completed nor blocked, value non-empty |
//! | `assign_agent`       | none                                                         |
//! | `replace_definitions`| none; `Reconcile` repairs prefix closure after carrying over |
//!
//! Every successful mutation appends a [`TransitionRecord`] and calls each
//! registered [`SequenceListener`] with the full updated sequence.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use lgx_core::{MilestoneId, Timestamp};

use crate::error::MilestoneError;
use crate::milestone::{Milestone, MilestoneDefinition, MilestoneSequence};
use crate::progress::{progress, Progress};
use crate::row_state::{row_state_at, RowState};

// ─── Listener ────────────────────────────────────────────────────────

/// Receives the full sequence after every successful mutation.
pub trait SequenceListener {
    /// Called once per accepted mutation, after the change is applied.
    fn sequence_changed(&mut self, sequence: &MilestoneSequence);
}

impl<F> SequenceListener for F
where
    F: FnMut(&MilestoneSequence),
{
    fn sequence_changed(&mut self, sequence: &MilestoneSequence) {
        self(sequence)
    }
}

// ─── Transition Record ───────────────────────────────────────────────

/// What an accepted mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionAction {
    /// Milestone added to the selected subsequence.
    Selected,
    /// Milestone removed from the selected subsequence.
    Deselected,
    /// Milestone marked complete.
    Completed,
    /// Completed milestone reverted to incomplete.
    Reactivated,
    /// Date set.
    DateSet,
    /// Date cleared.
    DateCleared,
    /// Details set.
    DetailsSet,
    /// Details cleared.
    DetailsCleared,
    /// Agent assigned or cleared.
    AgentAssigned,
    /// The whole definition list was replaced.
    DefinitionsReplaced,
}

impl TransitionAction {
    /// Canonical name, matching the serde format.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Selected => "SELECTED",
            Self::Deselected => "DESELECTED",
            Self::Completed => "COMPLETED",
            Self::Reactivated => "REACTIVATED",
            Self::DateSet => "DATE_SET",
            Self::DateCleared => "DATE_CLEARED",
            Self::DetailsSet => "DETAILS_SET",
            Self::DetailsCleared => "DETAILS_CLEARED",
            Self::AgentAssigned => "AGENT_ASSIGNED",
            Self::DefinitionsReplaced => "DEFINITIONS_REPLACED",
        }
    }
}

impl std::fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Audit entry for one accepted mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The milestone affected; `None` for sequence-wide actions.
    pub milestone_id: Option<MilestoneId>,
    /// What happened.
    pub action: TransitionAction,
    /// When it happened (UTC).
    pub timestamp: Timestamp,
    /// Extra context, e.g. the reconcile summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// ─── Definition Replacement ──────────────────────────────────────────

/// How to treat existing state when the definition list changes shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacePolicy {
    /// Start over: every milestone unselected and incomplete.
    Reset,
    /// Carry selection, completion, date, details and agent over for ids
    /// present in both lists, then clear completion on selected milestones
    /// that would otherwise follow an incomplete selected one.
    Reconcile,
}

impl ReplacePolicy {
    /// Returns the snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Reconcile => "reconcile",
        }
    }
}

impl std::fmt::Display for ReplacePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReplacePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reset" => Ok(Self::Reset),
            "reconcile" => Ok(Self::Reconcile),
            other => Err(format!("unknown replace policy: {other:?} (expected reset or reconcile)")),
        }
    }
}

/// Result of [`MilestoneTracker::replace_definitions`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReplaceOutcome {
    /// Milestones whose state was carried over.
    pub carried: usize,
    /// Milestones whose completion was cleared to restore prefix closure.
    pub repaired: Vec<MilestoneId>,
    /// Old ids absent from the new definitions.
    pub dropped: Vec<MilestoneId>,
}

// ─── Tracker ─────────────────────────────────────────────────────────

/// Owner of one shipment's milestone sequence.
pub struct MilestoneTracker {
    sequence: MilestoneSequence,
    transition_log: Vec<TransitionRecord>,
    listeners: Vec<Box<dyn SequenceListener>>,
}

impl std::fmt::Debug for MilestoneTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MilestoneTracker")
            .field("sequence", &self.sequence)
            .field("transition_log", &self.transition_log)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl MilestoneTracker {
    /// Start tracking a fresh sequence built from catalog definitions.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = MilestoneDefinition>,
    ) -> Result<Self, MilestoneError> {
        Self::new(MilestoneSequence::from_definitions(definitions)?)
    }

    /// Track an existing sequence. Rejects sequences that are not
    /// prefix-closed.
    pub fn new(sequence: MilestoneSequence) -> Result<Self, MilestoneError> {
        Self::restore(sequence, Vec::new())
    }

    /// Resume a persisted session: sequence plus its transition log.
    pub fn restore(
        sequence: MilestoneSequence,
        transition_log: Vec<TransitionRecord>,
    ) -> Result<Self, MilestoneError> {
        sequence.check_prefix_closed()?;
        Ok(Self {
            sequence,
            transition_log,
            listeners: Vec::new(),
        })
    }

    /// Register a listener for accepted mutations.
    pub fn subscribe(&mut self, listener: impl SequenceListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// The current sequence.
    pub fn sequence(&self) -> &MilestoneSequence {
        &self.sequence
    }

    /// Give up the tracker, keeping sequence and log.
    pub fn into_parts(self) -> (MilestoneSequence, Vec<TransitionRecord>) {
        (self.sequence, self.transition_log)
    }

    /// Append-only log of accepted mutations.
    pub fn transition_log(&self) -> &[TransitionRecord] {
        &self.transition_log
    }

    /// Derived interaction flags for `id`.
    pub fn row_state(&self, id: &MilestoneId) -> Option<RowState> {
        crate::row_state::compute_row_state(&self.sequence, id)
    }

    /// Completion progress over the selected subsequence.
    pub fn progress(&self) -> Progress {
        progress(&self.sequence)
    }

    /// Re-validate prefix closure of the whole sequence.
    pub fn check_invariants(&self) -> Result<(), MilestoneError> {
        self.sequence.check_prefix_closed()
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Flip `selected` on `id`. Returns the new selection state.
    ///
    /// Deselecting is always allowed. Selecting is refused when it would
    /// place the milestone's completion out of order with the selected
    /// milestones around it.
    pub fn toggle_selected(&mut self, id: &MilestoneId) -> Result<bool, MilestoneError> {
        let index = self.index_of(id)?;
        let milestone = &self.sequence.as_slice()[index];

        if !milestone.selected {
            let conflict = if milestone.completed {
                self.sequence.first_incomplete_selected_before(index)
            } else {
                self.sequence.first_completed_selected_after(index)
            };
            if let Some(other) = conflict {
                let err = MilestoneError::SelectionConflict {
                    id: id.to_string(),
                    conflicting: other.id.to_string(),
                };
                return Err(reject(err));
            }
        }

        let selected = {
            let m = self.milestone_mut(index)?;
            m.selected = !m.selected;
            m.selected
        };
        let action = if selected {
            TransitionAction::Selected
        } else {
            TransitionAction::Deselected
        };
        self.commit(Some(id), action, None);
        Ok(selected)
    }

    // ── Completion ───────────────────────────────────────────────────

    /// Mark `id` complete (`true`) or reactivate it (`false`).
    ///
    /// Setting the flag to the value it already has succeeds without
    /// notifying listeners.
    pub fn set_completed(&mut self, id: &MilestoneId, value: bool) -> Result<(), MilestoneError> {
        let index = self.index_of(id)?;
        if self.sequence.as_slice()[index].completed == value {
            return Ok(());
        }

        if value {
            if let Some(open) = self.sequence.first_incomplete_selected_before(index) {
                return Err(reject(MilestoneError::Blocked {
                    id: id.to_string(),
                    blocking: open.id.to_string(),
                }));
            }
        } else if let Some(later) = self.sequence.first_completed_selected_after(index) {
            return Err(reject(MilestoneError::CompletedAfter {
                id: id.to_string(),
                later: later.id.to_string(),
            }));
        }

        self.milestone_mut(index)?.completed = value;
        let action = if value {
            TransitionAction::Completed
        } else {
            TransitionAction::Reactivated
        };
        self.commit(Some(id), action, None);
        Ok(())
    }

    /// Shorthand for `set_completed(id, true)`.
    pub fn complete(&mut self, id: &MilestoneId) -> Result<(), MilestoneError> {
        self.set_completed(id, true)
    }

    /// Shorthand for `set_completed(id, false)`.
    pub fn reactivate(&mut self, id: &MilestoneId) -> Result<(), MilestoneError> {
        self.set_completed(id, false)
    }

    // ── Date and details ─────────────────────────────────────────────

    /// Set the milestone date. No calendar validation happens here.
    pub fn set_date(&mut self, id: &MilestoneId, date: impl Into<String>) -> Result<(), MilestoneError> {
        let index = self.editable_index(id)?;
        let value = non_empty(id, "date", date.into())?;
        self.milestone_mut(index)?.date = Some(value);
        self.commit(Some(id), TransitionAction::DateSet, None);
        Ok(())
    }

    /// Remove the milestone date.
    pub fn clear_date(&mut self, id: &MilestoneId) -> Result<(), MilestoneError> {
        let index = self.editable_index(id)?;
        if self.milestone_mut(index)?.date.take().is_some() {
            self.commit(Some(id), TransitionAction::DateCleared, None);
        }
        Ok(())
    }

    /// Set free-text details.
    pub fn set_details(&mut self, id: &MilestoneId, text: impl Into<String>) -> Result<(), MilestoneError> {
        let index = self.editable_index(id)?;
        let value = non_empty(id, "details", text.into())?;
        self.milestone_mut(index)?.details = Some(value);
        self.commit(Some(id), TransitionAction::DetailsSet, None);
        Ok(())
    }

    /// Remove free-text details.
    pub fn clear_details(&mut self, id: &MilestoneId) -> Result<(), MilestoneError> {
        let index = self.editable_index(id)?;
        if self.milestone_mut(index)?.details.take().is_some() {
            self.commit(Some(id), TransitionAction::DetailsCleared, None);
        }
        Ok(())
    }

    /// Assign the responsible agent. `None` or a blank name clears it.
    ///
    /// Allowed for any known id, whatever its status.
    pub fn assign_agent(&mut self, id: &MilestoneId, agent: Option<String>) -> Result<(), MilestoneError> {
        let index = self.index_of(id)?;
        let agent = agent
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        self.milestone_mut(index)?.agent_name = agent;
        self.commit(Some(id), TransitionAction::AgentAssigned, None);
        Ok(())
    }

    // ── Definition replacement ───────────────────────────────────────

    /// Swap in a new definition list, e.g. after the shipment's direction or
    /// transport mode changed.
    pub fn replace_definitions(
        &mut self,
        definitions: impl IntoIterator<Item = MilestoneDefinition>,
        policy: ReplacePolicy,
    ) -> Result<ReplaceOutcome, MilestoneError> {
        let mut next = MilestoneSequence::from_definitions(definitions)?;
        let mut outcome = ReplaceOutcome::default();

        if policy == ReplacePolicy::Reconcile {
            let old: HashMap<&MilestoneId, &Milestone> =
                self.sequence.iter().map(|m| (&m.id, m)).collect();
            for index in 0..next.len() {
                let Some(target) = next.at_mut(index) else {
                    continue;
                };
                if let Some(prev) = old.get(&target.id) {
                    target.selected = prev.selected;
                    target.completed = prev.completed;
                    target.date = prev.date.clone();
                    target.details = prev.details.clone();
                    target.agent_name = prev.agent_name.clone();
                    outcome.carried += 1;
                }
            }
            outcome.repaired = repair_prefix_closure(&mut next);
        }

        outcome.dropped = self
            .sequence
            .iter()
            .filter(|m| next.get(&m.id).is_none())
            .map(|m| m.id.clone())
            .collect();

        tracing::info!(
            %policy,
            carried = outcome.carried,
            repaired = outcome.repaired.len(),
            dropped = outcome.dropped.len(),
            "milestone definitions replaced"
        );

        self.sequence = next;
        let note = format!(
            "policy={policy} carried={} repaired={} dropped={}",
            outcome.carried,
            outcome.repaired.len(),
            outcome.dropped.len()
        );
        self.commit(None, TransitionAction::DefinitionsReplaced, Some(note));
        Ok(outcome)
    }

    // ── Internals ────────────────────────────────────────────────────

    fn index_of(&self, id: &MilestoneId) -> Result<usize, MilestoneError> {
        self.sequence.position(id).ok_or_else(|| {
            tracing::debug!(milestone = %id, "unknown milestone");
            MilestoneError::NotFound { id: id.to_string() }
        })
    }

    fn milestone_mut(&mut self, index: usize) -> Result<&mut Milestone, MilestoneError> {
        let len = self.sequence.len();
        self.sequence.at_mut(index).ok_or(MilestoneError::NotFound {
            id: format!("#{index} of {len}"),
        })
    }

    fn editable_index(&self, id: &MilestoneId) -> Result<usize, MilestoneError> {
        let index = self.index_of(id)?;
        let selected = self.sequence.as_slice()[index].selected;
        match row_state_at(&self.sequence, index) {
            Some(rs) if rs.is_editable() => Ok(index),
            Some(rs) => Err(reject(MilestoneError::ReadOnly {
                id: id.to_string(),
                status: rs.status(selected),
            })),
            None => Err(MilestoneError::NotFound { id: id.to_string() }),
        }
    }

    fn commit(&mut self, id: Option<&MilestoneId>, action: TransitionAction, note: Option<String>) {
        tracing::debug!(
            milestone = id.map(MilestoneId::as_str).unwrap_or("*"),
            %action,
            "milestone transition accepted"
        );
        self.transition_log.push(TransitionRecord {
            milestone_id: id.cloned(),
            action,
            timestamp: Timestamp::now(),
            note,
        });
        for listener in self.listeners.iter_mut() {
            listener.sequence_changed(&self.sequence);
        }
    }
}

fn reject(err: MilestoneError) -> MilestoneError {
    tracing::debug!(error = %err, "milestone transition rejected");
    err
}

fn non_empty(id: &MilestoneId, field: &'static str, value: String) -> Result<String, MilestoneError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(reject(MilestoneError::EmptyValue {
            id: id.to_string(),
            field,
        }));
    }
    Ok(trimmed.to_string())
}

/// Clear completion on every selected milestone that follows the first
/// incomplete selected one. Returns the ids that were cleared.
fn repair_prefix_closure(sequence: &mut MilestoneSequence) -> Vec<MilestoneId> {
    let mut repaired = Vec::new();
    let mut seen_open = false;
    for index in 0..sequence.len() {
        let Some(m) = sequence.at_mut(index) else {
            continue;
        };
        if !m.selected {
            continue;
        }
        if !m.completed {
            seen_open = true;
        } else if seen_open {
            m.completed = false;
            repaired.push(m.id.clone());
        }
    }
    repaired
}
