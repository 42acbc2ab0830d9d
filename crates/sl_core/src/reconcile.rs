//! Drift detection and repair between assignments and match documents.
//!
//! Assignment writes land in two steps: the assignment record first, then
//! the match's `referee1`/`referee2` snapshot. A failure between the two
//! leaves the match stale. The assignment record is authoritative, so
//! detection walks every ASSIGNED assignment, compares it with the slot it
//! claims, and repair rewrites the slot from the assignment.

use schemars::JsonSchema;
use serde::Serialize;

use crate::error::Result;
use crate::models::assignment::{AssignmentStatus, Referee};
use crate::models::matches::RefereeSnapshot;
use crate::store::{LeagueStore, UpdateOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictKind {
    /// The assignment points at a match id that does not exist.
    MatchNotFound,
    /// The claimed slot is empty.
    RefereeNotSetInMatch,
    /// The claimed slot names a different referee.
    RefereeMismatch,
}

impl ConflictKind {
    pub fn name(&self) -> &'static str {
        match self {
            ConflictKind::MatchNotFound => "MATCH_NOT_FOUND",
            ConflictKind::RefereeNotSetInMatch => "REFEREE_NOT_SET_IN_MATCH",
            ConflictKind::RefereeMismatch => "REFEREE_MISMATCH",
        }
    }
}

/// One detected divergence between an assignment and its match.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    pub assignment_id: String,
    pub match_id: String,
    pub position: u8,
    pub assigned_referee: Referee,
    /// Whoever currently occupies the slot, for mismatches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_referee: Option<RefereeSnapshot>,
    pub issue: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepairSummary {
    /// ASSIGNED assignments examined.
    pub checked: usize,
    pub conflicts: usize,
    pub repaired: usize,
    /// Conflicts that could not be repaired, missing matches included.
    pub errors: usize,
}

pub struct AssignmentReconciler<'a, S: LeagueStore> {
    store: &'a S,
}

impl<'a, S: LeagueStore> AssignmentReconciler<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Walk every ASSIGNED assignment and report where its match disagrees.
    ///
    /// Assignments without a position cannot claim a slot and are skipped
    /// with a warning.
    pub fn detect(&self) -> Result<Vec<Conflict>> {
        let assignments = self.store.assignments_with_status(AssignmentStatus::Assigned)?;
        let mut conflicts = Vec::new();

        for assignment in assignments {
            let Some(position) = assignment.position else {
                log::warn!(
                    "Assignment '{}' is ASSIGNED without a position; skipping",
                    assignment.id
                );
                continue;
            };
            let Some(m) = self.store.get_match(&assignment.match_id)? else {
                conflicts.push(Conflict {
                    kind: ConflictKind::MatchNotFound,
                    assignment_id: assignment.id.clone(),
                    match_id: assignment.match_id.clone(),
                    position,
                    assigned_referee: assignment.referee.clone(),
                    match_referee: None,
                    issue: format!("Match with ID {} not found", assignment.match_id),
                });
                continue;
            };
            match m.referee_slot(position) {
                None => conflicts.push(Conflict {
                    kind: ConflictKind::RefereeNotSetInMatch,
                    assignment_id: assignment.id.clone(),
                    match_id: assignment.match_id.clone(),
                    position,
                    assigned_referee: assignment.referee.clone(),
                    match_referee: None,
                    issue: format!("Referee not set in match at position {position}"),
                }),
                Some(slot) if slot.user_id != assignment.referee.user_id => {
                    conflicts.push(Conflict {
                        kind: ConflictKind::RefereeMismatch,
                        assignment_id: assignment.id.clone(),
                        match_id: assignment.match_id.clone(),
                        position,
                        assigned_referee: assignment.referee.clone(),
                        match_referee: Some(slot.clone()),
                        issue: format!(
                            "Different referee in match: assigned={}, match={}",
                            assignment.referee.user_id, slot.user_id
                        ),
                    })
                }
                Some(_) => {}
            }
        }

        log::info!("Conflict scan finished: {} conflict(s)", conflicts.len());
        Ok(conflicts)
    }

    /// Detect and fix: every repairable conflict gets the slot rewritten
    /// from the assignment record. Missing matches are counted as errors.
    ///
    /// A second detection pass right after a repair reports only the
    /// unrepairable conflicts.
    pub fn repair(&self) -> Result<RepairSummary> {
        let checked =
            self.store.assignments_with_status(AssignmentStatus::Assigned)?.len();
        let conflicts = self.detect()?;
        let total = conflicts.len();
        let mut repaired = 0;
        let mut errors = 0;

        for conflict in conflicts {
            if conflict.kind == ConflictKind::MatchNotFound {
                log::warn!(
                    "Cannot repair assignment '{}': match '{}' does not exist",
                    conflict.assignment_id,
                    conflict.match_id
                );
                errors += 1;
                continue;
            }
            let position = conflict.position;
            let snapshot = conflict.assigned_referee.snapshot();
            let outcome = self.store.update_match(&conflict.match_id, move |m| {
                *m.referee_slot_mut(position) = Some(snapshot);
                Ok(true)
            })?;
            if outcome == UpdateOutcome::Modified {
                log::info!(
                    "Repaired match '{}' position {position}: set referee '{}'",
                    conflict.match_id,
                    conflict.assigned_referee.user_id
                );
                repaired += 1;
            } else {
                log::warn!(
                    "Repair write for match '{}' position {position} did not land",
                    conflict.match_id
                );
                errors += 1;
            }
        }

        let summary = RepairSummary { checked, conflicts: total, repaired, errors };
        log::info!(
            "Repair finished: {} checked, {} conflict(s), {} repaired, {} error(s)",
            summary.checked,
            summary.conflicts,
            summary.repaired,
            summary.errors
        );
        Ok(summary)
    }
}
