//! Referee assignment lifecycle and its denormalized match snapshot.
//!
//! The assignment record is authoritative. Status changes write the
//! assignment first and then sync the match's `referee1`/`referee2` slot in
//! a second, separate write; the gap between the two is the drift the
//! reconciler detects and repairs. Deletion is the exception and removes
//! both sides in one store transaction.

use chrono::Utc;
use uuid::Uuid;

use crate::error::{LeagueError, Result};
use crate::models::assignment::{Assignment, AssignmentStatus};
use crate::models::user::{Role, User};
use crate::store::{LeagueStore, UpdateOutcome};

/// Roles allowed to manage assignments for other referees.
pub const ASSIGNMENT_ADMIN_ROLES: &[Role] = &[Role::Admin, Role::RefAdmin];

/// Transitions an assignment admin may drive.
const ADMIN_TRANSITIONS: &[(AssignmentStatus, AssignmentStatus)] = &[
    (AssignmentStatus::Requested, AssignmentStatus::Assigned),
    (AssignmentStatus::Assigned, AssignmentStatus::Unavailable),
    (AssignmentStatus::Accepted, AssignmentStatus::Unavailable),
    (AssignmentStatus::Declined, AssignmentStatus::Requested),
];

/// Transitions a referee may drive on their own assignment.
const REFEREE_TRANSITIONS: &[(AssignmentStatus, AssignmentStatus)] = &[
    (AssignmentStatus::Unavailable, AssignmentStatus::Requested),
    (AssignmentStatus::Requested, AssignmentStatus::Unavailable),
    (AssignmentStatus::Assigned, AssignmentStatus::Accepted),
    (AssignmentStatus::Assigned, AssignmentStatus::Declined),
];

fn allows(table: &[(AssignmentStatus, AssignmentStatus)], from: AssignmentStatus, to: AssignmentStatus) -> bool {
    table.contains(&(from, to))
}

pub struct AssignmentService<'a, S: LeagueStore> {
    store: &'a S,
}

impl<'a, S: LeagueStore> AssignmentService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn get(&self, assignment_id: &str) -> Result<Assignment> {
        self.store
            .get_assignment(assignment_id)?
            .ok_or_else(|| LeagueError::not_found("Assignment", assignment_id))
    }

    /// All assignments of a match, ordered by referee name.
    pub fn for_match(&self, match_id: &str) -> Result<Vec<Assignment>> {
        let mut assignments = self.store.assignments_for_match(match_id)?;
        assignments.sort_by(|a, b| {
            (&a.referee.first_name, &a.referee.last_name)
                .cmp(&(&b.referee.first_name, &b.referee.last_name))
        });
        Ok(assignments)
    }

    /// Create an assignment for a referee on a match.
    ///
    /// Admins may open an assignment in any status on behalf of any
    /// referee; a referee may only request themselves in or out
    /// (REQUESTED/UNAVAILABLE). The referee snapshot is built from the
    /// stored user record, which must hold the REFEREE role.
    pub fn create(
        &self,
        match_id: &str,
        referee_user_id: &str,
        status: AssignmentStatus,
        position: Option<u8>,
        acting: &User,
    ) -> Result<Assignment> {
        check_position(position)?;
        if self.store.get_match(match_id)?.is_none() {
            return Err(LeagueError::not_found("Match", match_id));
        }
        if self
            .store
            .assignments_for_match(match_id)?
            .iter()
            .any(|a| a.referee.user_id == referee_user_id)
        {
            return Err(LeagueError::validation_in(
                "referee",
                format!("Assignment already exists for referee '{referee_user_id}'"),
                format!("match_id={match_id}"),
            ));
        }

        let referee = self
            .store
            .get_user(referee_user_id)?
            .and_then(|u| u.referee_record())
            .ok_or_else(|| LeagueError::not_found("Referee", referee_user_id))?;

        let is_admin = acting.roles.has_any(ASSIGNMENT_ADMIN_ROLES);
        let is_self = acting.roles.has(Role::Referee) && acting.id == referee_user_id;
        if !is_admin {
            if !is_self {
                return Err(LeagueError::forbidden(
                    "Assignment creation requires an assignment admin role or the referee themselves",
                    ASSIGNMENT_ADMIN_ROLES,
                    acting.roles.as_slice(),
                ));
            }
            if !matches!(status, AssignmentStatus::Requested | AssignmentStatus::Unavailable) {
                return Err(LeagueError::validation(
                    "status",
                    format!("Referees can only create REQUESTED or UNAVAILABLE assignments, not {}", status.name()),
                ));
            }
        }
        if status == AssignmentStatus::Assigned && position.is_none() {
            return Err(LeagueError::validation(
                "position",
                "Position must be set for this assignment",
            ));
        }

        let mut assignment =
            Assignment::new(&Uuid::new_v4().to_string(), match_id, referee, status);
        assignment.position = position;
        assignment.push_history(
            status,
            Utc::now(),
            Some(&acting.id),
            Some(&acting.display_name()),
        );
        self.store.insert_assignment(assignment.clone())?;

        if status == AssignmentStatus::Assigned {
            if let Some(position) = position {
                self.write_match_slot(match_id, position, &assignment);
            }
        }

        log::info!(
            "Assignment '{}' created for match '{match_id}', referee '{referee_user_id}', status {}",
            assignment.id,
            status.name()
        );
        Ok(assignment)
    }

    /// Drive an assignment through its status table.
    ///
    /// Admins use the admin table; a referee may only move their own
    /// assignment and only along the referee table. Entering ASSIGNED
    /// stamps the referee into the match slot, leaving ASSIGNED or
    /// ACCEPTED clears it again if it still names this referee.
    pub fn set_status(
        &self,
        assignment_id: &str,
        to: AssignmentStatus,
        position: Option<u8>,
        acting: &User,
    ) -> Result<Assignment> {
        check_position(position)?;
        let assignment = self.get(assignment_id)?;
        let from = assignment.status;

        let is_admin = acting.roles.has_any(ASSIGNMENT_ADMIN_ROLES);
        let is_self =
            acting.roles.has(Role::Referee) && acting.id == assignment.referee.user_id;
        if !is_admin && !is_self {
            return Err(LeagueError::forbidden(
                "Assignment status changes require an assignment admin role or the assigned referee",
                ASSIGNMENT_ADMIN_ROLES,
                acting.roles.as_slice(),
            ));
        }
        let table = if is_admin { ADMIN_TRANSITIONS } else { REFEREE_TRANSITIONS };
        if !allows(table, from, to) {
            return Err(LeagueError::validation(
                "status",
                format!("Invalid status transition: {} -> {}", from.name(), to.name()),
            ));
        }

        let slot = position.or(assignment.position);
        if to == AssignmentStatus::Assigned && slot.is_none() {
            return Err(LeagueError::validation(
                "position",
                "Position must be set for this assignment",
            ));
        }

        let now = Utc::now();
        let updated_by = acting.id.clone();
        let updated_by_name = acting.display_name();
        let outcome = self.store.update_assignment(assignment_id, move |a| {
            if a.status != from {
                return Ok(false);
            }
            a.status = to;
            if let Some(position) = slot {
                a.position = Some(position);
            }
            a.push_history(to, now, Some(&updated_by), Some(&updated_by_name));
            Ok(true)
        })?;
        match outcome {
            UpdateOutcome::Modified => {}
            UpdateOutcome::Unchanged => {
                return Err(LeagueError::database_in(
                    "update",
                    "assignments",
                    format!("assignment_id={assignment_id}"),
                ))
            }
            UpdateOutcome::Missing => {
                return Err(LeagueError::not_found("Assignment", assignment_id))
            }
        }

        let updated = self.get(assignment_id)?;
        let was_in_match =
            matches!(from, AssignmentStatus::Assigned | AssignmentStatus::Accepted);
        let is_in_match =
            matches!(to, AssignmentStatus::Assigned | AssignmentStatus::Accepted);
        if to == AssignmentStatus::Assigned {
            if let Some(position) = updated.position {
                self.write_match_slot(&updated.match_id, position, &updated);
            }
        } else if was_in_match && !is_in_match {
            if let Some(position) = assignment.position {
                self.clear_match_slot(&updated.match_id, position, &updated.referee.user_id);
            }
        }

        log::info!(
            "Assignment '{assignment_id}' moved {} -> {} by '{}'",
            from.name(),
            to.name(),
            acting.id
        );
        Ok(updated)
    }

    /// Remove an assignment and its match snapshot in one transaction.
    pub fn delete(&self, assignment_id: &str, acting: &User) -> Result<()> {
        if !acting.roles.has_any(ASSIGNMENT_ADMIN_ROLES) {
            return Err(LeagueError::forbidden(
                "Assignment deletion requires an assignment admin role",
                ASSIGNMENT_ADMIN_ROLES,
                acting.roles.as_slice(),
            ));
        }
        let assignment = self.get(assignment_id)?;

        self.store.transaction(|state| {
            state.assignments.remove(&assignment.id);
            if let (Some(position), Some(m)) =
                (assignment.position, state.matches.get_mut(&assignment.match_id))
            {
                let slot = m.referee_slot_mut(position);
                if slot.as_ref().is_some_and(|s| s.user_id == assignment.referee.user_id) {
                    *slot = None;
                }
            }
            Ok(())
        })?;

        log::info!(
            "Assignment '{assignment_id}' deleted, match '{}' slot released",
            assignment.match_id
        );
        Ok(())
    }

    /// Write the referee snapshot into the match; drift on failure is left
    /// for the reconciler.
    fn write_match_slot(&self, match_id: &str, position: u8, assignment: &Assignment) {
        let snapshot = assignment.referee.snapshot();
        let result = self.store.update_match(match_id, move |m| {
            *m.referee_slot_mut(position) = Some(snapshot);
            Ok(true)
        });
        match result {
            Ok(UpdateOutcome::Modified) => {}
            Ok(_) | Err(_) => {
                log::warn!(
                    "Referee snapshot for match '{match_id}' position {position} not written; reconciler will flag it"
                );
            }
        }
    }

    /// Clear the match slot if it still names the given referee.
    fn clear_match_slot(&self, match_id: &str, position: u8, referee_user_id: &str) {
        let user_id = referee_user_id.to_string();
        let result = self.store.update_match(match_id, move |m| {
            let slot = m.referee_slot_mut(position);
            if slot.as_ref().is_some_and(|s| s.user_id == user_id) {
                *slot = None;
                return Ok(true);
            }
            Ok(false)
        });
        match result {
            Ok(UpdateOutcome::Modified | UpdateOutcome::Unchanged) => {}
            Ok(UpdateOutcome::Missing) | Err(_) => {
                log::warn!(
                    "Referee slot for match '{match_id}' position {position} not cleared; reconciler will flag it"
                );
            }
        }
    }
}

fn check_position(position: Option<u8>) -> Result<()> {
    match position {
        Some(p) if p != 1 && p != 2 => {
            Err(LeagueError::validation("position", format!("must be 1 or 2, got {p}")))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::matches::Match;
    use crate::models::user::{RefereeProfile, RoleSet};
    use crate::store::MemoryStore;

    fn ref_admin() -> User {
        User {
            id: "u-admin".into(),
            first_name: "Pat".into(),
            last_name: "Chef".into(),
            email: None,
            roles: RoleSet::new(&[Role::RefAdmin]),
            referee: None,
        }
    }

    fn referee_user(id: &str) -> User {
        User {
            id: id.to_string(),
            first_name: "Kim".into(),
            last_name: "Weber".into(),
            email: None,
            roles: RoleSet::new(&[Role::Referee]),
            referee: Some(RefereeProfile {
                club_id: Some("c-1".into()),
                club_name: Some("HC City".into()),
                logo_url: None,
                points: 10,
                level: Some("A".into()),
            }),
        }
    }

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_match(Match::new("m-1", 1)).unwrap();
        store.insert_user(referee_user("u-ref")).unwrap();
        store
    }

    #[test]
    fn test_referee_requests_themselves() {
        let store = seeded_store();
        let service = AssignmentService::new(&store);

        let assignment = service
            .create("m-1", "u-ref", AssignmentStatus::Requested, None, &referee_user("u-ref"))
            .unwrap();
        assert_eq!(assignment.status, AssignmentStatus::Requested);
        assert_eq!(assignment.referee.club_name.as_deref(), Some("HC City"));
        assert_eq!(assignment.status_history.len(), 1);
        assert_eq!(assignment.status_history[0].updated_by.as_deref(), Some("u-ref"));

        // a second request for the same referee is rejected
        let err = service
            .create("m-1", "u-ref", AssignmentStatus::Requested, None, &referee_user("u-ref"))
            .unwrap_err();
        assert!(matches!(err, LeagueError::Validation { field: "referee", .. }));
    }

    #[test]
    fn test_referee_cannot_self_assign() {
        let store = seeded_store();
        let service = AssignmentService::new(&store);

        let err = service
            .create("m-1", "u-ref", AssignmentStatus::Assigned, Some(1), &referee_user("u-ref"))
            .unwrap_err();
        assert!(matches!(err, LeagueError::Validation { field: "status", .. }));

        // and cannot touch somebody else's assignment at all
        let err = service
            .create("m-1", "u-ref", AssignmentStatus::Requested, None, &referee_user("u-other"))
            .unwrap_err();
        assert!(matches!(err, LeagueError::Authorization { .. }));
    }

    #[test]
    fn test_admin_assignment_writes_match_slot() {
        let store = seeded_store();
        let service = AssignmentService::new(&store);

        let assignment = service
            .create("m-1", "u-ref", AssignmentStatus::Assigned, Some(1), &ref_admin())
            .unwrap();
        assert_eq!(assignment.position, Some(1));

        let m = store.get_match("m-1").unwrap().unwrap();
        assert_eq!(m.referee1.as_ref().map(|r| r.user_id.as_str()), Some("u-ref"));
        assert!(m.referee2.is_none());
    }

    #[test]
    fn test_assigned_requires_position() {
        let store = seeded_store();
        let service = AssignmentService::new(&store);

        let err = service
            .create("m-1", "u-ref", AssignmentStatus::Assigned, None, &ref_admin())
            .unwrap_err();
        assert!(matches!(err, LeagueError::Validation { field: "position", .. }));
    }

    #[test]
    fn test_non_referee_user_is_not_found() {
        let store = seeded_store();
        store.insert_user(ref_admin()).unwrap();
        let service = AssignmentService::new(&store);

        let err = service
            .create("m-1", "u-admin", AssignmentStatus::Requested, None, &ref_admin())
            .unwrap_err();
        let LeagueError::ResourceNotFound { resource_type, .. } = err else {
            panic!("expected not found");
        };
        assert_eq!(resource_type, "Referee");
    }

    #[test]
    fn test_full_assignment_round_trip() {
        let store = seeded_store();
        let service = AssignmentService::new(&store);

        let a = service
            .create("m-1", "u-ref", AssignmentStatus::Requested, None, &referee_user("u-ref"))
            .unwrap();
        let a = service
            .set_status(&a.id, AssignmentStatus::Assigned, Some(2), &ref_admin())
            .unwrap();
        assert_eq!(a.position, Some(2));
        assert!(store.get_match("m-1").unwrap().unwrap().referee2.is_some());

        let a = service
            .set_status(&a.id, AssignmentStatus::Accepted, None, &referee_user("u-ref"))
            .unwrap();
        assert_eq!(a.status, AssignmentStatus::Accepted);
        // accepting keeps the snapshot in place
        assert!(store.get_match("m-1").unwrap().unwrap().referee2.is_some());
        assert_eq!(a.status_history.len(), 3);

        // pulling the referee back out clears the slot
        let a = service
            .set_status(&a.id, AssignmentStatus::Unavailable, None, &ref_admin())
            .unwrap();
        assert_eq!(a.status, AssignmentStatus::Unavailable);
        assert!(store.get_match("m-1").unwrap().unwrap().referee2.is_none());
    }

    #[test]
    fn test_declining_clears_slot() {
        let store = seeded_store();
        let service = AssignmentService::new(&store);

        let a = service
            .create("m-1", "u-ref", AssignmentStatus::Assigned, Some(1), &ref_admin())
            .unwrap();
        let a = service
            .set_status(&a.id, AssignmentStatus::Declined, None, &referee_user("u-ref"))
            .unwrap();
        assert!(store.get_match("m-1").unwrap().unwrap().referee1.is_none());

        // the admin may re-request a declined referee
        let a = service
            .set_status(&a.id, AssignmentStatus::Requested, None, &ref_admin())
            .unwrap();
        assert_eq!(a.status, AssignmentStatus::Requested);
    }

    #[test]
    fn test_invalid_transition_is_rejected() {
        let store = seeded_store();
        let service = AssignmentService::new(&store);

        let a = service
            .create("m-1", "u-ref", AssignmentStatus::Requested, None, &referee_user("u-ref"))
            .unwrap();
        // a referee cannot assign themselves
        let err = service
            .set_status(&a.id, AssignmentStatus::Assigned, Some(1), &referee_user("u-ref"))
            .unwrap_err();
        let LeagueError::Validation { message, .. } = err else {
            panic!("expected validation error");
        };
        assert_eq!(message, "Invalid status transition: REQUESTED -> ASSIGNED");

        // and a stranger referee cannot touch it
        let err = service
            .set_status(&a.id, AssignmentStatus::Unavailable, None, &referee_user("u-other"))
            .unwrap_err();
        assert!(matches!(err, LeagueError::Authorization { .. }));
    }

    #[test]
    fn test_slot_of_another_referee_is_left_alone() {
        let store = seeded_store();
        store.insert_user(referee_user("u-ref2")).unwrap();
        let service = AssignmentService::new(&store);

        let first = service
            .create("m-1", "u-ref", AssignmentStatus::Assigned, Some(1), &ref_admin())
            .unwrap();
        // second referee takes over the same slot
        service
            .create("m-1", "u-ref2", AssignmentStatus::Assigned, Some(1), &ref_admin())
            .unwrap();

        // pulling the first referee must not clear the second one's slot
        service
            .set_status(&first.id, AssignmentStatus::Unavailable, None, &ref_admin())
            .unwrap();
        let m = store.get_match("m-1").unwrap().unwrap();
        assert_eq!(m.referee1.as_ref().map(|r| r.user_id.as_str()), Some("u-ref2"));
    }

    #[test]
    fn test_delete_requires_admin_and_clears_slot() {
        let store = seeded_store();
        let service = AssignmentService::new(&store);

        let a = service
            .create("m-1", "u-ref", AssignmentStatus::Assigned, Some(1), &ref_admin())
            .unwrap();

        let err = service.delete(&a.id, &referee_user("u-ref")).unwrap_err();
        assert!(matches!(err, LeagueError::Authorization { .. }));

        service.delete(&a.id, &ref_admin()).unwrap();
        assert!(store.get_assignment(&a.id).unwrap().is_none());
        assert!(store.get_match("m-1").unwrap().unwrap().referee1.is_none());
    }

    #[test]
    fn test_for_match_sorts_by_referee_name() {
        let store = seeded_store();
        let mut second = referee_user("u-ref2");
        second.first_name = "Alex".into();
        store.insert_user(second.clone()).unwrap();
        let service = AssignmentService::new(&store);

        service
            .create("m-1", "u-ref", AssignmentStatus::Requested, None, &referee_user("u-ref"))
            .unwrap();
        service
            .create("m-1", "u-ref2", AssignmentStatus::Requested, None, &second)
            .unwrap();

        let assignments = service.for_match("m-1").unwrap();
        let names: Vec<&str> =
            assignments.iter().map(|a| a.referee.first_name.as_str()).collect();
        assert_eq!(names, ["Alex", "Kim"]);
    }
}
