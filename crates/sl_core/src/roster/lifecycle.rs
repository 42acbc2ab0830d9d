//! Roster status state machine and player-list replacement rules.
//!
//! The transition table is closed: anything not listed is rejected. An
//! approval is invalidated the moment the roster re-enters review, so
//! entering DRAFT (and re-entering SUBMITTED) wipes the eligibility stamps
//! and every player's eligibility verdict.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::error::{LeagueError, Result};
use crate::models::events::EventPlayer;
use crate::models::matches::TeamSide;
use crate::models::roster::{Roster, RosterPlayer, RosterStatus};
use crate::models::user::{Role, User};

/// Roles allowed to move a roster through its lifecycle.
pub const ROSTER_MANAGER_ROLES: &[Role] = &[Role::Admin, Role::LeagueAdmin, Role::ClubAdmin];

pub struct RosterLifecycle;

impl RosterLifecycle {
    pub fn can_transition(from: RosterStatus, to: RosterStatus) -> bool {
        use RosterStatus::*;
        matches!(
            (from, to),
            (Draft, Submitted)
                | (Draft, Invalid)
                | (Submitted, Approved)
                | (Submitted, Invalid)
                | (Submitted, Draft)
                | (Approved, Invalid)
                | (Approved, Draft)
                | (Invalid, Draft)
        )
    }

    /// Move a roster to a new status, applying the side effects the target
    /// state demands.
    ///
    /// `validator` overrides the stamped eligibility validator on approval;
    /// it defaults to the acting user's id.
    pub fn transition(
        roster: &mut Roster,
        to: RosterStatus,
        user: &User,
        validator: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if !user.roles.has_any(ROSTER_MANAGER_ROLES) {
            return Err(LeagueError::forbidden(
                "Roster status changes require an admin role",
                ROSTER_MANAGER_ROLES,
                user.roles.as_slice(),
            ));
        }

        let from = roster.status;
        if !Self::can_transition(from, to) {
            return Err(LeagueError::validation(
                "status",
                format!("Invalid status transition: {} -> {}", from.name(), to.name()),
            ));
        }

        match to {
            RosterStatus::Draft => Self::reset_review(roster),
            RosterStatus::Submitted if from != RosterStatus::Draft => Self::reset_review(roster),
            RosterStatus::Approved => {
                roster.eligibility_timestamp = Some(now);
                roster.eligibility_validator = validator.or_else(|| Some(user.id.clone()));
            }
            _ => {}
        }
        roster.status = to;

        log::debug!(
            "Roster status {} -> {} by '{}'",
            from.name(),
            to.name(),
            user.id
        );
        Ok(())
    }

    /// Check a replacement player list against the side's recorded events.
    ///
    /// Duplicate ids are rejected, and every player already referenced by a
    /// score or penalty must stay on the list so no event is orphaned.
    pub fn validate_player_list(side: &TeamSide, players: &[RosterPlayer]) -> Result<()> {
        let mut seen = BTreeSet::new();
        for entry in players {
            if !seen.insert(entry.player.player_id.as_str()) {
                return Err(LeagueError::validation_in(
                    "players",
                    format!("Duplicate player '{}' in roster", entry.player.player_id),
                    format!("team_id={}", side.team_id),
                ));
            }
        }

        for player_id in referenced_player_ids(side) {
            if !seen.contains(player_id) {
                return Err(LeagueError::validation_in(
                    "players",
                    format!(
                        "Player '{player_id}' is referenced by match events and cannot be removed"
                    ),
                    format!("team_id={}", side.team_id),
                ));
            }
        }
        Ok(())
    }

    /// Push roster jersey numbers into the snapshots embedded in score and
    /// penalty events. Returns how many snapshots changed.
    pub fn propagate_jersey_numbers(side: &mut TeamSide) -> usize {
        let numbers: HashMap<String, Option<u32>> = side
            .roster
            .players
            .iter()
            .map(|p| (p.player.player_id.clone(), p.player.jersey_number))
            .collect();

        let mut updated = 0;
        for event in &mut side.scores {
            updated += sync_jersey(&mut event.goal_player, &numbers);
            if let Some(assist) = &mut event.assist_player {
                updated += sync_jersey(assist, &numbers);
            }
        }
        for event in &mut side.penalties {
            updated += sync_jersey(&mut event.penalty_player, &numbers);
        }
        updated
    }

    fn reset_review(roster: &mut Roster) {
        roster.eligibility_timestamp = None;
        roster.eligibility_validator = None;
        for player in &mut roster.players {
            player.reset_eligibility();
        }
    }
}

/// Player ids referenced by any score or penalty of this side.
pub fn referenced_player_ids(side: &TeamSide) -> BTreeSet<&str> {
    let mut ids = BTreeSet::new();
    for event in &side.scores {
        ids.insert(event.goal_player.player_id.as_str());
        if let Some(assist) = &event.assist_player {
            ids.insert(assist.player_id.as_str());
        }
    }
    for event in &side.penalties {
        ids.insert(event.penalty_player.player_id.as_str());
    }
    ids
}

fn sync_jersey(snapshot: &mut EventPlayer, numbers: &HashMap<String, Option<u32>>) -> usize {
    match numbers.get(&snapshot.player_id) {
        Some(number) if *number != snapshot.jersey_number => {
            snapshot.jersey_number = *number;
            1
        }
        _ => 0,
    }
}
