//! Roster management: player-list replacement, workflow status and
//! eligibility validation.
//!
//! A replacement list never brings its own accumulators; they are
//! recomputed from the side's event lists inside the update closure, so a
//! payload cannot forge goals. Career-card participation follows the
//! committed membership change while the match is in progress or finished.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::{LeagueError, Result};
use crate::models::matches::{MatchStatus, TeamFlag};
use crate::models::player::Player;
use crate::models::roster::{Roster, RosterPlayer, RosterStatus};
use crate::models::user::User;
use crate::roster::eligibility::{EligibilityChecker, EligibilitySummary, PlayerVerdict};
use crate::roster::lifecycle::{RosterLifecycle, ROSTER_MANAGER_ROLES};
use crate::stats::player_card::{CardScope, PlayerCardAggregator};
use crate::stats::roster_stats::RosterStatEngine;
use crate::store::{LeagueStore, UpdateOutcome};

use super::require_match_written;

/// Outcome of one eligibility run over a side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityReport {
    pub verdicts: Vec<PlayerVerdict>,
    pub summary: EligibilitySummary,
}

pub struct RosterService<'a, S: LeagueStore> {
    store: &'a S,
    config: &'a EngineConfig,
}

impl<'a, S: LeagueStore> RosterService<'a, S> {
    pub fn new(store: &'a S, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn get_roster(&self, match_id: &str, team: TeamFlag) -> Result<Roster> {
        let m = self
            .store
            .get_match(match_id)?
            .ok_or_else(|| LeagueError::not_found("Match", match_id))?;
        Ok(m.side(team).roster.clone())
    }

    /// Replace one side's player list.
    ///
    /// The list is checked against the side's recorded events before and
    /// inside the update closure; accumulators and the jersey snapshots
    /// embedded in events are rebuilt in the same write. Returns the
    /// committed roster.
    pub fn update_roster(
        &self,
        match_id: &str,
        team: TeamFlag,
        players: Vec<RosterPlayer>,
        user: &User,
    ) -> Result<Roster> {
        if !user.roles.has_any(ROSTER_MANAGER_ROLES) {
            return Err(LeagueError::forbidden(
                "Roster changes require an admin role",
                ROSTER_MANAGER_ROLES,
                user.roles.as_slice(),
            ));
        }

        let m = self
            .store
            .get_match(match_id)?
            .ok_or_else(|| LeagueError::not_found("Match", match_id))?;
        RosterLifecycle::validate_player_list(m.side(team), &players)?;

        let counts_for_cards =
            matches!(m.match_status, MatchStatus::InProgress | MatchStatus::Finished);
        let scope = if counts_for_cards { CardScope::resolve(self.store, &m)? } else { None };
        let roster_before = m.side(team).roster.clone();

        let outcome = self.store.update_match(match_id, move |m| {
            let side = m.side_mut(team);
            if RosterLifecycle::validate_player_list(side, &players).is_err() {
                return Ok(false);
            }
            side.roster.players = players;
            RosterStatEngine::recompute_from_events(side);
            RosterLifecycle::propagate_jersey_numbers(side);
            Ok(true)
        })?;
        require_match_written(outcome, match_id)?;

        let updated = self
            .store
            .get_match(match_id)?
            .ok_or_else(|| LeagueError::not_found("Match", match_id))?;
        let roster = updated.side(team).roster.clone();

        if let Some(scope) = scope {
            let summary = PlayerCardAggregator::record_participation(
                self.store,
                self.config,
                &scope,
                &updated,
                team,
                &roster_before,
                &roster,
            )?;
            if summary.capped > 0 {
                log::info!(
                    "{} player(s) reached the call-up cap in match '{match_id}'",
                    summary.capped
                );
            }
        }

        log::info!(
            "Roster updated for match '{match_id}' ({} side): {} players",
            team.name(),
            roster.players.len()
        );
        Ok(roster)
    }

    /// Move one side's roster through its workflow.
    ///
    /// The whole transition, including the role gate and the review-stamp
    /// bookkeeping, runs inside the update closure so a racing writer
    /// cannot interleave between the check and the write.
    pub fn set_status(
        &self,
        match_id: &str,
        team: TeamFlag,
        to: RosterStatus,
        user: &User,
        validator: Option<String>,
    ) -> Result<Roster> {
        let now = Utc::now();
        let outcome = self.store.update_match(match_id, |m| {
            RosterLifecycle::transition(&mut m.side_mut(team).roster, to, user, validator, now)?;
            Ok(true)
        })?;
        require_match_written(outcome, match_id)?;

        let updated = self
            .store
            .get_match(match_id)?
            .ok_or_else(|| LeagueError::not_found("Match", match_id))?;
        log::info!(
            "Roster status for match '{match_id}' ({} side) set to {}",
            team.name(),
            to.name()
        );
        Ok(updated.side(team).roster.clone())
    }

    /// Run the license check over one side and write the verdicts back.
    ///
    /// Player records are fetched before the update closure runs; a roster
    /// entry without a stored record is treated as unlicensed. Re-running
    /// on an unchanged roster is a no-op.
    pub fn validate_eligibility(
        &self,
        match_id: &str,
        team: TeamFlag,
    ) -> Result<EligibilityReport> {
        let m = self
            .store
            .get_match(match_id)?
            .ok_or_else(|| LeagueError::not_found("Match", match_id))?;
        let side = m.side(team);

        let mut players: HashMap<String, Player> = HashMap::new();
        for entry in &side.roster.players {
            if let Some(player) = self.store.get_player(&entry.player.player_id)? {
                players.insert(entry.player.player_id.clone(), player);
            }
        }

        let verdicts =
            EligibilityChecker::evaluate_side(side, &players, self.config.called_match_limit);
        let to_apply = verdicts.clone();
        let outcome = self.store.update_match(match_id, move |m| {
            let changed = EligibilityChecker::apply_verdicts(&mut m.side_mut(team).roster, &to_apply);
            Ok(changed > 0)
        })?;
        if outcome == UpdateOutcome::Missing {
            return Err(LeagueError::not_found("Match", match_id));
        }

        let summary = EligibilitySummary::from_verdicts(&verdicts);
        log::info!(
            "Eligibility for match '{match_id}' ({} side): {} valid, {} invalid, {} unknown",
            team.name(),
            summary.valid,
            summary.invalid,
            summary.unknown
        );
        Ok(EligibilityReport { verdicts, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::events::{EventPlayer, ScoreEvent};
    use crate::models::matches::{KeyValue, Match, TeamSide};
    use crate::models::player::{AssignedClub, AssignedTeam, AssignmentSource};
    use crate::models::roster::EligibilityStatus;
    use crate::models::tournament::{Matchday, Round, Season, Tournament};
    use crate::models::user::{Role, RoleSet};
    use crate::store::MemoryStore;

    fn admin() -> User {
        User {
            id: "u-admin".into(),
            first_name: "Alex".into(),
            last_name: "Kim".into(),
            email: None,
            roles: RoleSet::new(&[Role::ClubAdmin]),
            referee: None,
        }
    }

    fn spectator() -> User {
        User {
            id: "u-nobody".into(),
            first_name: "Sam".into(),
            last_name: "Lee".into(),
            email: None,
            roles: RoleSet::new(&[]),
            referee: None,
        }
    }

    fn entry(player_id: &str, jersey: u32) -> RosterPlayer {
        RosterPlayer::new(
            EventPlayer {
                player_id: player_id.to_string(),
                first_name: "Test".into(),
                last_name: player_id.to_uppercase(),
                jersey_number: Some(jersey),
            },
            KeyValue::new("F", "Forward"),
            &format!("PASS-{jersey}"),
        )
    }

    fn scoped_match(id: &str) -> Match {
        let mut m = Match::new(id, 1);
        m.tournament = Some(("City League", "city-league").into());
        m.season = Some(("2025", "2025").into());
        m.round = Some(("Main Round", "main").into());
        m.matchday = Some(("Day 1", "day-1").into());
        m.home = TeamSide::named("t-home", "Harbor Hawks");
        m.away = TeamSide::named("t-away", "Valley Vipers");
        m.match_status = MatchStatus::InProgress;
        m
    }

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_tournament(Tournament {
                name: "City League".into(),
                alias: "city-league".into(),
                seasons: vec![Season {
                    name: "2025".into(),
                    alias: "2025".into(),
                    rounds: vec![Round {
                        name: "Main Round".into(),
                        alias: "main".into(),
                        create_stats: true,
                        matchdays: vec![Matchday {
                            name: "Day 1".into(),
                            alias: "day-1".into(),
                            create_stats: false,
                            ..Default::default()
                        }],
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
            })
            .unwrap();
        store
    }

    fn licensed_player(player_id: &str, team_id: &str, status: EligibilityStatus) -> Player {
        let mut player = Player::new(player_id, "Test", "Player");
        player.assigned_teams.push(AssignedClub {
            club_id: "c-1".into(),
            club_name: "Test Club".into(),
            teams: vec![AssignedTeam {
                team_id: team_id.to_string(),
                team_name: "Harbor Hawks".into(),
                pass_no: "PASS-1".into(),
                jersey_no: Some(7),
                source: AssignmentSource::League,
                status: Some(status),
                invalid_reason_codes: Vec::new(),
            }],
        });
        player
    }

    #[test]
    fn test_update_roster_recomputes_from_events() {
        let store = seeded_store();
        let mut m = scoped_match("m-1");
        m.home.roster.players.push(entry("p-1", 7));
        m.home.scores.push(ScoreEvent {
            id: "s-1".into(),
            match_time: "10:00".into(),
            match_seconds: 600,
            goal_player: m.home.roster.players[0].player.clone(),
            assist_player: None,
            is_ppg: false,
            is_shg: false,
            is_gwg: false,
        });
        store.insert_match(m).unwrap();
        store.insert_player(Player::new("p-1", "Test", "P-1")).unwrap();
        store.insert_player(Player::new("p-2", "Test", "P-2")).unwrap();

        let config = EngineConfig::default();
        let service = RosterService::new(&store, &config);
        let mut replacement = vec![entry("p-1", 7), entry("p-2", 9)];
        // forged accumulators must not survive the write
        replacement[1].goals = 5;
        let roster = service
            .update_roster("m-1", TeamFlag::Home, replacement, &admin())
            .unwrap();

        assert_eq!(roster.players.len(), 2);
        assert_eq!(roster.player("p-1").unwrap().goals, 1);
        assert_eq!(roster.player("p-2").unwrap().goals, 0);

        // only the joining player gains an appearance
        let p2 = store.get_player("p-2").unwrap().unwrap();
        assert_eq!(p2.stats.len(), 1);
        assert_eq!(p2.stats[0].games_played, 1);
        let p1 = store.get_player("p-1").unwrap().unwrap();
        assert!(p1.stats.is_empty());
    }

    #[test]
    fn test_update_roster_requires_manager_role() {
        let store = seeded_store();
        store.insert_match(scoped_match("m-1")).unwrap();
        let config = EngineConfig::default();
        let service = RosterService::new(&store, &config);

        let err = service
            .update_roster("m-1", TeamFlag::Home, vec![entry("p-1", 7)], &spectator())
            .unwrap_err();
        assert!(matches!(err, LeagueError::Authorization { .. }));
    }

    #[test]
    fn test_update_roster_keeps_event_players() {
        let store = seeded_store();
        let mut m = scoped_match("m-1");
        m.home.roster.players.push(entry("p-1", 7));
        m.home.scores.push(ScoreEvent {
            id: "s-1".into(),
            match_time: "10:00".into(),
            match_seconds: 600,
            goal_player: m.home.roster.players[0].player.clone(),
            assist_player: None,
            is_ppg: false,
            is_shg: false,
            is_gwg: false,
        });
        store.insert_match(m).unwrap();

        let config = EngineConfig::default();
        let service = RosterService::new(&store, &config);
        let err = service
            .update_roster("m-1", TeamFlag::Home, vec![entry("p-2", 9)], &admin())
            .unwrap_err();
        assert!(matches!(err, LeagueError::Validation { field: "players", .. }));
    }

    #[test]
    fn test_update_roster_skips_cards_for_scheduled_match() {
        let store = seeded_store();
        let mut m = scoped_match("m-1");
        m.match_status = MatchStatus::Scheduled;
        store.insert_match(m).unwrap();
        store.insert_player(Player::new("p-1", "Test", "P-1")).unwrap();

        let config = EngineConfig::default();
        let service = RosterService::new(&store, &config);
        service
            .update_roster("m-1", TeamFlag::Home, vec![entry("p-1", 7)], &admin())
            .unwrap();

        assert!(store.get_player("p-1").unwrap().unwrap().stats.is_empty());
    }

    #[test]
    fn test_set_status_stamps_approval() {
        let store = seeded_store();
        store.insert_match(scoped_match("m-1")).unwrap();
        let config = EngineConfig::default();
        let service = RosterService::new(&store, &config);

        service
            .set_status("m-1", TeamFlag::Home, RosterStatus::Submitted, &admin(), None)
            .unwrap();
        let roster = service
            .set_status("m-1", TeamFlag::Home, RosterStatus::Approved, &admin(), None)
            .unwrap();

        assert_eq!(roster.status, RosterStatus::Approved);
        assert!(roster.eligibility_timestamp.is_some());
        assert_eq!(roster.eligibility_validator.as_deref(), Some("u-admin"));
    }

    #[test]
    fn test_set_status_rejects_invalid_transition() {
        let store = seeded_store();
        store.insert_match(scoped_match("m-1")).unwrap();
        let config = EngineConfig::default();
        let service = RosterService::new(&store, &config);

        let err = service
            .set_status("m-1", TeamFlag::Home, RosterStatus::Approved, &admin(), None)
            .unwrap_err();
        let LeagueError::Validation { message, .. } = err else {
            panic!("expected validation error");
        };
        assert_eq!(message, "Invalid status transition: DRAFT -> APPROVED");

        // nothing was written
        let roster = service.get_roster("m-1", TeamFlag::Home).unwrap();
        assert_eq!(roster.status, RosterStatus::Draft);
    }

    #[test]
    fn test_validate_eligibility_writes_verdicts() {
        let store = seeded_store();
        let mut m = scoped_match("m-1");
        m.home.roster.players.push(entry("p-ok", 7));
        m.home.roster.players.push(entry("p-missing", 9));
        store.insert_match(m).unwrap();
        store
            .insert_player(licensed_player("p-ok", "t-home", EligibilityStatus::Valid))
            .unwrap();

        let config = EngineConfig::default();
        let service = RosterService::new(&store, &config);
        let report = service.validate_eligibility("m-1", TeamFlag::Home).unwrap();

        assert_eq!((report.summary.valid, report.summary.invalid), (1, 1));
        let roster = service.get_roster("m-1", TeamFlag::Home).unwrap();
        assert_eq!(roster.player("p-ok").unwrap().eligibility_status, EligibilityStatus::Valid);
        assert_eq!(
            roster.player("p-missing").unwrap().eligibility_status,
            EligibilityStatus::Invalid
        );

        // a second run reproduces the verdicts without touching the store
        let again = service.validate_eligibility("m-1", TeamFlag::Home).unwrap();
        assert_eq!(again, report);
    }

    #[test]
    fn test_missing_match_is_not_found() {
        let store = seeded_store();
        let config = EngineConfig::default();
        let service = RosterService::new(&store, &config);
        assert!(matches!(
            service.get_roster("ghost", TeamFlag::Home).unwrap_err(),
            LeagueError::ResourceNotFound { .. }
        ));
        assert!(matches!(
            service.validate_eligibility("ghost", TeamFlag::Home).unwrap_err(),
            LeagueError::ResourceNotFound { .. }
        ));
    }
}
