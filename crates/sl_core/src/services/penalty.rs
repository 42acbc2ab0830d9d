//! Penalty event CRUD.
//!
//! Penalties feed the offender's penalty minutes only: no goal tally and
//! no outcome change. The standings and card projections still refresh so
//! PIM columns stay current.

use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{LeagueError, Result};
use crate::models::events::{format_match_time, parse_match_time, PenaltyEvent, PenaltyPayload};
use crate::models::matches::TeamFlag;
use crate::stats::outcome;
use crate::stats::roster_stats::{RosterStatEngine, StatDelta};
use crate::store::LeagueStore;

use super::{
    check_payload, refresh_projections, require_in_progress, require_match_written,
    resolve_match_settings, snapshot_rostered_player,
};

pub struct PenaltyService<'a, S: LeagueStore> {
    store: &'a S,
    config: &'a EngineConfig,
}

impl<'a, S: LeagueStore> PenaltyService<'a, S> {
    pub fn new(store: &'a S, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn create(
        &self,
        match_id: &str,
        team: TeamFlag,
        payload: &PenaltyPayload,
    ) -> Result<PenaltyEvent> {
        check_payload(payload)?;
        let (start, end) = Self::parse_times(payload)?;

        let m = self
            .store
            .get_match(match_id)?
            .ok_or_else(|| LeagueError::not_found("Match", match_id))?;
        require_in_progress(&m)?;

        let side = m.side(team);
        let penalty_player =
            snapshot_rostered_player(side, &payload.penalty_player_id, match_id, team)?;

        let event = PenaltyEvent {
            id: Uuid::new_v4().to_string(),
            match_time_start: format_match_time(start),
            match_time_end: end.map(format_match_time),
            match_seconds_start: start,
            match_seconds_end: end,
            penalty_player,
            penalty_code: payload.penalty_code.clone(),
            penalty_minutes: payload.penalty_minutes,
            is_gm: payload.is_gm,
            is_mp: payload.is_mp,
        };
        let delta = StatDelta::from_penalty(&event);
        let roster_before = side.roster.clone();

        let stored = event.clone();
        let outcome = self.store.update_match(match_id, move |m| {
            if !m.match_status.is_live() {
                return Ok(false);
            }
            let side = m.side_mut(team);
            if RosterStatEngine::require_rostered(side, &delta).is_err() {
                return Ok(false);
            }
            side.penalties.push(event);
            RosterStatEngine::apply_delta(side, &delta)?;
            Ok(true)
        })?;
        require_match_written(outcome, match_id)?;

        refresh_projections(self.store, self.config, match_id, team, &roster_before)?;
        log::info!(
            "Penalty event '{}' created for match '{match_id}' ({} side): {} min",
            stored.id,
            team.name(),
            stored.penalty_minutes
        );
        Ok(stored)
    }

    pub fn update(
        &self,
        match_id: &str,
        team: TeamFlag,
        event_id: &str,
        payload: &PenaltyPayload,
    ) -> Result<PenaltyEvent> {
        check_payload(payload)?;
        let (start, end) = Self::parse_times(payload)?;

        let m = self
            .store
            .get_match(match_id)?
            .ok_or_else(|| LeagueError::not_found("Match", match_id))?;
        require_in_progress(&m)?;

        let side = m.side(team);
        if !side.penalties.iter().any(|e| e.id == event_id) {
            return Err(self.event_not_found(match_id, team, event_id));
        }
        let penalty_player =
            snapshot_rostered_player(side, &payload.penalty_player_id, match_id, team)?;

        let replacement = PenaltyEvent {
            id: event_id.to_string(),
            match_time_start: format_match_time(start),
            match_time_end: end.map(format_match_time),
            match_seconds_start: start,
            match_seconds_end: end,
            penalty_player,
            penalty_code: payload.penalty_code.clone(),
            penalty_minutes: payload.penalty_minutes,
            is_gm: payload.is_gm,
            is_mp: payload.is_mp,
        };
        let (settings, _) = resolve_match_settings(self.store, self.config, &m)?;
        let roster_before = side.roster.clone();

        let stored = replacement.clone();
        let outcome = self.store.update_match(match_id, move |m| {
            if !m.match_status.is_live() {
                return Ok(false);
            }
            let side = m.side_mut(team);
            let Some(slot) = side.penalties.iter_mut().find(|e| e.id == replacement.id) else {
                return Ok(false);
            };
            *slot = replacement;
            RosterStatEngine::recompute_from_events(side);
            outcome::refresh_from_events(m, &settings);
            Ok(true)
        })?;
        require_match_written(outcome, match_id)?;

        refresh_projections(self.store, self.config, match_id, team, &roster_before)?;
        log::info!(
            "Penalty event '{event_id}' updated for match '{match_id}' ({} side)",
            team.name()
        );
        Ok(stored)
    }

    pub fn delete(&self, match_id: &str, team: TeamFlag, event_id: &str) -> Result<()> {
        let m = self
            .store
            .get_match(match_id)?
            .ok_or_else(|| LeagueError::not_found("Match", match_id))?;
        require_in_progress(&m)?;

        let side = m.side(team);
        let event = side
            .penalties
            .iter()
            .find(|e| e.id == event_id)
            .cloned()
            .ok_or_else(|| self.event_not_found(match_id, team, event_id))?;

        let delta = StatDelta::from_penalty(&event);
        let roster_before = side.roster.clone();

        let outcome = self.store.update_match(match_id, move |m| {
            if !m.match_status.is_live() {
                return Ok(false);
            }
            let side = m.side_mut(team);
            let Some(pos) = side.penalties.iter().position(|e| e.id == event.id) else {
                return Ok(false);
            };
            side.penalties.remove(pos);
            RosterStatEngine::revert_delta(side, &delta)?;
            Ok(true)
        })?;
        require_match_written(outcome, match_id)?;

        refresh_projections(self.store, self.config, match_id, team, &roster_before)?;
        log::info!(
            "Penalty event '{event_id}' deleted from match '{match_id}' ({} side)",
            team.name()
        );
        Ok(())
    }

    fn parse_times(payload: &PenaltyPayload) -> Result<(u32, Option<u32>)> {
        let start = parse_match_time(&payload.match_time_start)?;
        let end = payload.match_time_end.as_deref().map(parse_match_time).transpose()?;
        if let Some(end) = end {
            if end < start {
                return Err(LeagueError::validation_in(
                    "match_time_end",
                    "penalty cannot end before it starts",
                    format!("start={} end={}", payload.match_time_start, format_match_time(end)),
                ));
            }
        }
        Ok((start, end))
    }

    fn event_not_found(&self, match_id: &str, team: TeamFlag, event_id: &str) -> LeagueError {
        LeagueError::not_found_in(
            "PenaltyEvent",
            event_id,
            format!("match '{match_id}' {} side", team.name()),
        )
    }
}
