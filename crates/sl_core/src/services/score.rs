//! Score event CRUD: the incremental live-scoring path.
//!
//! Create and delete are single atomic match updates doing event append or
//! removal, the team goal tally, the scorer's and assist's accumulators and
//! the outcome refresh together. Update is the non-incremental path: a
//! field edit followed by a full recompute from the event lists.

use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{LeagueError, Result};
use crate::models::events::{format_match_time, parse_match_time, ScoreEvent, ScorePayload};
use crate::models::matches::TeamFlag;
use crate::stats::outcome;
use crate::stats::roster_stats::{RosterStatEngine, StatDelta};
use crate::store::LeagueStore;

use super::{
    check_payload, refresh_projections, require_in_progress, require_match_written,
    resolve_match_settings, snapshot_rostered_player,
};

pub struct ScoreService<'a, S: LeagueStore> {
    store: &'a S,
    config: &'a EngineConfig,
}

impl<'a, S: LeagueStore> ScoreService<'a, S> {
    pub fn new(store: &'a S, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn create(
        &self,
        match_id: &str,
        team: TeamFlag,
        payload: &ScorePayload,
    ) -> Result<ScoreEvent> {
        check_payload(payload)?;
        let match_seconds = parse_match_time(&payload.match_time)?;

        let m = self
            .store
            .get_match(match_id)?
            .ok_or_else(|| LeagueError::not_found("Match", match_id))?;
        require_in_progress(&m)?;

        let side = m.side(team);
        let goal_player = snapshot_rostered_player(side, &payload.goal_player_id, match_id, team)?;
        let assist_player = payload
            .assist_player_id
            .as_deref()
            .map(|id| snapshot_rostered_player(side, id, match_id, team))
            .transpose()?;

        let event = ScoreEvent {
            id: Uuid::new_v4().to_string(),
            match_time: format_match_time(match_seconds),
            match_seconds,
            goal_player,
            assist_player,
            is_ppg: payload.is_ppg,
            is_shg: payload.is_shg,
            is_gwg: payload.is_gwg,
        };
        let delta = StatDelta::from_score(&event);
        let (settings, _) = resolve_match_settings(self.store, self.config, &m)?;
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
            side.scores.push(event);
            side.stats.goals_for += 1;
            RosterStatEngine::apply_delta(side, &delta)?;
            outcome::refresh(m, &settings);
            Ok(true)
        })?;
        require_match_written(outcome, match_id)?;

        refresh_projections(self.store, self.config, match_id, team, &roster_before)?;
        log::info!(
            "Score event '{}' created for match '{match_id}' ({} side) at {}",
            stored.id,
            team.name(),
            stored.match_time
        );
        Ok(stored)
    }

    pub fn update(
        &self,
        match_id: &str,
        team: TeamFlag,
        event_id: &str,
        payload: &ScorePayload,
    ) -> Result<ScoreEvent> {
        check_payload(payload)?;
        let match_seconds = parse_match_time(&payload.match_time)?;

        let m = self
            .store
            .get_match(match_id)?
            .ok_or_else(|| LeagueError::not_found("Match", match_id))?;
        require_in_progress(&m)?;

        let side = m.side(team);
        if !side.scores.iter().any(|e| e.id == event_id) {
            return Err(self.event_not_found(match_id, team, event_id));
        }
        let goal_player = snapshot_rostered_player(side, &payload.goal_player_id, match_id, team)?;
        let assist_player = payload
            .assist_player_id
            .as_deref()
            .map(|id| snapshot_rostered_player(side, id, match_id, team))
            .transpose()?;

        let replacement = ScoreEvent {
            id: event_id.to_string(),
            match_time: format_match_time(match_seconds),
            match_seconds,
            goal_player,
            assist_player,
            is_ppg: payload.is_ppg,
            is_shg: payload.is_shg,
            is_gwg: payload.is_gwg,
        };
        let (settings, _) = resolve_match_settings(self.store, self.config, &m)?;
        let roster_before = side.roster.clone();

        let stored = replacement.clone();
        let outcome = self.store.update_match(match_id, move |m| {
            if !m.match_status.is_live() {
                return Ok(false);
            }
            let side = m.side_mut(team);
            let Some(slot) = side.scores.iter_mut().find(|e| e.id == replacement.id) else {
                return Ok(false);
            };
            *slot = replacement;
            RosterStatEngine::recompute_from_events(side);
            outcome::refresh_from_events(m, &settings);
            Ok(true)
        })?;
        require_match_written(outcome, match_id)?;

        refresh_projections(self.store, self.config, match_id, team, &roster_before)?;
        log::info!("Score event '{event_id}' updated for match '{match_id}' ({} side)", team.name());
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
            .scores
            .iter()
            .find(|e| e.id == event_id)
            .cloned()
            .ok_or_else(|| self.event_not_found(match_id, team, event_id))?;

        let delta = StatDelta::from_score(&event);
        let (settings, _) = resolve_match_settings(self.store, self.config, &m)?;
        let roster_before = side.roster.clone();

        let outcome = self.store.update_match(match_id, move |m| {
            if !m.match_status.is_live() {
                return Ok(false);
            }
            let side = m.side_mut(team);
            let Some(pos) = side.scores.iter().position(|e| e.id == event.id) else {
                return Ok(false);
            };
            side.scores.remove(pos);
            side.stats.goals_for = side.stats.goals_for.saturating_sub(1);
            RosterStatEngine::revert_delta(side, &delta)?;
            outcome::refresh(m, &settings);
            Ok(true)
        })?;
        require_match_written(outcome, match_id)?;

        refresh_projections(self.store, self.config, match_id, team, &roster_before)?;
        log::info!("Score event '{event_id}' deleted from match '{match_id}' ({} side)", team.name());
        Ok(())
    }

    fn event_not_found(&self, match_id: &str, team: TeamFlag, event_id: &str) -> LeagueError {
        LeagueError::not_found_in(
            "ScoreEvent",
            event_id,
            format!("match '{match_id}' {} side", team.name()),
        )
    }
}
