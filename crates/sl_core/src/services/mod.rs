//! Write-path services.
//!
//! Each service is a DI struct holding a store reference plus the engine
//! config; nothing here is a singleton. Store reads happen before the
//! single-document update closure runs (the closure must stay free of
//! store calls), and the standings/player-card projections are refreshed
//! afterwards from the committed state.

pub mod assignment;
pub mod penalty;
pub mod roster;
pub mod score;


pub use assignment::AssignmentService;
pub use penalty::PenaltyService;
pub use roster::RosterService;
pub use score::ScoreService;

use validator::Validate;

use crate::config::EngineConfig;
use crate::error::{LeagueError, Result};
use crate::models::events::EventPlayer;
use crate::models::matches::{Match, TeamFlag, TeamSide};
use crate::models::roster::Roster;
use crate::models::settings::{resolve as resolve_settings, SettingsSource, StandingsSettings};
use crate::stats::player_card::{CardDelta, CardScope, PlayerCardAggregator};
use crate::stats::standings;
use crate::store::{LeagueStore, UpdateOutcome};

/// Surface payload validation as a `LeagueError`.
pub(crate) fn check_payload(payload: &impl Validate) -> Result<()> {
    payload
        .validate()
        .map_err(|errors| LeagueError::validation("payload", errors.to_string()))
}

/// Event lists may only change while the match is live.
pub(crate) fn require_in_progress(m: &Match) -> Result<()> {
    if !m.match_status.is_live() {
        return Err(LeagueError::validation_in(
            "match_status",
            format!(
                "scores and penalties can only change while the match is in progress (current: {})",
                m.match_status.name()
            ),
            format!("match_id={}", m.id),
        ));
    }
    Ok(())
}

/// Snapshot a rostered player into an event, rejecting unknown ids before
/// anything is written.
pub(crate) fn snapshot_rostered_player(
    side: &TeamSide,
    player_id: &str,
    match_id: &str,
    team: TeamFlag,
) -> Result<EventPlayer> {
    side.roster.player(player_id).map(|entry| entry.player.clone()).ok_or_else(|| {
        LeagueError::validation_in(
            "player_id",
            format!("Player '{player_id}' is not on the roster"),
            format!("match_id={match_id} team={}", team.name()),
        )
    })
}

/// Effective points schema for a match, resolved through the tournament
/// tree with the config defaults as the last resort.
pub(crate) fn resolve_match_settings<S: LeagueStore>(
    store: &S,
    config: &EngineConfig,
    m: &Match,
) -> Result<(StandingsSettings, SettingsSource)> {
    let tournament = match &m.tournament {
        Some(t) => store.get_tournament(&t.alias)?,
        None => None,
    };
    Ok(resolve_settings(m, tournament.as_ref(), &config.default_settings))
}

/// Map a conditional update outcome onto the write-path error contract:
/// a vanished document is NotFound, a declined closure is the lost-race
/// DatabaseOperation.
pub(crate) fn require_match_written(
    outcome: UpdateOutcome,
    match_id: &str,
) -> Result<()> {
    match outcome {
        UpdateOutcome::Modified => Ok(()),
        UpdateOutcome::Unchanged => Err(LeagueError::database_in(
            "update",
            "matches",
            format!("match_id={match_id}"),
        )),
        UpdateOutcome::Missing => Err(LeagueError::not_found("Match", match_id)),
    }
}

/// Refresh the projections derived from one match after a committed write:
/// round and matchday standings, then player career cards from the roster
/// delta. Returns the committed match.
pub(crate) fn refresh_projections<S: LeagueStore>(
    store: &S,
    config: &EngineConfig,
    match_id: &str,
    team: TeamFlag,
    roster_before: &Roster,
) -> Result<Match> {
    let updated = store
        .get_match(match_id)?
        .ok_or_else(|| LeagueError::not_found("Match", match_id))?;

    if let (Some(t), Some(s), Some(r)) = (&updated.tournament, &updated.season, &updated.round) {
        standings::aggregate_round(store, &t.alias, &s.alias, &r.alias, config)?;
        if let Some(md) = &updated.matchday {
            standings::aggregate_matchday(store, &t.alias, &s.alias, &r.alias, &md.alias, config)?;
        }
    }

    if let Some(scope) = CardScope::resolve(store, &updated)? {
        let deltas = CardDelta::between(roster_before, &updated.side(team).roster);
        PlayerCardAggregator::apply_deltas(store, &scope, &deltas)?;
    }

    Ok(updated)
}
