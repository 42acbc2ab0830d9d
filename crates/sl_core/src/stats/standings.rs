//! Standings aggregation: full recompute of round and matchday tables.
//!
//! Tables are always rebuilt from the scoped matches and written back as a
//! whole; nothing is merged. The write paths call this after every score
//! or penalty mutation, so an already-correct table being rebuilt must come
//! out identical.

use rayon::prelude::*;
use serde::Serialize;

use crate::config::{EngineConfig, TieBreak};
use crate::error::{LeagueError, Result};
use crate::models::matches::{Match, TeamFlag};
use crate::models::standings::{StandingsMap, StandingsRow, StreakCode};
use crate::store::LeagueStore;

/// Build a standings table from a set of matches.
///
/// Every participating team gets a row; only matches in an active status
/// contribute stats. Matches are folded in start-date order so streaks are
/// reproducible.
pub fn aggregate(matches: &[Match], config: &EngineConfig) -> StandingsMap {
    let mut ordered: Vec<&Match> = matches.iter().collect();
    ordered.sort_by(|a, b| {
        a.start_date.cmp(&b.start_date).then_with(|| a.match_id.cmp(&b.match_id))
    });

    let mut standings = StandingsMap::new();
    for m in ordered {
        for flag in [TeamFlag::Home, TeamFlag::Away] {
            let side = m.side(flag);
            if side.team_id.is_empty() {
                continue;
            }
            let row = standings
                .entry(side.team_id.clone())
                .or_insert_with(|| StandingsRow::from_side(side));
            if m.match_status.is_active() {
                row.add_stats(&side.stats);
                if let Some(code) = StreakCode::from_stats(&side.stats) {
                    row.push_streak(code, config.streak_length);
                }
            }
        }
    }
    standings
}

/// Presentation order: points, goal difference, goals scored, then the
/// configured tie-break.
pub fn ranked(standings: &StandingsMap, tie_break: TieBreak) -> Vec<&StandingsRow> {
    let mut rows: Vec<&StandingsRow> = standings.values().collect();
    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| b.goal_diff().cmp(&a.goal_diff()))
            .then_with(|| b.goals_for.cmp(&a.goals_for))
            .then_with(|| match tie_break {
                TieBreak::TeamNameAsc => {
                    a.name.cmp(&b.name).then_with(|| a.team_id.cmp(&b.team_id))
                }
                TieBreak::TeamIdAsc => a.team_id.cmp(&b.team_id),
            })
    });
    rows
}

/// Rebuild one round's standings and write them onto the tournament.
pub fn aggregate_round<S: LeagueStore>(
    store: &S,
    tournament: &str,
    season: &str,
    round: &str,
    config: &EngineConfig,
) -> Result<StandingsMap> {
    let doc = store
        .get_tournament(tournament)?
        .ok_or_else(|| LeagueError::not_found("Tournament", tournament))?;
    let round_doc = doc
        .season(season)
        .and_then(|s| s.round(round))
        .ok_or_else(|| {
            LeagueError::not_found_in("Round", round, format!("season '{season}' of '{tournament}'"))
        })?;

    let standings = if round_doc.create_standings {
        aggregate(&store.matches_in_round(tournament, season, round)?, config)
    } else {
        StandingsMap::new()
    };

    write_round_standings(store, tournament, season, round, standings.clone())?;
    log::info!(
        "Rebuilt standings for round '{round}' of '{tournament}/{season}': {} teams",
        standings.len()
    );
    Ok(standings)
}

/// Rebuild one matchday's standings and write them onto the tournament.
pub fn aggregate_matchday<S: LeagueStore>(
    store: &S,
    tournament: &str,
    season: &str,
    round: &str,
    matchday: &str,
    config: &EngineConfig,
) -> Result<StandingsMap> {
    let doc = store
        .get_tournament(tournament)?
        .ok_or_else(|| LeagueError::not_found("Tournament", tournament))?;
    let matchday_doc = doc
        .season(season)
        .and_then(|s| s.round(round))
        .and_then(|r| r.matchday(matchday))
        .ok_or_else(|| {
            LeagueError::not_found_in(
                "Matchday",
                matchday,
                format!("round '{round}' of '{tournament}/{season}'"),
            )
        })?;

    let standings = if matchday_doc.create_standings {
        aggregate(&store.matches_in_matchday(tournament, season, round, matchday)?, config)
    } else {
        StandingsMap::new()
    };

    let md_standings = standings.clone();
    let outcome = store.update_tournament(tournament, |doc| {
        let slot = doc
            .season_mut(season)
            .and_then(|s| s.round_mut(round))
            .and_then(|r| r.matchday_mut(matchday))
            .ok_or_else(|| LeagueError::not_found("Matchday", matchday))?;
        slot.standings = md_standings;
        Ok(true)
    })?;
    require_written(outcome, tournament)?;

    log::info!(
        "Rebuilt standings for matchday '{matchday}' of round '{round}': {} teams",
        standings.len()
    );
    Ok(standings)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RebuildSummary {
    pub rounds: usize,
    pub matchdays: usize,
}

/// Recompute every round and matchday table of a season.
///
/// Rounds are computed in parallel; all writes land in one pass afterwards
/// so a failed round leaves the tournament untouched.
pub fn rebuild_season<S: LeagueStore>(
    store: &S,
    tournament: &str,
    season: &str,
    config: &EngineConfig,
) -> Result<RebuildSummary> {
    let doc = store
        .get_tournament(tournament)?
        .ok_or_else(|| LeagueError::not_found("Tournament", tournament))?;
    let season_doc = doc
        .season(season)
        .ok_or_else(|| LeagueError::not_found_in("Season", season, format!("'{tournament}'")))?;

    type RoundResult = (String, StandingsMap, Vec<(String, StandingsMap)>);

    let computed: Vec<RoundResult> = season_doc
        .rounds
        .par_iter()
        .map(|round| -> Result<RoundResult> {
            let matches = store.matches_in_round(tournament, season, &round.alias)?;
            let round_map = if round.create_standings {
                aggregate(&matches, config)
            } else {
                StandingsMap::new()
            };

            let mut matchday_maps = Vec::with_capacity(round.matchdays.len());
            for matchday in &round.matchdays {
                let md_map = if matchday.create_standings {
                    let scoped: Vec<Match> = matches
                        .iter()
                        .filter(|m| {
                            m.matchday.as_ref().is_some_and(|md| md.alias == matchday.alias)
                        })
                        .cloned()
                        .collect();
                    aggregate(&scoped, config)
                } else {
                    StandingsMap::new()
                };
                matchday_maps.push((matchday.alias.clone(), md_map));
            }
            Ok((round.alias.clone(), round_map, matchday_maps))
        })
        .collect::<Result<Vec<_>>>()?;

    let rounds = computed.len();
    let matchdays = computed.iter().map(|(_, _, mds)| mds.len()).sum();

    let outcome = store.update_tournament(tournament, |doc| {
        let season_doc = doc
            .season_mut(season)
            .ok_or_else(|| LeagueError::not_found("Season", season))?;
        for (round_alias, round_map, matchday_maps) in computed {
            let round_doc = season_doc
                .round_mut(&round_alias)
                .ok_or_else(|| LeagueError::not_found("Round", round_alias.clone()))?;
            round_doc.standings = round_map;
            for (md_alias, md_map) in matchday_maps {
                if let Some(md_doc) = round_doc.matchday_mut(&md_alias) {
                    md_doc.standings = md_map;
                }
            }
        }
        Ok(true)
    })?;
    require_written(outcome, tournament)?;

    log::info!(
        "Season rebuild for '{tournament}/{season}': {rounds} rounds, {matchdays} matchdays"
    );
    Ok(RebuildSummary { rounds, matchdays })
}

fn write_round_standings<S: LeagueStore>(
    store: &S,
    tournament: &str,
    season: &str,
    round: &str,
    standings: StandingsMap,
) -> Result<()> {
    let outcome = store.update_tournament(tournament, |doc| {
        let slot = doc
            .season_mut(season)
            .and_then(|s| s.round_mut(round))
            .ok_or_else(|| LeagueError::not_found("Round", round))?;
        slot.standings = standings;
        Ok(true)
    })?;
    require_written(outcome, tournament)
}

fn require_written(outcome: crate::store::UpdateOutcome, tournament: &str) -> Result<()> {
    match outcome {
        crate::store::UpdateOutcome::Modified => Ok(()),
        crate::store::UpdateOutcome::Unchanged => {
            Err(LeagueError::database("update", "tournaments"))
        }
        crate::store::UpdateOutcome::Missing => {
            Err(LeagueError::not_found("Tournament", tournament))
        }
    }
}
