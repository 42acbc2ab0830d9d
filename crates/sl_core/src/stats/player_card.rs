//! Career stat lines per player, maintained incrementally.
//!
//! Unlike standings, player cards are never rebuilt from scratch: a full
//! recompute would need the player's entire match history. Every mutation
//! therefore feeds the career lines a signed delta, and appearance counts
//! follow roster membership so replaying the same save is a no-op.

use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::{LeagueError, Result};
use crate::models::matches::{Match, ScopeRef, TeamFlag};
use crate::models::player::{PlayUpOccurrence, PlayerStatLine};
use crate::models::roster::{Roster, RosterPlayer};
use crate::store::{LeagueStore, UpdateOutcome};

/// Granularity keys and stat gates for one match, resolved against the
/// owning tournament document.
#[derive(Debug, Clone, PartialEq)]
pub struct CardScope {
    pub tournament: ScopeRef,
    pub season: ScopeRef,
    pub round: ScopeRef,
    pub matchday: Option<ScopeRef>,
    pub round_stats: bool,
    pub matchday_stats: bool,
}

impl CardScope {
    /// Resolve the card scope for a match. Matches outside any tournament
    /// have none and are skipped by every card path.
    pub fn resolve<S: LeagueStore>(store: &S, m: &Match) -> Result<Option<CardScope>> {
        let (Some(tournament), Some(season), Some(round)) = (&m.tournament, &m.season, &m.round)
        else {
            return Ok(None);
        };

        let doc = store
            .get_tournament(&tournament.alias)?
            .ok_or_else(|| LeagueError::not_found("Tournament", &tournament.alias))?;
        let round_doc = doc
            .season(&season.alias)
            .and_then(|s| s.round(&round.alias))
            .ok_or_else(|| {
                LeagueError::not_found_in(
                    "Round",
                    &round.alias,
                    format!("season '{}' of '{}'", season.alias, tournament.alias),
                )
            })?;
        let matchday_stats = m
            .matchday
            .as_ref()
            .and_then(|md| round_doc.matchday(&md.alias))
            .map(|md| md.create_stats)
            .unwrap_or(false);

        Ok(Some(CardScope {
            tournament: tournament.clone(),
            season: season.clone(),
            round: round.clone(),
            matchday: m.matchday.clone(),
            round_stats: round_doc.create_stats,
            matchday_stats,
        }))
    }

    pub fn any_enabled(&self) -> bool {
        self.round_stats || (self.matchday_stats && self.matchday.is_some())
    }
}

/// Signed change to one player's accumulators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDelta {
    pub goals: i32,
    pub assists: i32,
    pub points: i32,
    pub penalty_minutes: i32,
}

impl CardDelta {
    /// Difference between two snapshots of the same roster entry.
    pub fn diff(before: &RosterPlayer, after: &RosterPlayer) -> Self {
        fn signed(before: u32, after: u32) -> i32 {
            after as i32 - before as i32
        }
        Self {
            goals: signed(before.goals, after.goals),
            assists: signed(before.assists, after.assists),
            points: signed(before.points, after.points),
            penalty_minutes: signed(before.penalty_minutes, after.penalty_minutes),
        }
    }

    /// Per-player deltas between two snapshots of a roster. Players joining
    /// the roster contribute their full accumulators, players leaving give
    /// theirs back.
    pub fn between(before: &Roster, after: &Roster) -> Vec<(String, CardDelta)> {
        let mut deltas = Vec::new();
        for entry in &after.players {
            let delta = match before.player(&entry.player.player_id) {
                Some(prev) => Self::diff(prev, entry),
                None => Self::from_entry(entry),
            };
            if !delta.is_zero() {
                deltas.push((entry.player.player_id.clone(), delta));
            }
        }
        for entry in &before.players {
            if after.player(&entry.player.player_id).is_none() {
                let delta = Self::from_entry(entry).negated();
                if !delta.is_zero() {
                    deltas.push((entry.player.player_id.clone(), delta));
                }
            }
        }
        deltas
    }

    fn from_entry(entry: &RosterPlayer) -> Self {
        Self {
            goals: entry.goals as i32,
            assists: entry.assists as i32,
            points: entry.points as i32,
            penalty_minutes: entry.penalty_minutes as i32,
        }
    }

    fn negated(self) -> Self {
        Self {
            goals: -self.goals,
            assists: -self.assists,
            points: -self.points,
            penalty_minutes: -self.penalty_minutes,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    fn apply_to(&self, line: &mut PlayerStatLine) {
        add_signed(&mut line.goals, self.goals);
        add_signed(&mut line.assists, self.assists);
        add_signed(&mut line.points, self.points);
        add_signed(&mut line.penalty_minutes, self.penalty_minutes);
    }
}

fn add_signed(slot: &mut u32, delta: i32) {
    if delta >= 0 {
        *slot += delta as u32;
    } else {
        *slot = slot.saturating_sub(delta.unsigned_abs());
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationSummary {
    pub added: usize,
    pub removed: usize,
    pub called: usize,
    pub capped: usize,
}

pub struct PlayerCardAggregator;

impl PlayerCardAggregator {
    /// Fold per-player deltas into career lines at every enabled granularity.
    ///
    /// Returns how many player records were touched. A roster entry without
    /// a stored player record is logged and skipped; the match document
    /// already holds the authoritative accumulators.
    pub fn apply_deltas<S: LeagueStore>(
        store: &S,
        scope: &CardScope,
        deltas: &[(String, CardDelta)],
    ) -> Result<usize> {
        if !scope.any_enabled() {
            return Ok(0);
        }
        let mut applied = 0;
        for (player_id, delta) in deltas {
            if delta.is_zero() {
                continue;
            }
            let outcome = store.update_player(player_id, |player| {
                if scope.round_stats {
                    delta.apply_to(player.stat_line_mut(
                        &scope.tournament,
                        &scope.season,
                        &scope.round,
                        None,
                    ));
                }
                if scope.matchday_stats {
                    if let Some(matchday) = &scope.matchday {
                        delta.apply_to(player.stat_line_mut(
                            &scope.tournament,
                            &scope.season,
                            &scope.round,
                            Some(matchday),
                        ));
                    }
                }
                Ok(true)
            })?;
            match outcome {
                UpdateOutcome::Modified => applied += 1,
                UpdateOutcome::Missing => {
                    log::warn!("No player record for '{player_id}'; career stats not updated");
                }
                UpdateOutcome::Unchanged => {}
            }
        }
        Ok(applied)
    }

    /// Adjust appearance counts for one side after its roster changed.
    ///
    /// Players joining the roster gain a game played on every enabled career
    /// line, players leaving give it back. A called appearance also consumes
    /// the play-up allowance for the destination team; the occurrence is
    /// keyed by match id, so the allowance moves at most once per match even
    /// when a save is replayed against a stale roster snapshot. Reaching the
    /// allowance surfaces a standing CALLED license for the destination team.
    pub fn record_participation<S: LeagueStore>(
        store: &S,
        config: &EngineConfig,
        scope: &CardScope,
        m: &Match,
        team: TeamFlag,
        before: &Roster,
        after: &Roster,
    ) -> Result<ParticipationSummary> {
        let mut summary = ParticipationSummary::default();
        if !scope.any_enabled() {
            return Ok(summary);
        }
        let side = m.side(team);

        let mut player_ids: Vec<&str> = Vec::new();
        for entry in &after.players {
            player_ids.push(&entry.player.player_id);
        }
        for entry in &before.players {
            if after.player(&entry.player.player_id).is_none() {
                player_ids.push(&entry.player.player_id);
            }
        }

        for player_id in player_ids {
            let prev = before.player(player_id);
            let next = after.player(player_id);
            let games = i32::from(next.is_some()) - i32::from(prev.is_some());
            let called =
                i32::from(next.is_some_and(|e| e.called)) - i32::from(prev.is_some_and(|e| e.called));
            if games == 0 && called == 0 {
                continue;
            }
            let origin = next.and_then(|e| e.called_from_team.as_ref());

            let mut capped = false;
            let outcome = store.update_player(player_id, |player| {
                let mut changed = false;
                if scope.round_stats {
                    let line =
                        player.stat_line_mut(&scope.tournament, &scope.season, &scope.round, None);
                    add_signed(&mut line.games_played, games);
                    add_signed(&mut line.called_matches, called);
                    changed = true;
                }
                if scope.matchday_stats {
                    if let Some(matchday) = &scope.matchday {
                        let line = player.stat_line_mut(
                            &scope.tournament,
                            &scope.season,
                            &scope.round,
                            Some(matchday),
                        );
                        add_signed(&mut line.games_played, games);
                        add_signed(&mut line.called_matches, called);
                        changed = true;
                    }
                }

                if called > 0 {
                    if let Some(origin) = origin {
                        let tracking = player.tracking_mut(&origin.team_id, &side.team_id);
                        if !tracking.occurrences.iter().any(|o| o.match_id == m.id) {
                            tracking.occurrences.push(PlayUpOccurrence {
                                match_id: m.id.clone(),
                                counted: scope.round_stats,
                            });
                            changed = true;
                        }
                        if player.counted_call_ups_to(&side.team_id) >= config.called_match_limit
                            && player.license_for(&side.team_id).is_none()
                        {
                            player.add_called_assignment(
                                side.club_id.as_deref().unwrap_or_default(),
                                side.club_name.as_deref().unwrap_or_default(),
                                &side.team_id,
                                &side.name,
                            );
                            capped = true;
                            changed = true;
                        }
                    }
                } else if called < 0 {
                    for tracking in player
                        .play_up_trackings
                        .iter_mut()
                        .filter(|t| t.to_team_id == side.team_id)
                    {
                        let len = tracking.occurrences.len();
                        tracking.occurrences.retain(|o| o.match_id != m.id);
                        if tracking.occurrences.len() != len {
                            changed = true;
                        }
                    }
                }
                Ok(changed)
            })?;

            match outcome {
                UpdateOutcome::Modified => {
                    if games > 0 {
                        summary.added += 1;
                    } else if games < 0 {
                        summary.removed += 1;
                    }
                    if called > 0 {
                        summary.called += 1;
                    }
                    if capped {
                        summary.capped += 1;
                    }
                }
                UpdateOutcome::Missing => {
                    log::warn!(
                        "No player record for '{player_id}'; appearance in match '{}' not recorded",
                        m.id
                    );
                }
                UpdateOutcome::Unchanged => {}
            }
        }

        log::debug!(
            "Adjusted participation for match '{}' {} side: {} joined, {} left, {} called",
            m.id,
            team.name(),
            summary.added,
            summary.removed,
            summary.called
        );
        Ok(summary)
    }
}
