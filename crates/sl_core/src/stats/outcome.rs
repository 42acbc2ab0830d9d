//! Match outcome engine: turns a goal tally into the two sides' stat
//! records.
//!
//! Idempotent for a fixed (status, finish type, scores) input; the score
//! services call [`refresh`] after every tally change and again on finish.

use crate::models::matches::{FinishType, Match, MatchStatus, MatchTeamStats};
use crate::models::settings::StandingsSettings;

use super::points;

/// Compute both sides' stat records from a goal tally.
///
/// Only active statuses (in progress, finished, forfeited) produce an
/// outcome; otherwise the records just mirror the recorded goals with no
/// game played, no markers and no points.
pub fn compute(
    status: MatchStatus,
    finish: FinishType,
    settings: &StandingsSettings,
    home_goals: u32,
    away_goals: u32,
) -> (MatchTeamStats, MatchTeamStats) {
    let mut home = MatchTeamStats {
        goals_for: home_goals,
        goals_against: away_goals,
        ..Default::default()
    };
    let mut away = MatchTeamStats {
        goals_for: away_goals,
        goals_against: home_goals,
        ..Default::default()
    };

    if status.is_active() {
        home.game_played = 1;
        away.game_played = 1;
        let (home_outcome, away_outcome) = points::decide(finish, home_goals, away_goals);
        home_outcome.apply(&mut home, settings);
        away_outcome.apply(&mut away, settings);
    }

    (home, away)
}

/// Refresh both sides' stats from the current goal tallies.
pub fn refresh(m: &mut Match, settings: &StandingsSettings) {
    let home_goals = m.home.stats.goals_for;
    let away_goals = m.away.stats.goals_for;
    let (home, away) =
        compute(m.match_status, m.finish_type, settings, home_goals, away_goals);
    m.home.stats = home;
    m.away.stats = away;
}

/// Refresh both sides' stats with tallies re-derived from the score event
/// lists. Ground-truth path used after non-incremental edits.
pub fn refresh_from_events(m: &mut Match, settings: &StandingsSettings) {
    let home_goals = m.home.scores.len() as u32;
    let away_goals = m.away.scores.len() as u32;
    let (home, away) =
        compute(m.match_status, m.finish_type, settings, home_goals, away_goals);
    m.home.stats = home;
    m.away.stats = away;
}
