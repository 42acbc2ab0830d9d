//! Points schema for standings and its resolution across the tournament tree.

use serde::{Deserialize, Serialize};

use super::matches::Match;
use super::tournament::Tournament;

/// Point values awarded per result type and finish type.
///
/// Immutable input to the points policy. A schema can be attached at match,
/// matchday, round or season level; [`resolve`] picks the most specific one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StandingsSettings {
    pub points_win_reg: u32,
    pub points_draw_reg: u32,
    pub points_loss_reg: u32,
    pub points_win_overtime: u32,
    pub points_loss_overtime: u32,
    pub points_win_shootout: u32,
    pub points_loss_shootout: u32,
}

impl Default for StandingsSettings {
    fn default() -> Self {
        Self {
            points_win_reg: 3,
            points_draw_reg: 1,
            points_loss_reg: 0,
            points_win_overtime: 2,
            points_loss_overtime: 1,
            points_win_shootout: 2,
            points_loss_shootout: 1,
        }
    }
}

/// Which level of the tree supplied the effective schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsSource {
    Match,
    Matchday,
    Round,
    Season,
    Default,
}

impl SettingsSource {
    pub fn name(&self) -> &'static str {
        match self {
            SettingsSource::Match => "match",
            SettingsSource::Matchday => "matchday",
            SettingsSource::Round => "round",
            SettingsSource::Season => "season",
            SettingsSource::Default => "default",
        }
    }
}

/// Resolve the effective schema for a match: match override, then matchday,
/// round, season, finally `fallback`.
pub fn resolve(
    m: &Match,
    tournament: Option<&Tournament>,
    fallback: &StandingsSettings,
) -> (StandingsSettings, SettingsSource) {
    if let Some(own) = &m.match_settings {
        return (own.clone(), SettingsSource::Match);
    }

    let season = tournament.and_then(|t| {
        m.season.as_ref().and_then(|s| t.season(&s.alias))
    });

    if let Some(season) = season {
        let round = m.round.as_ref().and_then(|r| season.round(&r.alias));

        if let Some(round) = round {
            if let Some(md_ref) = &m.matchday {
                if let Some(matchday) = round.matchday(&md_ref.alias) {
                    if let Some(s) = &matchday.standings_settings {
                        return (s.clone(), SettingsSource::Matchday);
                    }
                }
            }
            if let Some(s) = &round.standings_settings {
                return (s.clone(), SettingsSource::Round);
            }
        }

        if let Some(s) = &season.standings_settings {
            return (s.clone(), SettingsSource::Season);
        }
    }

    (fallback.clone(), SettingsSource::Default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::matches::Match;
    use crate::models::tournament::{Matchday, Round, Season, Tournament};

    fn schema(win_reg: u32) -> StandingsSettings {
        StandingsSettings { points_win_reg: win_reg, ..StandingsSettings::default() }
    }

    fn make_tournament() -> Tournament {
        Tournament {
            name: "City League".into(),
            alias: "city-league".into(),
            seasons: vec![Season {
                name: "2025".into(),
                alias: "2025".into(),
                standings_settings: Some(schema(10)),
                rounds: vec![Round {
                    name: "Main Round".into(),
                    alias: "main".into(),
                    standings_settings: Some(schema(20)),
                    matchdays: vec![Matchday {
                        name: "Day 1".into(),
                        alias: "day-1".into(),
                        standings_settings: Some(schema(30)),
                        ..Matchday::default()
                    }],
                    ..Round::default()
                }],
                ..Season::default()
            }],
            ..Tournament::default()
        }
    }

    fn scoped_match() -> Match {
        let mut m = Match::new("m-1", 1);
        m.tournament = Some(("City League", "city-league").into());
        m.season = Some(("2025", "2025").into());
        m.round = Some(("Main Round", "main").into());
        m.matchday = Some(("Day 1", "day-1").into());
        m
    }

    #[test]
    fn test_match_override_wins() {
        let mut m = scoped_match();
        m.match_settings = Some(schema(99));
        let (s, src) = resolve(&m, Some(&make_tournament()), &StandingsSettings::default());
        assert_eq!(s.points_win_reg, 99);
        assert_eq!(src, SettingsSource::Match);
    }

    #[test]
    fn test_most_specific_scope_wins() {
        let m = scoped_match();
        let (s, src) = resolve(&m, Some(&make_tournament()), &StandingsSettings::default());
        assert_eq!(s.points_win_reg, 30);
        assert_eq!(src, SettingsSource::Matchday);
    }

    #[test]
    fn test_falls_back_through_round_and_season() {
        let mut t = make_tournament();
        t.seasons[0].rounds[0].matchdays[0].standings_settings = None;
        let m = scoped_match();
        let (s, src) = resolve(&m, Some(&t), &StandingsSettings::default());
        assert_eq!((s.points_win_reg, src), (20, SettingsSource::Round));

        t.seasons[0].rounds[0].standings_settings = None;
        let (s, src) = resolve(&m, Some(&t), &StandingsSettings::default());
        assert_eq!((s.points_win_reg, src), (10, SettingsSource::Season));
    }

    #[test]
    fn test_default_when_unscoped() {
        let m = Match::new("m-2", 2);
        let (s, src) = resolve(&m, None, &StandingsSettings::default());
        assert_eq!(s, StandingsSettings::default());
        assert_eq!(src, SettingsSource::Default);
    }
}
