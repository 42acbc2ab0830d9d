//! Match document and its embedded team sides.
//!
//! The match is the unit of atomicity for every live-scoring write: event
//! lists, rosters and per-team stats all live inside it.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{LeagueError, Result};

use super::events::{PenaltyEvent, ScoreEvent};
use super::roster::Roster;
use super::settings::StandingsSettings;

/// Open-vocabulary key/value pair (penalty codes, player positions).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// Reference to a tournament/season/round/matchday by display name and alias.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScopeRef {
    pub name: String,
    pub alias: String,
}

impl From<(&str, &str)> for ScopeRef {
    fn from((name, alias): (&str, &str)) -> Self {
        Self { name: name.to_string(), alias: alias.to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Finished,
    Forfeited,
    Cancelled,
}

impl MatchStatus {
    /// Whether a match in this status contributes outcome stats.
    pub fn is_active(&self) -> bool {
        matches!(self, MatchStatus::InProgress | MatchStatus::Finished | MatchStatus::Forfeited)
    }

    /// Live matches are the only ones whose event lists may be mutated.
    pub fn is_live(&self) -> bool {
        matches!(self, MatchStatus::InProgress)
    }

    pub fn name(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "SCHEDULED",
            MatchStatus::InProgress => "INPROGRESS",
            MatchStatus::Finished => "FINISHED",
            MatchStatus::Forfeited => "FORFEITED",
            MatchStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "UPPERCASE")]
pub enum FinishType {
    #[default]
    Regular,
    Overtime,
    Shootout,
}

impl FinishType {
    pub fn name(&self) -> &'static str {
        match self {
            FinishType::Regular => "REGULAR",
            FinishType::Overtime => "OVERTIME",
            FinishType::Shootout => "SHOOTOUT",
        }
    }
}

/// Selects one of the two sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamFlag {
    Home,
    Away,
}

impl TeamFlag {
    pub fn opponent(&self) -> TeamFlag {
        match self {
            TeamFlag::Home => TeamFlag::Away,
            TeamFlag::Away => TeamFlag::Home,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TeamFlag::Home => "home",
            TeamFlag::Away => "away",
        }
    }

    /// Parse a caller-supplied flag, rejecting anything but `home`/`away`.
    pub fn parse(value: &str) -> Result<TeamFlag> {
        match value {
            "home" => Ok(TeamFlag::Home),
            "away" => Ok(TeamFlag::Away),
            other => Err(LeagueError::validation_in(
                "team_flag",
                "must be 'home' or 'away'",
                format!("got '{other}'"),
            )),
        }
    }
}

/// Referee identity denormalized into the match for display.
///
/// The assignment record stays authoritative; the reconciler repairs drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefereeSnapshot {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

/// Per-team outcome stats for one match.
///
/// `win`..`soLoss` are 0/1 markers so standings can sum them directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchTeamStats {
    pub game_played: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
    pub win: u32,
    pub loss: u32,
    pub draw: u32,
    pub ot_win: u32,
    pub ot_loss: u32,
    pub so_win: u32,
    pub so_loss: u32,
}

/// One side of a match: identity, roster, events and derived stats.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSide {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_name: Option<String>,
    pub team_id: String,
    pub team_alias: String,
    pub name: String,
    pub full_name: String,
    pub short_name: String,
    pub tiny_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default)]
    pub roster: Roster,
    #[serde(default)]
    pub scores: Vec<ScoreEvent>,
    #[serde(default)]
    pub penalties: Vec<PenaltyEvent>,
    #[serde(default)]
    pub stats: MatchTeamStats,
}

impl TeamSide {
    pub fn named(team_id: &str, name: &str) -> Self {
        Self {
            team_id: team_id.to_string(),
            team_alias: team_id.to_string(),
            name: name.to_string(),
            full_name: name.to_string(),
            short_name: name.to_string(),
            tiny_name: name.to_string(),
            ..TeamSide::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    /// Public numeric match number, stable across systems.
    pub match_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament: Option<ScopeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<ScopeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<ScopeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matchday: Option<ScopeRef>,
    pub home: TeamSide,
    pub away: TeamSide,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referee1: Option<RefereeSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referee2: Option<RefereeSnapshot>,
    pub match_status: MatchStatus,
    pub finish_type: FinishType,
    /// Per-match points schema override; normally resolved from the tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_settings: Option<StandingsSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    pub published: bool,
}

impl Match {
    pub fn new(id: &str, match_id: u32) -> Self {
        Self {
            id: id.to_string(),
            match_id,
            tournament: None,
            season: None,
            round: None,
            matchday: None,
            home: TeamSide::default(),
            away: TeamSide::default(),
            referee1: None,
            referee2: None,
            match_status: MatchStatus::default(),
            finish_type: FinishType::default(),
            match_settings: None,
            venue: None,
            start_date: None,
            published: false,
        }
    }

    pub fn side(&self, flag: TeamFlag) -> &TeamSide {
        match flag {
            TeamFlag::Home => &self.home,
            TeamFlag::Away => &self.away,
        }
    }

    pub fn side_mut(&mut self, flag: TeamFlag) -> &mut TeamSide {
        match flag {
            TeamFlag::Home => &mut self.home,
            TeamFlag::Away => &mut self.away,
        }
    }

    pub fn referee_slot(&self, position: u8) -> &Option<RefereeSnapshot> {
        match position {
            1 => &self.referee1,
            _ => &self.referee2,
        }
    }

    pub fn referee_slot_mut(&mut self, position: u8) -> &mut Option<RefereeSnapshot> {
        match position {
            1 => &mut self.referee1,
            _ => &mut self.referee2,
        }
    }
}
