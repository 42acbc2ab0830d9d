//! Tournament tree: seasons, rounds and matchdays.
//!
//! Rounds and matchdays carry their own standings tables and the flags
//! gating whether standings and player stats are produced at that level.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::settings::StandingsSettings;
use super::standings::StandingsMap;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matchday {
    pub name: String,
    pub alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub create_standings: bool,
    #[serde(default)]
    pub create_stats: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standings_settings: Option<StandingsSettings>,
    #[serde(default)]
    pub standings: StandingsMap,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub name: String,
    pub alias: String,
    #[serde(default)]
    pub create_standings: bool,
    #[serde(default)]
    pub create_stats: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standings_settings: Option<StandingsSettings>,
    #[serde(default)]
    pub standings: StandingsMap,
    #[serde(default)]
    pub matchdays: Vec<Matchday>,
}

impl Round {
    pub fn matchday(&self, alias: &str) -> Option<&Matchday> {
        self.matchdays.iter().find(|md| md.alias == alias)
    }

    pub fn matchday_mut(&mut self, alias: &str) -> Option<&mut Matchday> {
        self.matchdays.iter_mut().find(|md| md.alias == alias)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub name: String,
    pub alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standings_settings: Option<StandingsSettings>,
    #[serde(default)]
    pub rounds: Vec<Round>,
}

impl Season {
    pub fn round(&self, alias: &str) -> Option<&Round> {
        self.rounds.iter().find(|r| r.alias == alias)
    }

    pub fn round_mut(&mut self, alias: &str) -> Option<&mut Round> {
        self.rounds.iter_mut().find(|r| r.alias == alias)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub name: String,
    pub alias: String,
    #[serde(default)]
    pub seasons: Vec<Season>,
}

impl Tournament {
    pub fn season(&self, alias: &str) -> Option<&Season> {
        self.seasons.iter().find(|s| s.alias == alias)
    }

    pub fn season_mut(&mut self, alias: &str) -> Option<&mut Season> {
        self.seasons.iter_mut().find(|s| s.alias == alias)
    }
}
