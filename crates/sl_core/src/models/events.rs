//! Score and penalty events embedded in a team side.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{LeagueError, Result};

use super::matches::KeyValue;

/// Player identity frozen into an event at creation time.
///
/// Jersey number is copied from the roster entry so later roster edits do
/// not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPlayer {
    pub player_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jersey_number: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEvent {
    pub id: String,
    /// Display form `MM:SS`; `match_seconds` is the derived sort key.
    pub match_time: String,
    pub match_seconds: u32,
    pub goal_player: EventPlayer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assist_player: Option<EventPlayer>,
    /// Power-play goal.
    #[serde(rename = "isPPG", default)]
    pub is_ppg: bool,
    /// Short-handed goal.
    #[serde(rename = "isSHG", default)]
    pub is_shg: bool,
    /// Game-winning goal.
    #[serde(rename = "isGWG", default)]
    pub is_gwg: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyEvent {
    pub id: String,
    pub match_time_start: String,
    /// `None` while the penalty is still being served.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_time_end: Option<String>,
    pub match_seconds_start: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_seconds_end: Option<u32>,
    pub penalty_player: EventPlayer,
    pub penalty_code: KeyValue,
    pub penalty_minutes: u32,
    /// Game misconduct.
    #[serde(rename = "isGM", default)]
    pub is_gm: bool,
    /// Match penalty.
    #[serde(rename = "isMP", default)]
    pub is_mp: bool,
}

// ============================================================================
// Wire payloads
// ============================================================================

/// Caller payload for creating or updating a score event.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScorePayload {
    #[validate(custom(function = "validate_match_time"))]
    pub match_time: String,
    #[validate(length(min = 1, message = "goal player id must not be empty"))]
    pub goal_player_id: String,
    #[serde(default)]
    pub assist_player_id: Option<String>,
    #[serde(rename = "isPPG", default)]
    pub is_ppg: bool,
    #[serde(rename = "isSHG", default)]
    pub is_shg: bool,
    #[serde(rename = "isGWG", default)]
    pub is_gwg: bool,
}

/// Caller payload for creating or updating a penalty event.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyPayload {
    #[validate(custom(function = "validate_match_time"))]
    pub match_time_start: String,
    #[serde(default)]
    pub match_time_end: Option<String>,
    #[validate(length(min = 1, message = "penalty player id must not be empty"))]
    pub penalty_player_id: String,
    pub penalty_code: KeyValue,
    #[validate(range(min = 1, max = 60, message = "penalty minutes out of range"))]
    pub penalty_minutes: u32,
    #[serde(rename = "isGM", default)]
    pub is_gm: bool,
    #[serde(rename = "isMP", default)]
    pub is_mp: bool,
}

// ============================================================================
// Match-time parsing
// ============================================================================

/// Parse a `MM:SS` match-time string into total seconds.
///
/// Minutes are unbounded (overtime periods run past 60), seconds must be
/// below 60.
pub fn parse_match_time(value: &str) -> Result<u32> {
    let err = || {
        LeagueError::validation_in("match_time", "must be in MM:SS format", format!("got '{value}'"))
    };
    let (minutes, seconds) = value.split_once(':').ok_or_else(err)?;
    if minutes.is_empty() || seconds.len() != 2 {
        return Err(err());
    }
    let minutes: u32 = minutes.parse().map_err(|_| err())?;
    let seconds: u32 = seconds.parse().map_err(|_| err())?;
    if seconds >= 60 {
        return Err(err());
    }
    Ok(minutes * 60 + seconds)
}

/// Render total seconds back to the `MM:SS` wire form.
pub fn format_match_time(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

fn validate_match_time(value: &str) -> std::result::Result<(), validator::ValidationError> {
    parse_match_time(value)
        .map(|_| ())
        .map_err(|_| validator::ValidationError::new("match_time"))
}
