//! Match rosters: who is dressed for a side, their in-match stat lines and
//! per-player eligibility verdicts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::events::EventPlayer;
use super::matches::KeyValue;

/// Workflow state of one side's roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "UPPERCASE")]
pub enum RosterStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    Invalid,
}

impl RosterStatus {
    pub fn name(&self) -> &'static str {
        match self {
            RosterStatus::Draft => "DRAFT",
            RosterStatus::Submitted => "SUBMITTED",
            RosterStatus::Approved => "APPROVED",
            RosterStatus::Invalid => "INVALID",
        }
    }
}

/// Per-player approval verdict, distinct from the roster's workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EligibilityStatus {
    Valid,
    Invalid,
    #[default]
    Unknown,
}

impl EligibilityStatus {
    pub fn name(&self) -> &'static str {
        match self {
            EligibilityStatus::Valid => "VALID",
            EligibilityStatus::Invalid => "INVALID",
            EligibilityStatus::Unknown => "UNKNOWN",
        }
    }
}

/// Closed vocabulary of license/eligibility failure reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    /// Player is registered as primary in more than one team.
    MultiplePrimary,
    /// Player holds more loan registrations than permitted.
    TooManyLoan,
    /// Registry import produced contradictory records for the player.
    ImportConflict,
    /// Player's license points at a different club than the roster's.
    ConflictingClub,
    /// Player is over the age cap of the competition.
    OverageNotAllowed,
    /// Player's age group does not match the competition's.
    AgeGroupViolation,
    /// Player exceeds the rulebook limit on parallel registrations.
    ExceedsRegulationLimit,
    /// Called-up appearance cap for the destination team is exhausted.
    CalledLimitExceeded,
}

impl ReasonCode {
    pub fn name(&self) -> &'static str {
        match self {
            ReasonCode::MultiplePrimary => "MULTIPLE_PRIMARY",
            ReasonCode::TooManyLoan => "TOO_MANY_LOAN",
            ReasonCode::ImportConflict => "IMPORT_CONFLICT",
            ReasonCode::ConflictingClub => "CONFLICTING_CLUB",
            ReasonCode::OverageNotAllowed => "OVERAGE_NOT_ALLOWED",
            ReasonCode::AgeGroupViolation => "AGE_GROUP_VIOLATION",
            ReasonCode::ExceedsRegulationLimit => "EXCEEDS_REGULATION_LIMIT",
            ReasonCode::CalledLimitExceeded => "CALLED_LIMIT_EXCEEDED",
        }
    }
}

/// Minimal team reference used where only identity matters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRef {
    pub team_id: String,
    pub name: String,
}

impl From<(&str, &str)> for TeamRef {
    fn from((team_id, name): (&str, &str)) -> Self {
        Self { team_id: team_id.to_string(), name: name.to_string() }
    }
}

/// One dressed player on a side.
///
/// The four accumulators are derived from the side's event lists and must
/// always equal a full recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPlayer {
    pub player: EventPlayer,
    pub player_position: KeyValue,
    pub pass_number: String,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub penalty_minutes: u32,
    /// Player is called up from a lower team for this match.
    #[serde(default)]
    pub called: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub called_from_team: Option<TeamRef>,
    #[serde(default)]
    pub eligibility_status: EligibilityStatus,
    #[serde(default)]
    pub eligibility_reasons: Vec<ReasonCode>,
}

impl RosterPlayer {
    pub fn new(player: EventPlayer, position: KeyValue, pass_number: &str) -> Self {
        Self {
            player,
            player_position: position,
            pass_number: pass_number.to_string(),
            goals: 0,
            assists: 0,
            points: 0,
            penalty_minutes: 0,
            called: false,
            called_from_team: None,
            eligibility_status: EligibilityStatus::default(),
            eligibility_reasons: Vec::new(),
        }
    }

    pub fn reset_eligibility(&mut self) {
        self.eligibility_status = EligibilityStatus::Unknown;
        self.eligibility_reasons.clear();
    }

    pub fn reset_stats(&mut self) {
        self.goals = 0;
        self.assists = 0;
        self.points = 0;
        self.penalty_minutes = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    #[serde(default)]
    pub players: Vec<RosterPlayer>,
    pub status: RosterStatus,
    #[serde(default)]
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligibility_timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligibility_validator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coach: Option<String>,
    #[serde(default)]
    pub staff: Vec<String>,
}

impl Roster {
    pub fn contains(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p.player.player_id == player_id)
    }

    pub fn player(&self, player_id: &str) -> Option<&RosterPlayer> {
        self.players.iter().find(|p| p.player.player_id == player_id)
    }

    pub fn player_mut(&mut self, player_id: &str) -> Option<&mut RosterPlayer> {
        self.players.iter_mut().find(|p| p.player.player_id == player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_player(player_id: &str, jersey: u32) -> RosterPlayer {
        RosterPlayer::new(
            EventPlayer {
                player_id: player_id.to_string(),
                first_name: "Alex".into(),
                last_name: "Kurt".into(),
                jersey_number: Some(jersey),
            },
            KeyValue::new("F", "Forward"),
            &format!("PASS-{jersey}"),
        )
    }

    #[test]
    fn test_roster_lookup() {
        let mut roster = Roster::default();
        roster.players.push(make_player("p-1", 7));
        roster.players.push(make_player("p-2", 9));

        assert!(roster.contains("p-1"));
        assert!(!roster.contains("p-3"));
        assert_eq!(roster.player("p-2").unwrap().pass_number, "PASS-9");

        roster.player_mut("p-1").unwrap().goals += 1;
        assert_eq!(roster.player("p-1").unwrap().goals, 1);
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&RosterStatus::Submitted).unwrap();
        assert_eq!(json, "\"SUBMITTED\"");
        let back: RosterStatus = serde_json::from_str("\"INVALID\"").unwrap();
        assert_eq!(back, RosterStatus::Invalid);
    }

    #[test]
    fn test_reason_code_wire_names() {
        let json = serde_json::to_string(&ReasonCode::CalledLimitExceeded).unwrap();
        assert_eq!(json, "\"CALLED_LIMIT_EXCEEDED\"");
        let json = serde_json::to_string(&ReasonCode::MultiplePrimary).unwrap();
        assert_eq!(json, "\"MULTIPLE_PRIMARY\"");
    }

    #[test]
    fn test_reset_eligibility() {
        let mut player = make_player("p-1", 7);
        player.eligibility_status = EligibilityStatus::Valid;
        player.eligibility_reasons.push(ReasonCode::ConflictingClub);
        player.reset_eligibility();
        assert_eq!(player.eligibility_status, EligibilityStatus::Unknown);
        assert!(player.eligibility_reasons.is_empty());
    }
}
