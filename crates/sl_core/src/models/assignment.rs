//! Referee assignments and their append-only status history.

use chrono::{DateTime, SubsecRound, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::matches::RefereeSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "UPPERCASE")]
pub enum AssignmentStatus {
    #[default]
    Requested,
    Unavailable,
    Assigned,
    Accepted,
    Declined,
}

impl AssignmentStatus {
    pub fn name(&self) -> &'static str {
        match self {
            AssignmentStatus::Requested => "REQUESTED",
            AssignmentStatus::Unavailable => "UNAVAILABLE",
            AssignmentStatus::Assigned => "ASSIGNED",
            AssignmentStatus::Accepted => "ACCEPTED",
            AssignmentStatus::Declined => "DECLINED",
        }
    }
}

/// Referee identity on an assignment, richer than the match snapshot: it
/// also carries the seasonal workload counter and grading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Referee {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl Referee {
    /// Display copy embedded into a match's `referee1`/`referee2` slot.
    pub fn snapshot(&self) -> RefereeSnapshot {
        RefereeSnapshot {
            user_id: self.user_id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            club_id: self.club_id.clone(),
            club_name: self.club_name.clone(),
            logo_url: self.logo_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    pub status: AssignmentStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by_name: Option<String>,
}

/// Authoritative record of who referees a match.
///
/// The match's `referee1`/`referee2` fields are a read-optimized copy of
/// this; the reconciler repairs drift between the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    /// Document id of the referenced match.
    pub match_id: String,
    pub referee: Referee,
    pub status: AssignmentStatus,
    /// Referee slot on the match, 1 or 2; unset while merely requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u8>,
    #[serde(default)]
    pub status_history: Vec<StatusHistoryEntry>,
}

impl Assignment {
    pub fn new(id: &str, match_id: &str, referee: Referee, status: AssignmentStatus) -> Self {
        Self {
            id: id.to_string(),
            match_id: match_id.to_string(),
            referee,
            status,
            position: None,
            status_history: Vec::new(),
        }
    }

    /// Append a history entry; timestamps are stored at second precision.
    pub fn push_history(
        &mut self,
        status: AssignmentStatus,
        at: DateTime<Utc>,
        updated_by: Option<&str>,
        updated_by_name: Option<&str>,
    ) {
        self.status_history.push(StatusHistoryEntry {
            status,
            timestamp: at.trunc_subsecs(0),
            updated_by: updated_by.map(str::to_string),
            updated_by_name: updated_by_name.map(str::to_string),
        });
    }
}
