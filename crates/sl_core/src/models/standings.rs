//! Standings rows and the per-team streak codes.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::matches::{MatchTeamStats, TeamSide};

/// Result code of one match from one team's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "UPPERCASE")]
pub enum StreakCode {
    W,
    L,
    D,
    Otw,
    Otl,
    Sow,
    Sol,
}

impl StreakCode {
    /// Derive the code from the 0/1 outcome markers of one match.
    ///
    /// The outcome engine sets at most one marker, so the first hit wins.
    pub fn from_stats(stats: &MatchTeamStats) -> Option<StreakCode> {
        if stats.win > 0 {
            Some(StreakCode::W)
        } else if stats.loss > 0 {
            Some(StreakCode::L)
        } else if stats.draw > 0 {
            Some(StreakCode::D)
        } else if stats.ot_win > 0 {
            Some(StreakCode::Otw)
        } else if stats.ot_loss > 0 {
            Some(StreakCode::Otl)
        } else if stats.so_win > 0 {
            Some(StreakCode::Sow)
        } else if stats.so_loss > 0 {
            Some(StreakCode::Sol)
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StreakCode::W => "W",
            StreakCode::L => "L",
            StreakCode::D => "D",
            StreakCode::Otw => "OTW",
            StreakCode::Otl => "OTL",
            StreakCode::Sow => "SOW",
            StreakCode::Sol => "SOL",
        }
    }
}

/// One team's accumulated line in a standings table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StandingsRow {
    pub team_id: String,
    pub name: String,
    pub full_name: String,
    pub short_name: String,
    pub tiny_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub games_played: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub ot_wins: u32,
    pub ot_losses: u32,
    pub so_wins: u32,
    pub so_losses: u32,
    /// Most recent results, oldest first, bounded by the configured length.
    #[serde(default)]
    pub streak: Vec<StreakCode>,
}

impl StandingsRow {
    /// Fresh zeroed row carrying a side's display identity.
    pub fn from_side(side: &TeamSide) -> Self {
        Self {
            team_id: side.team_id.clone(),
            name: side.name.clone(),
            full_name: side.full_name.clone(),
            short_name: side.short_name.clone(),
            tiny_name: side.tiny_name.clone(),
            logo: side.logo.clone(),
            ..StandingsRow::default()
        }
    }

    pub fn add_stats(&mut self, stats: &MatchTeamStats) {
        self.games_played += stats.game_played;
        self.goals_for += stats.goals_for;
        self.goals_against += stats.goals_against;
        self.points += stats.points;
        self.wins += stats.win;
        self.losses += stats.loss;
        self.draws += stats.draw;
        self.ot_wins += stats.ot_win;
        self.ot_losses += stats.ot_loss;
        self.so_wins += stats.so_win;
        self.so_losses += stats.so_loss;
    }

    pub fn goal_diff(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }

    /// Append a result code, dropping the oldest beyond `max_len`.
    pub fn push_streak(&mut self, code: StreakCode, max_len: usize) {
        self.streak.push(code);
        if self.streak.len() > max_len {
            let excess = self.streak.len() - max_len;
            self.streak.drain(..excess);
        }
    }
}

/// Standings table keyed by team id; ordering of iteration is by key, the
/// ranked presentation order is computed separately.
pub type StandingsMap = BTreeMap<String, StandingsRow>;
