//! Global player records: team assignments with license verdicts, career
//! stat lines and the call-up appearance trackers.

use serde::{Deserialize, Serialize};

use super::matches::ScopeRef;
use super::roster::{EligibilityStatus, ReasonCode};

/// How a player ended up assigned to a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssignmentSource {
    /// Registered through the league's own administration.
    League,
    /// Imported from the national federation registry.
    Federation,
    /// Standing call-up assignment created when the appearance cap is hit.
    Called,
}

/// One team a player is licensed for, with the license verdict attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedTeam {
    pub team_id: String,
    pub team_name: String,
    pub pass_no: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jersey_no: Option<u32>,
    pub source: AssignmentSource,
    /// License verdict from registry validation; `None` means not yet checked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EligibilityStatus>,
    #[serde(default)]
    pub invalid_reason_codes: Vec<ReasonCode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedClub {
    pub club_id: String,
    pub club_name: String,
    #[serde(default)]
    pub teams: Vec<AssignedTeam>,
}

/// One career stat line, keyed by tournament/season/round and optionally
/// matchday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatLine {
    pub tournament: ScopeRef,
    pub season: ScopeRef,
    pub round: ScopeRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matchday: Option<ScopeRef>,
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub penalty_minutes: u32,
    /// Appearances on this line made as a called-up player.
    #[serde(default)]
    pub called_matches: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayUpOccurrence {
    pub match_id: String,
    /// Uncounted occurrences (friendlies, voided matches) do not consume
    /// the cap.
    pub counted: bool,
}

/// Appearance tracker for one (origin team → destination team) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayUpTracking {
    pub from_team_id: String,
    pub to_team_id: String,
    #[serde(default)]
    pub occurrences: Vec<PlayUpOccurrence>,
}

impl PlayUpTracking {
    pub fn counted(&self) -> u32 {
        self.occurrences.iter().filter(|o| o.counted).count() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub assigned_teams: Vec<AssignedClub>,
    #[serde(default)]
    pub stats: Vec<PlayerStatLine>,
    #[serde(default)]
    pub play_up_trackings: Vec<PlayUpTracking>,
}

impl Player {
    pub fn new(id: &str, first_name: &str, last_name: &str) -> Self {
        Self {
            id: id.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            ..Player::default()
        }
    }

    /// License entry for a team, searched across all clubs.
    pub fn license_for(&self, team_id: &str) -> Option<&AssignedTeam> {
        self.assigned_teams
            .iter()
            .flat_map(|club| club.teams.iter())
            .find(|team| team.team_id == team_id)
    }

    /// Career line for a granularity key, created zeroed on first use.
    pub fn stat_line_mut(
        &mut self,
        tournament: &ScopeRef,
        season: &ScopeRef,
        round: &ScopeRef,
        matchday: Option<&ScopeRef>,
    ) -> &mut PlayerStatLine {
        let pos = self.stats.iter().position(|line| {
            line.tournament.alias == tournament.alias
                && line.season.alias == season.alias
                && line.round.alias == round.alias
                && line.matchday.as_ref().map(|md| md.alias.as_str())
                    == matchday.map(|md| md.alias.as_str())
        });
        let pos = match pos {
            Some(pos) => pos,
            None => {
                self.stats.push(PlayerStatLine {
                    tournament: tournament.clone(),
                    season: season.clone(),
                    round: round.clone(),
                    matchday: matchday.cloned(),
                    games_played: 0,
                    goals: 0,
                    assists: 0,
                    points: 0,
                    penalty_minutes: 0,
                    called_matches: 0,
                });
                self.stats.len() - 1
            }
        };
        &mut self.stats[pos]
    }

    /// Tracker for an origin/destination pair, created empty on first use.
    pub fn tracking_mut(&mut self, from_team_id: &str, to_team_id: &str) -> &mut PlayUpTracking {
        let pos = self
            .play_up_trackings
            .iter()
            .position(|t| t.from_team_id == from_team_id && t.to_team_id == to_team_id);
        let pos = match pos {
            Some(pos) => pos,
            None => {
                self.play_up_trackings.push(PlayUpTracking {
                    from_team_id: from_team_id.to_string(),
                    to_team_id: to_team_id.to_string(),
                    occurrences: Vec::new(),
                });
                self.play_up_trackings.len() - 1
            }
        };
        &mut self.play_up_trackings[pos]
    }

    /// Counted call-up appearances toward a destination team, across all
    /// origin teams.
    pub fn counted_call_ups_to(&self, to_team_id: &str) -> u32 {
        self.play_up_trackings
            .iter()
            .filter(|t| t.to_team_id == to_team_id)
            .map(PlayUpTracking::counted)
            .sum()
    }

    /// Record a standing call-up assignment once a player keeps appearing
    /// for a higher team.
    pub fn add_called_assignment(
        &mut self,
        club_id: &str,
        club_name: &str,
        team_id: &str,
        team_name: &str,
    ) {
        if self.license_for(team_id).is_some() {
            return;
        }
        let assignment = AssignedTeam {
            team_id: team_id.to_string(),
            team_name: team_name.to_string(),
            pass_no: String::new(),
            jersey_no: None,
            source: AssignmentSource::Called,
            status: None,
            invalid_reason_codes: Vec::new(),
        };
        if let Some(club) = self.assigned_teams.iter_mut().find(|c| c.club_id == club_id) {
            club.teams.push(assignment);
        } else {
            self.assigned_teams.push(AssignedClub {
                club_id: club_id.to_string(),
                club_name: club_name.to_string(),
                teams: vec![assignment],
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_wire_names() {
        assert_eq!(serde_json::to_string(&AssignmentSource::Federation).unwrap(), "\"FEDERATION\"");
        assert_eq!(serde_json::to_string(&AssignmentSource::Called).unwrap(), "\"CALLED\"");
    }

    #[test]
    fn test_stat_line_created_then_reused() {
        let mut player = Player::new("p-1", "Nora", "Stein");
        let tournament: ScopeRef = ("City League", "city-league").into();
        let season: ScopeRef = ("2025", "2025").into();
        let round: ScopeRef = ("Main Round", "main").into();

        let line = player.stat_line_mut(&tournament, &season, &round, None);
        line.goals += 2;
        let line = player.stat_line_mut(&tournament, &season, &round, None);
        line.goals += 1;
        assert_eq!(player.stats.len(), 1);
        assert_eq!(player.stats[0].goals, 3);

        let matchday: ScopeRef = ("Day 1", "day-1").into();
        player.stat_line_mut(&tournament, &season, &round, Some(&matchday)).goals += 1;
        assert_eq!(player.stats.len(), 2);
    }

    #[test]
    fn test_counted_call_ups_span_origins() {
        let mut player = Player::new("p-1", "Nora", "Stein");
        for (from, match_id, counted) in
            [("t-2", "m-1", true), ("t-2", "m-2", false), ("t-3", "m-3", true)]
        {
            player
                .tracking_mut(from, "t-1")
                .occurrences
                .push(PlayUpOccurrence { match_id: match_id.into(), counted });
        }
        assert_eq!(player.counted_call_ups_to("t-1"), 2);
        assert_eq!(player.counted_call_ups_to("t-9"), 0);
    }

    #[test]
    fn test_called_assignment_added_once() {
        let mut player = Player::new("p-1", "Nora", "Stein");
        player.add_called_assignment("c-1", "HC City", "t-1", "First Team");
        player.add_called_assignment("c-1", "HC City", "t-1", "First Team");
        assert_eq!(player.assigned_teams.len(), 1);
        assert_eq!(player.assigned_teams[0].teams.len(), 1);
        assert_eq!(player.assigned_teams[0].teams[0].source, AssignmentSource::Called);
    }
}
