//! License checks for roster entries.
//!
//! Evaluation is pure: the caller fetches the player records up front and
//! applies the verdicts to the match document afterwards. Two paths exist,
//! one for regular players (license for the rostered team) and one for
//! called-up players (license for the origin team plus the play-up
//! allowance for the destination).

use std::collections::HashMap;

use serde::Serialize;

use crate::models::matches::TeamSide;
use crate::models::player::Player;
use crate::models::roster::{EligibilityStatus, ReasonCode, Roster, RosterPlayer};

/// Verdict for one roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerVerdict {
    pub player_id: String,
    pub status: EligibilityStatus,
    pub reasons: Vec<ReasonCode>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EligibilitySummary {
    pub valid: usize,
    pub invalid: usize,
    pub unknown: usize,
}

impl EligibilitySummary {
    pub fn from_verdicts(verdicts: &[PlayerVerdict]) -> Self {
        let mut summary = Self::default();
        for verdict in verdicts {
            match verdict.status {
                EligibilityStatus::Valid => summary.valid += 1,
                EligibilityStatus::Invalid => summary.invalid += 1,
                EligibilityStatus::Unknown => summary.unknown += 1,
            }
        }
        summary
    }
}

pub struct EligibilityChecker;

impl EligibilityChecker {
    /// Evaluate one roster entry.
    ///
    /// Regular players inherit the status and reasons of their license for
    /// the rostered team; no license means INVALID. Called players are
    /// checked against their origin-team license instead and additionally
    /// fail with `CalledLimitExceeded` once the destination team's counted
    /// play-up allowance is used up.
    pub fn evaluate(
        entry: &RosterPlayer,
        player: Option<&Player>,
        team_id: &str,
        called_match_limit: u32,
    ) -> (EligibilityStatus, Vec<ReasonCode>) {
        if entry.called {
            Self::evaluate_called(entry, player, team_id, called_match_limit)
        } else {
            Self::evaluate_regular(player, team_id)
        }
    }

    /// Evaluate every roster entry of a side against pre-fetched player
    /// records keyed by player id.
    pub fn evaluate_side(
        side: &TeamSide,
        players: &HashMap<String, Player>,
        called_match_limit: u32,
    ) -> Vec<PlayerVerdict> {
        side.roster
            .players
            .iter()
            .map(|entry| {
                let player = players.get(&entry.player.player_id);
                let (status, reasons) =
                    Self::evaluate(entry, player, &side.team_id, called_match_limit);
                PlayerVerdict { player_id: entry.player.player_id.clone(), status, reasons }
            })
            .collect()
    }

    /// Write verdicts onto the roster entries. Returns how many entries
    /// actually changed.
    pub fn apply_verdicts(roster: &mut Roster, verdicts: &[PlayerVerdict]) -> usize {
        let mut changed = 0;
        for verdict in verdicts {
            if let Some(entry) = roster.player_mut(&verdict.player_id) {
                if entry.eligibility_status != verdict.status
                    || entry.eligibility_reasons != verdict.reasons
                {
                    entry.eligibility_status = verdict.status;
                    entry.eligibility_reasons = verdict.reasons.clone();
                    changed += 1;
                }
            }
        }
        changed
    }

    fn evaluate_regular(
        player: Option<&Player>,
        team_id: &str,
    ) -> (EligibilityStatus, Vec<ReasonCode>) {
        let Some(license) = player.and_then(|p| p.license_for(team_id)) else {
            return (EligibilityStatus::Invalid, Vec::new());
        };
        match license.status {
            Some(EligibilityStatus::Invalid) => {
                (EligibilityStatus::Invalid, license.invalid_reason_codes.clone())
            }
            Some(EligibilityStatus::Valid) => (EligibilityStatus::Valid, Vec::new()),
            Some(EligibilityStatus::Unknown) | None => (EligibilityStatus::Unknown, Vec::new()),
        }
    }

    fn evaluate_called(
        entry: &RosterPlayer,
        player: Option<&Player>,
        team_id: &str,
        called_match_limit: u32,
    ) -> (EligibilityStatus, Vec<ReasonCode>) {
        let Some(origin) = &entry.called_from_team else {
            return (EligibilityStatus::Invalid, Vec::new());
        };
        let Some(player) = player else {
            return (EligibilityStatus::Invalid, Vec::new());
        };
        let Some(license) = player.license_for(&origin.team_id) else {
            return (EligibilityStatus::Invalid, Vec::new());
        };

        let mut reasons = Vec::new();
        let mut invalid = false;
        let mut unknown = false;
        match license.status {
            Some(EligibilityStatus::Invalid) => {
                invalid = true;
                reasons.extend(license.invalid_reason_codes.iter().copied());
            }
            Some(EligibilityStatus::Valid) => {}
            Some(EligibilityStatus::Unknown) | None => unknown = true,
        }
        if player.counted_call_ups_to(team_id) >= called_match_limit {
            invalid = true;
            if !reasons.contains(&ReasonCode::CalledLimitExceeded) {
                reasons.push(ReasonCode::CalledLimitExceeded);
            }
        }

        if invalid {
            (EligibilityStatus::Invalid, reasons)
        } else if unknown {
            (EligibilityStatus::Unknown, Vec::new())
        } else {
            (EligibilityStatus::Valid, Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::events::EventPlayer;
    use crate::models::matches::KeyValue;
    use crate::models::player::{
        AssignedClub, AssignedTeam, AssignmentSource, PlayUpOccurrence, PlayUpTracking,
    };
    use crate::models::roster::TeamRef;

    fn entry(player_id: &str, called: bool) -> RosterPlayer {
        let mut entry = RosterPlayer::new(
            EventPlayer {
                player_id: player_id.to_string(),
                first_name: "Test".into(),
                last_name: player_id.to_uppercase(),
                jersey_number: Some(7),
            },
            KeyValue::new("F", "Forward"),
            "PASS-1",
        );
        if called {
            entry.called = true;
            entry.called_from_team = Some(TeamRef::from(("t-low", "Second Team")));
        }
        entry
    }

    fn licensed_player(
        player_id: &str,
        team_id: &str,
        status: Option<EligibilityStatus>,
        reasons: Vec<ReasonCode>,
    ) -> Player {
        let mut player = Player::new(player_id, "Test", "Player");
        player.assigned_teams.push(AssignedClub {
            club_id: "c-1".into(),
            club_name: "Test Club".into(),
            teams: vec![AssignedTeam {
                team_id: team_id.to_string(),
                team_name: "Some Team".into(),
                pass_no: "PASS-1".into(),
                jersey_no: Some(7),
                source: AssignmentSource::League,
                status,
                invalid_reason_codes: reasons,
            }],
        });
        player
    }

    fn with_counted_call_ups(mut player: Player, to_team: &str, count: usize) -> Player {
        player.play_up_trackings.push(PlayUpTracking {
            from_team_id: "t-low".into(),
            to_team_id: to_team.to_string(),
            occurrences: (0..count)
                .map(|i| PlayUpOccurrence { match_id: format!("m-{i}"), counted: true })
                .collect(),
        });
        player
    }

    #[test]
    fn test_regular_player_inherits_license_verdict() {
        let valid = licensed_player("p-1", "t-1", Some(EligibilityStatus::Valid), vec![]);
        assert_eq!(
            EligibilityChecker::evaluate(&entry("p-1", false), Some(&valid), "t-1", 5),
            (EligibilityStatus::Valid, vec![])
        );

        let invalid = licensed_player(
            "p-1",
            "t-1",
            Some(EligibilityStatus::Invalid),
            vec![ReasonCode::AgeGroupViolation],
        );
        assert_eq!(
            EligibilityChecker::evaluate(&entry("p-1", false), Some(&invalid), "t-1", 5),
            (EligibilityStatus::Invalid, vec![ReasonCode::AgeGroupViolation])
        );
    }

    #[test]
    fn test_regular_player_without_license_is_invalid() {
        let other_team = licensed_player("p-1", "t-9", Some(EligibilityStatus::Valid), vec![]);
        assert_eq!(
            EligibilityChecker::evaluate(&entry("p-1", false), Some(&other_team), "t-1", 5),
            (EligibilityStatus::Invalid, vec![])
        );
        assert_eq!(
            EligibilityChecker::evaluate(&entry("p-1", false), None, "t-1", 5),
            (EligibilityStatus::Invalid, vec![])
        );
    }

    #[test]
    fn test_unknown_license_status_stays_unknown() {
        let unstamped = licensed_player("p-1", "t-1", None, vec![]);
        assert_eq!(
            EligibilityChecker::evaluate(&entry("p-1", false), Some(&unstamped), "t-1", 5),
            (EligibilityStatus::Unknown, vec![])
        );
    }

    #[test]
    fn test_called_player_needs_origin_and_its_license() {
        // called without a calledFromTeam reference
        let mut no_origin = entry("p-1", false);
        no_origin.called = true;
        let player = licensed_player("p-1", "t-low", Some(EligibilityStatus::Valid), vec![]);
        assert_eq!(
            EligibilityChecker::evaluate(&no_origin, Some(&player), "t-1", 5),
            (EligibilityStatus::Invalid, vec![])
        );

        // origin team missing from the player's licenses
        let wrong_origin = licensed_player("p-1", "t-other", Some(EligibilityStatus::Valid), vec![]);
        assert_eq!(
            EligibilityChecker::evaluate(&entry("p-1", true), Some(&wrong_origin), "t-1", 5),
            (EligibilityStatus::Invalid, vec![])
        );

        // healthy origin license
        assert_eq!(
            EligibilityChecker::evaluate(&entry("p-1", true), Some(&player), "t-1", 5),
            (EligibilityStatus::Valid, vec![])
        );
    }

    #[test]
    fn test_called_player_inherits_invalid_origin_reasons() {
        let player = licensed_player(
            "p-1",
            "t-low",
            Some(EligibilityStatus::Invalid),
            vec![ReasonCode::TooManyLoan],
        );
        assert_eq!(
            EligibilityChecker::evaluate(&entry("p-1", true), Some(&player), "t-1", 5),
            (EligibilityStatus::Invalid, vec![ReasonCode::TooManyLoan])
        );
    }

    #[test]
    fn test_call_up_limit_flips_at_counted_threshold() {
        let base = licensed_player("p-1", "t-low", Some(EligibilityStatus::Valid), vec![]);

        let four = with_counted_call_ups(base.clone(), "t-1", 4);
        assert_eq!(
            EligibilityChecker::evaluate(&entry("p-1", true), Some(&four), "t-1", 5),
            (EligibilityStatus::Valid, vec![])
        );

        let five = with_counted_call_ups(base, "t-1", 5);
        assert_eq!(
            EligibilityChecker::evaluate(&entry("p-1", true), Some(&five), "t-1", 5),
            (EligibilityStatus::Invalid, vec![ReasonCode::CalledLimitExceeded])
        );
    }

    #[test]
    fn test_side_verdicts_and_summary() {
        let mut side = TeamSide::named("t-1", "Test Team");
        side.roster.players.push(entry("p-1", false));
        side.roster.players.push(entry("p-2", false));

        let mut players = HashMap::new();
        players.insert(
            "p-1".to_string(),
            licensed_player("p-1", "t-1", Some(EligibilityStatus::Valid), vec![]),
        );
        // p-2 has no stored record at all

        let verdicts = EligibilityChecker::evaluate_side(&side, &players, 5);
        let summary = EligibilitySummary::from_verdicts(&verdicts);
        assert_eq!(summary, EligibilitySummary { valid: 1, invalid: 1, unknown: 0 });

        let changed = EligibilityChecker::apply_verdicts(&mut side.roster, &verdicts);
        assert_eq!(changed, 2);
        assert_eq!(side.roster.players[0].eligibility_status, EligibilityStatus::Valid);
        assert_eq!(side.roster.players[1].eligibility_status, EligibilityStatus::Invalid);

        // idempotent second application
        assert_eq!(EligibilityChecker::apply_verdicts(&mut side.roster, &verdicts), 0);
    }
}
