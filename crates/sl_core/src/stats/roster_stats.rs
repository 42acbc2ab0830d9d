//! Roster stat engine: per-player accumulators maintained two ways.
//!
//! The incremental path applies the exact ±1 of a single event and is the
//! one used on live-scoring hot paths; the recompute path rebuilds every
//! accumulator from the event lists and is the ground truth after edits
//! that don't map to a simple increment. Both must agree.

use crate::error::{LeagueError, Result};
use crate::models::events::{PenaltyEvent, ScoreEvent};
use crate::models::matches::TeamSide;

/// The stat effect of one event, expressed by player reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatDelta {
    Score {
        goal_player_id: String,
        assist_player_id: Option<String>,
    },
    Penalty {
        penalty_player_id: String,
        minutes: u32,
    },
}

impl StatDelta {
    pub fn from_score(event: &ScoreEvent) -> Self {
        StatDelta::Score {
            goal_player_id: event.goal_player.player_id.clone(),
            assist_player_id: event.assist_player.as_ref().map(|p| p.player_id.clone()),
        }
    }

    pub fn from_penalty(event: &PenaltyEvent) -> Self {
        StatDelta::Penalty {
            penalty_player_id: event.penalty_player.player_id.clone(),
            minutes: event.penalty_minutes,
        }
    }

    /// Referenced players as (field, player id) pairs, for validation.
    fn references(&self) -> Vec<(&'static str, &str)> {
        match self {
            StatDelta::Score { goal_player_id, assist_player_id } => {
                let mut refs = vec![("goal_player_id", goal_player_id.as_str())];
                if let Some(assist) = assist_player_id {
                    refs.push(("assist_player_id", assist.as_str()));
                }
                refs
            }
            StatDelta::Penalty { penalty_player_id, .. } => {
                vec![("penalty_player_id", penalty_player_id.as_str())]
            }
        }
    }
}

pub struct RosterStatEngine;

impl RosterStatEngine {
    /// Reject a delta referencing anyone outside the side's roster.
    ///
    /// Called before any write so a bad reference can never leave a
    /// half-applied delta behind.
    pub fn require_rostered(side: &TeamSide, delta: &StatDelta) -> Result<()> {
        for (field, player_id) in delta.references() {
            if !side.roster.contains(player_id) {
                return Err(LeagueError::validation_in(
                    field,
                    format!("player '{player_id}' is not in the roster"),
                    format!("team '{}'", side.team_id),
                ));
            }
        }
        Ok(())
    }

    /// Apply one event's increments to the roster accumulators.
    pub fn apply_delta(side: &mut TeamSide, delta: &StatDelta) -> Result<()> {
        Self::require_rostered(side, delta)?;
        match delta {
            StatDelta::Score { goal_player_id, assist_player_id } => {
                if let Some(scorer) = side.roster.player_mut(goal_player_id) {
                    scorer.goals += 1;
                    scorer.points += 1;
                }
                if let Some(assist_id) = assist_player_id {
                    if let Some(assistant) = side.roster.player_mut(assist_id) {
                        assistant.assists += 1;
                        assistant.points += 1;
                    }
                }
            }
            StatDelta::Penalty { penalty_player_id, minutes } => {
                if let Some(offender) = side.roster.player_mut(penalty_player_id) {
                    offender.penalty_minutes += minutes;
                }
            }
        }
        Ok(())
    }

    /// Apply the exact negation of [`apply_delta`].
    pub fn revert_delta(side: &mut TeamSide, delta: &StatDelta) -> Result<()> {
        Self::require_rostered(side, delta)?;
        match delta {
            StatDelta::Score { goal_player_id, assist_player_id } => {
                if let Some(scorer) = side.roster.player_mut(goal_player_id) {
                    scorer.goals = scorer.goals.saturating_sub(1);
                    scorer.points = scorer.points.saturating_sub(1);
                }
                if let Some(assist_id) = assist_player_id {
                    if let Some(assistant) = side.roster.player_mut(assist_id) {
                        assistant.assists = assistant.assists.saturating_sub(1);
                        assistant.points = assistant.points.saturating_sub(1);
                    }
                }
            }
            StatDelta::Penalty { penalty_player_id, minutes } => {
                if let Some(offender) = side.roster.player_mut(penalty_player_id) {
                    offender.penalty_minutes = offender.penalty_minutes.saturating_sub(*minutes);
                }
            }
        }
        Ok(())
    }

    /// Rewrite every roster accumulator from the side's event lists.
    ///
    /// Event players missing from the roster are skipped rather than
    /// resurrected, so stale events cannot create orphan rows. Points come
    /// out as goals + assists by construction.
    pub fn recompute_from_events(side: &mut TeamSide) {
        for player in &mut side.roster.players {
            player.reset_stats();
        }
        for event in &side.scores {
            if let Some(scorer) = side.roster.player_mut(&event.goal_player.player_id) {
                scorer.goals += 1;
                scorer.points += 1;
            }
            if let Some(assist) = &event.assist_player {
                if let Some(assistant) = side.roster.player_mut(&assist.player_id) {
                    assistant.assists += 1;
                    assistant.points += 1;
                }
            }
        }
        for event in &side.penalties {
            if let Some(offender) = side.roster.player_mut(&event.penalty_player.player_id) {
                offender.penalty_minutes += event.penalty_minutes;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::proptest_gen::{penalty_event, rostered_side, score_event};

    fn accumulators(side: &TeamSide) -> Vec<(String, u32, u32, u32, u32)> {
        side.roster
            .players
            .iter()
            .map(|p| {
                (p.player.player_id.clone(), p.goals, p.assists, p.points, p.penalty_minutes)
            })
            .collect()
    }

    #[test]
    fn test_apply_then_revert_is_net_zero() {
        let mut side = rostered_side(3);
        let before = accumulators(&side);
        let delta = StatDelta::Score {
            goal_player_id: "p-0".into(),
            assist_player_id: Some("p-1".into()),
        };

        RosterStatEngine::apply_delta(&mut side, &delta).unwrap();
        assert_eq!(side.roster.player("p-0").unwrap().goals, 1);
        assert_eq!(side.roster.player("p-1").unwrap().assists, 1);

        RosterStatEngine::revert_delta(&mut side, &delta).unwrap();
        assert_eq!(accumulators(&side), before);
    }

    #[test]
    fn test_missing_assist_rejected_before_any_write() {
        let mut side = rostered_side(2);
        let delta = StatDelta::Score {
            goal_player_id: "p-0".into(),
            assist_player_id: Some("p-9".into()),
        };

        let err = RosterStatEngine::apply_delta(&mut side, &delta).unwrap_err();
        assert!(err.to_string().contains("p-9"));
        // the valid scorer must be untouched
        assert_eq!(side.roster.player("p-0").unwrap().goals, 0);
        assert_eq!(side.roster.player("p-0").unwrap().points, 0);
    }

    #[test]
    fn test_penalty_minutes_accumulate() {
        let mut side = rostered_side(2);
        let delta = StatDelta::Penalty { penalty_player_id: "p-1".into(), minutes: 5 };
        RosterStatEngine::apply_delta(&mut side, &delta).unwrap();
        RosterStatEngine::apply_delta(&mut side, &delta).unwrap();
        assert_eq!(side.roster.player("p-1").unwrap().penalty_minutes, 10);

        RosterStatEngine::revert_delta(&mut side, &delta).unwrap();
        assert_eq!(side.roster.player("p-1").unwrap().penalty_minutes, 5);
    }

    #[test]
    fn test_recompute_matches_manual_tally() {
        let mut side = rostered_side(3);
        side.scores.push(score_event("s-1", 0, Some(1), 120));
        side.scores.push(score_event("s-2", 0, None, 340));
        side.scores.push(score_event("s-3", 2, Some(0), 900));
        side.penalties.push(penalty_event("pe-1", 1, 2, 600));

        RosterStatEngine::recompute_from_events(&mut side);

        let p0 = side.roster.player("p-0").unwrap();
        assert_eq!((p0.goals, p0.assists, p0.points), (2, 1, 3));
        let p1 = side.roster.player("p-1").unwrap();
        assert_eq!((p1.goals, p1.assists, p1.points, p1.penalty_minutes), (0, 1, 1, 2));
        let p2 = side.roster.player("p-2").unwrap();
        assert_eq!((p2.goals, p2.points), (1, 1));
    }

    #[test]
    fn test_recompute_skips_unrostered_event_players() {
        let mut side = rostered_side(2);
        let mut stray = score_event("s-1", 0, None, 60);
        stray.goal_player.player_id = "p-99".into();
        side.scores.push(stray);

        RosterStatEngine::recompute_from_events(&mut side);
        assert_eq!(side.roster.players.len(), 2);
        assert!(side.roster.players.iter().all(|p| p.goals == 0));
    }

    mod proptests {
        use super::*;
        use crate::stats::proptest_gen::side_with_events;
        use proptest::prelude::*;

        fn deltas_of(side: &TeamSide) -> Vec<StatDelta> {
            side.scores
                .iter()
                .map(StatDelta::from_score)
                .chain(side.penalties.iter().map(StatDelta::from_penalty))
                .collect()
        }

        proptest! {
            /// Property: a chain of incremental deltas agrees with a full
            /// recompute over the same events.
            #[test]
            fn prop_delta_chain_matches_recompute(side in side_with_events(5, 12)) {
                let mut incremental = side.clone();
                for delta in deltas_of(&side) {
                    RosterStatEngine::apply_delta(&mut incremental, &delta).unwrap();
                }

                let mut recomputed = side;
                RosterStatEngine::recompute_from_events(&mut recomputed);

                prop_assert_eq!(accumulators(&incremental), accumulators(&recomputed));
            }

            /// Property: create-then-delete of one event leaves every
            /// accumulator unchanged.
            #[test]
            fn prop_create_then_delete_net_zero(
                side in side_with_events(5, 8),
                scorer in 0usize..5,
                assist in proptest::option::of(0usize..5),
            ) {
                let mut side = side;
                RosterStatEngine::recompute_from_events(&mut side);
                let scorer = scorer % side.roster.players.len();
                let assist = assist
                    .map(|a| a % side.roster.players.len())
                    .filter(|a| *a != scorer);
                let before = accumulators(&side);
                let delta = StatDelta::Score {
                    goal_player_id: format!("p-{scorer}"),
                    assist_player_id: assist.map(|a| format!("p-{a}")),
                };

                RosterStatEngine::apply_delta(&mut side, &delta).unwrap();
                RosterStatEngine::revert_delta(&mut side, &delta).unwrap();

                prop_assert_eq!(accumulators(&side), before);
            }

            /// Property: recompute is invariant to event order.
            #[test]
            fn prop_recompute_order_independent(
                side in side_with_events(5, 12),
                seed in any::<u64>(),
            ) {
                let mut original = side.clone();
                RosterStatEngine::recompute_from_events(&mut original);

                let mut shuffled = side;
                // cheap deterministic shuffle of both event lists
                let score_len = shuffled.scores.len();
                if score_len > 1 {
                    shuffled.scores.rotate_left((seed as usize) % score_len);
                }
                let penalty_len = shuffled.penalties.len();
                if penalty_len > 1 {
                    shuffled.penalties.rotate_left((seed as usize) % penalty_len);
                }
                RosterStatEngine::recompute_from_events(&mut shuffled);

                prop_assert_eq!(accumulators(&original), accumulators(&shuffled));
            }
        }
    }
}
