//! Test fixtures and proptest strategies shared by the stats and service
//! tests: rostered sides with consistent score/penalty event lists.

use proptest::prelude::*;

use crate::models::events::{format_match_time, EventPlayer, PenaltyEvent, ScoreEvent};
use crate::models::matches::{KeyValue, TeamSide};
use crate::models::roster::RosterPlayer;

pub fn event_player(index: usize) -> EventPlayer {
    EventPlayer {
        player_id: format!("p-{index}"),
        first_name: "Player".into(),
        last_name: format!("{index}"),
        jersey_number: Some(index as u32 + 1),
    }
}

/// A team side whose roster holds players `p-0..p-count`.
pub fn rostered_side(count: usize) -> TeamSide {
    let mut side = TeamSide::named("t-1", "Test Team");
    for index in 0..count {
        side.roster.players.push(RosterPlayer::new(
            event_player(index),
            KeyValue::new("F", "Forward"),
            &format!("PASS-{index}"),
        ));
    }
    side
}

pub fn score_event(id: &str, scorer: usize, assist: Option<usize>, seconds: u32) -> ScoreEvent {
    ScoreEvent {
        id: id.to_string(),
        match_time: format_match_time(seconds),
        match_seconds: seconds,
        goal_player: event_player(scorer),
        assist_player: assist.map(event_player),
        is_ppg: false,
        is_shg: false,
        is_gwg: false,
    }
}

pub fn penalty_event(id: &str, player: usize, minutes: u32, start_seconds: u32) -> PenaltyEvent {
    PenaltyEvent {
        id: id.to_string(),
        match_time_start: format_match_time(start_seconds),
        match_time_end: Some(format_match_time(start_seconds + minutes * 60)),
        match_seconds_start: start_seconds,
        match_seconds_end: Some(start_seconds + minutes * 60),
        penalty_player: event_player(player),
        penalty_code: KeyValue::new("HOLD", "Holding"),
        penalty_minutes: minutes,
        is_gm: false,
        is_mp: false,
    }
}

/// Strategy: a side with 2..=`max_players` rostered players and up to
/// `max_events` scores and penalties, all referencing rostered players.
pub fn side_with_events(max_players: usize, max_events: usize) -> impl Strategy<Value = TeamSide> {
    (2..=max_players)
        .prop_flat_map(move |count| {
            let scores = prop::collection::vec(
                (0..count, prop::option::of(0..count), 0u32..3900),
                0..=max_events,
            );
            let penalties = prop::collection::vec(
                (0..count, prop_oneof![Just(2u32), Just(5u32), Just(10u32)], 0u32..3900),
                0..=max_events,
            );
            (Just(count), scores, penalties)
        })
        .prop_map(|(count, scores, penalties)| {
            let mut side = rostered_side(count);
            for (i, (scorer, assist, seconds)) in scores.into_iter().enumerate() {
                // a scorer cannot assist their own goal
                let assist = assist.filter(|a| *a != scorer);
                side.scores.push(score_event(&format!("score-{i}"), scorer, assist, seconds));
            }
            for (i, (player, minutes, start)) in penalties.into_iter().enumerate() {
                side.penalties.push(penalty_event(&format!("penalty-{i}"), player, minutes, start));
            }
            side
        })
}
