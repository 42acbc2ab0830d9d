//! Statistics pipeline: points policy, match outcomes, roster accumulators,
//! standings tables and player career cards.
//!
//! The modules are layered leaves-first. `points` and `outcome` are pure;
//! `roster_stats` mutates a single match document; `standings` and
//! `player_card` read and write through the store.

pub mod outcome;
pub mod player_card;
pub mod points;
pub mod roster_stats;
pub mod standings;

#[cfg(test)]
pub mod proptest_gen;

pub use player_card::{CardDelta, CardScope, ParticipationSummary, PlayerCardAggregator};
pub use points::SideOutcome;
pub use roster_stats::{RosterStatEngine, StatDelta};
pub use standings::RebuildSummary;
