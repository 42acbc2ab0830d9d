// Document store abstraction for the league engine.
// Single-document updates are atomic; multi-document work goes through
// transaction(). Snapshots persist with MessagePack + LZ4 + checksum.

pub mod error;
pub mod format;
pub mod memory;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::assignment::{Assignment, AssignmentStatus};
use crate::models::matches::Match;
use crate::models::player::Player;
use crate::models::tournament::Tournament;
use crate::models::user::User;

pub use error::SnapshotError;
pub use format::{
    decompress_and_deserialize, serialize_and_compress, LeagueSnapshot,
};
pub use memory::MemoryStore;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything the engine persists, keyed the way the store keys it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueState {
    /// Matches by document id.
    pub matches: BTreeMap<String, Match>,
    /// Tournaments by alias.
    pub tournaments: BTreeMap<String, Tournament>,
    /// Players by id.
    pub players: BTreeMap<String, Player>,
    /// Users by id.
    pub users: BTreeMap<String, User>,
    /// Referee assignments by id.
    pub assignments: BTreeMap<String, Assignment>,
}

impl LeagueState {
    fn match_in_scope(m: &Match, tournament: &str, season: &str, round: &str) -> bool {
        m.tournament.as_ref().is_some_and(|t| t.alias == tournament)
            && m.season.as_ref().is_some_and(|s| s.alias == season)
            && m.round.as_ref().is_some_and(|r| r.alias == round)
    }

    pub fn matches_in_round(&self, tournament: &str, season: &str, round: &str) -> Vec<Match> {
        self.matches
            .values()
            .filter(|m| Self::match_in_scope(m, tournament, season, round))
            .cloned()
            .collect()
    }

    pub fn matches_in_matchday(
        &self,
        tournament: &str,
        season: &str,
        round: &str,
        matchday: &str,
    ) -> Vec<Match> {
        self.matches
            .values()
            .filter(|m| {
                Self::match_in_scope(m, tournament, season, round)
                    && m.matchday.as_ref().is_some_and(|md| md.alias == matchday)
            })
            .cloned()
            .collect()
    }
}

/// Result of a conditional single-document update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The closure ran and its changes were committed.
    Modified,
    /// The document exists but the closure declined to change it.
    Unchanged,
    /// No document under that key.
    Missing,
}

/// Store operations the engine relies on.
///
/// The update methods run a closure against one document and commit its
/// changes only when it returns `Ok(true)`; an `Ok(false)` or `Err` leaves
/// the document exactly as it was. That gives callers a compare-and-act
/// primitive without exposing locks.
pub trait LeagueStore: Send + Sync {
    fn get_match(&self, id: &str) -> Result<Option<Match>>;
    fn insert_match(&self, m: Match) -> Result<()>;
    fn update_match<F>(&self, id: &str, f: F) -> Result<UpdateOutcome>
    where
        F: FnOnce(&mut Match) -> Result<bool>;
    fn matches_in_round(&self, tournament: &str, season: &str, round: &str)
        -> Result<Vec<Match>>;
    fn matches_in_matchday(
        &self,
        tournament: &str,
        season: &str,
        round: &str,
        matchday: &str,
    ) -> Result<Vec<Match>>;

    fn get_tournament(&self, alias: &str) -> Result<Option<Tournament>>;
    fn insert_tournament(&self, tournament: Tournament) -> Result<()>;
    fn update_tournament<F>(&self, alias: &str, f: F) -> Result<UpdateOutcome>
    where
        F: FnOnce(&mut Tournament) -> Result<bool>;

    fn get_player(&self, id: &str) -> Result<Option<Player>>;
    fn insert_player(&self, player: Player) -> Result<()>;
    fn update_player<F>(&self, id: &str, f: F) -> Result<UpdateOutcome>
    where
        F: FnOnce(&mut Player) -> Result<bool>;

    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn insert_user(&self, user: User) -> Result<()>;

    fn get_assignment(&self, id: &str) -> Result<Option<Assignment>>;
    fn insert_assignment(&self, assignment: Assignment) -> Result<()>;
    fn update_assignment<F>(&self, id: &str, f: F) -> Result<UpdateOutcome>
    where
        F: FnOnce(&mut Assignment) -> Result<bool>;
    fn assignments_with_status(&self, status: AssignmentStatus) -> Result<Vec<Assignment>>;
    fn assignments_for_match(&self, match_id: &str) -> Result<Vec<Assignment>>;

    /// Run a closure against the whole state; commit only on `Ok`.
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut LeagueState) -> Result<T>;
}
