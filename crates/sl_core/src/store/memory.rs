//! In-memory document store with snapshot persistence.
//!
//! Each update runs its closure against a copy of the target document and
//! commits the copy only on `Ok(true)`, so a failed closure can never leave
//! a half-written document behind. Snapshots are written atomically: temp
//! file, fsync, rename.

use std::fs::{rename, File};
use std::io::{Read, Write};
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Result;
use crate::models::assignment::{Assignment, AssignmentStatus};
use crate::models::matches::Match;
use crate::models::player::Player;
use crate::models::tournament::Tournament;
use crate::models::user::User;

use super::error::SnapshotError;
use super::format::{decompress_and_deserialize, serialize_and_compress, LeagueSnapshot};
use super::{LeagueState, LeagueStore, UpdateOutcome};

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<LeagueState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: LeagueState) -> Self {
        Self { state: RwLock::new(state) }
    }

    /// Copy of the whole state, for reporting and snapshotting.
    pub fn export_state(&self) -> LeagueState {
        self.read().clone()
    }

    pub fn save_to_path(&self, path: &Path) -> std::result::Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let snapshot = LeagueSnapshot::new(self.export_state());
        let data = serialize_and_compress(&snapshot)?;

        // Atomic save: write to temp file, then rename
        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&data)?;
            file.flush()?;

            // sync_all ensures data is written to disk (portable fsync)
            file.sync_all()?;
        }
        rename(&temp_path, path)?;

        log::debug!("Saved {} bytes to {:?}", data.len(), path);
        Ok(())
    }

    pub fn load_from_path(path: &Path) -> std::result::Result<MemoryStore, SnapshotError> {
        if !path.exists() {
            return Err(SnapshotError::FileNotFound { path: path.display().to_string() });
        }

        let mut file = File::open(path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        let snapshot = decompress_and_deserialize(&data)?;
        log::info!(
            "Loaded snapshot v{} with {} matches, {} tournaments",
            snapshot.version,
            snapshot.state.matches.len(),
            snapshot.state.tournaments.len()
        );
        Ok(MemoryStore::from_state(snapshot.state))
    }

    // A poisoned lock only means another thread panicked mid-read; the
    // state itself is still committed data, so recover it.
    fn read(&self) -> RwLockReadGuard<'_, LeagueState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LeagueState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_doc<D, F>(doc: Option<&mut D>, f: F) -> Result<UpdateOutcome>
    where
        D: Clone,
        F: FnOnce(&mut D) -> Result<bool>,
    {
        match doc {
            None => Ok(UpdateOutcome::Missing),
            Some(doc) => {
                let mut updated = doc.clone();
                if f(&mut updated)? {
                    *doc = updated;
                    Ok(UpdateOutcome::Modified)
                } else {
                    Ok(UpdateOutcome::Unchanged)
                }
            }
        }
    }
}

impl LeagueStore for MemoryStore {
    fn get_match(&self, id: &str) -> Result<Option<Match>> {
        Ok(self.read().matches.get(id).cloned())
    }

    fn insert_match(&self, m: Match) -> Result<()> {
        self.write().matches.insert(m.id.clone(), m);
        Ok(())
    }

    fn update_match<F>(&self, id: &str, f: F) -> Result<UpdateOutcome>
    where
        F: FnOnce(&mut Match) -> Result<bool>,
    {
        let mut state = self.write();
        Self::update_doc(state.matches.get_mut(id), f)
    }

    fn matches_in_round(
        &self,
        tournament: &str,
        season: &str,
        round: &str,
    ) -> Result<Vec<Match>> {
        Ok(self.read().matches_in_round(tournament, season, round))
    }

    fn matches_in_matchday(
        &self,
        tournament: &str,
        season: &str,
        round: &str,
        matchday: &str,
    ) -> Result<Vec<Match>> {
        Ok(self.read().matches_in_matchday(tournament, season, round, matchday))
    }

    fn get_tournament(&self, alias: &str) -> Result<Option<Tournament>> {
        Ok(self.read().tournaments.get(alias).cloned())
    }

    fn insert_tournament(&self, tournament: Tournament) -> Result<()> {
        self.write().tournaments.insert(tournament.alias.clone(), tournament);
        Ok(())
    }

    fn update_tournament<F>(&self, alias: &str, f: F) -> Result<UpdateOutcome>
    where
        F: FnOnce(&mut Tournament) -> Result<bool>,
    {
        let mut state = self.write();
        Self::update_doc(state.tournaments.get_mut(alias), f)
    }

    fn get_player(&self, id: &str) -> Result<Option<Player>> {
        Ok(self.read().players.get(id).cloned())
    }

    fn insert_player(&self, player: Player) -> Result<()> {
        self.write().players.insert(player.id.clone(), player);
        Ok(())
    }

    fn update_player<F>(&self, id: &str, f: F) -> Result<UpdateOutcome>
    where
        F: FnOnce(&mut Player) -> Result<bool>,
    {
        let mut state = self.write();
        Self::update_doc(state.players.get_mut(id), f)
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.read().users.get(id).cloned())
    }

    fn insert_user(&self, user: User) -> Result<()> {
        self.write().users.insert(user.id.clone(), user);
        Ok(())
    }

    fn get_assignment(&self, id: &str) -> Result<Option<Assignment>> {
        Ok(self.read().assignments.get(id).cloned())
    }

    fn insert_assignment(&self, assignment: Assignment) -> Result<()> {
        self.write().assignments.insert(assignment.id.clone(), assignment);
        Ok(())
    }

    fn update_assignment<F>(&self, id: &str, f: F) -> Result<UpdateOutcome>
    where
        F: FnOnce(&mut Assignment) -> Result<bool>,
    {
        let mut state = self.write();
        Self::update_doc(state.assignments.get_mut(id), f)
    }

    fn assignments_with_status(&self, status: AssignmentStatus) -> Result<Vec<Assignment>> {
        Ok(self
            .read()
            .assignments
            .values()
            .filter(|a| a.status == status)
            .cloned()
            .collect())
    }

    fn assignments_for_match(&self, match_id: &str) -> Result<Vec<Assignment>> {
        Ok(self
            .read()
            .assignments
            .values()
            .filter(|a| a.match_id == match_id)
            .cloned()
            .collect())
    }

    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut LeagueState) -> Result<T>,
    {
        let mut state = self.write();
        let mut working = state.clone();
        let value = f(&mut working)?;
        *state = working;
        Ok(value)
    }
}
