//! On-disk snapshot codec: MessagePack, LZ4, trailing SHA-256.

use chrono::Utc;
use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::SnapshotError;
use super::{LeagueState, SNAPSHOT_VERSION};

/// Full engine state as persisted to disk.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LeagueSnapshot {
    /// Snapshot format version for migration.
    pub version: u32,

    /// Snapshot timestamp (unix milliseconds).
    pub timestamp: u64,

    pub state: LeagueState,
}

impl LeagueSnapshot {
    pub fn new(state: LeagueState) -> Self {
        Self { version: SNAPSHOT_VERSION, timestamp: current_timestamp(), state }
    }

    /// Keys must agree with the ids of the documents they index.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.state.matches.iter().any(|(key, m)| key != &m.id) {
            return Err(SnapshotError::Corrupted);
        }
        if self.state.tournaments.iter().any(|(key, t)| key != &t.alias) {
            return Err(SnapshotError::Corrupted);
        }
        if self.state.players.iter().any(|(key, p)| key != &p.id) {
            return Err(SnapshotError::Corrupted);
        }
        if self.state.assignments.iter().any(|(key, a)| key != &a.id) {
            return Err(SnapshotError::Corrupted);
        }
        Ok(())
    }
}

/// Serialize and compress a snapshot.
pub fn serialize_and_compress(snapshot: &LeagueSnapshot) -> Result<Vec<u8>, SnapshotError> {
    snapshot.validate()?;

    // 1. MessagePack with field names
    let msgpack = to_vec_named(snapshot).map_err(SnapshotError::Serialization)?;

    // 2. LZ4, size prepended for easy decompression
    let compressed = compress_prepend_size(&msgpack);

    // 3. SHA256 checksum at the end
    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut result = compressed;
    result.extend_from_slice(&checksum);

    Ok(result)
}

/// Decompress and deserialize a snapshot.
pub fn decompress_and_deserialize(bytes: &[u8]) -> Result<LeagueSnapshot, SnapshotError> {
    // minimum size: length header + checksum
    if bytes.len() < 4 + 32 {
        return Err(SnapshotError::Corrupted);
    }

    let (payload, checksum_bytes) = bytes.split_at(bytes.len() - 32);

    let mut hasher = Sha256::new();
    hasher.update(payload);
    let calculated_checksum = hasher.finalize();

    if &calculated_checksum[..] != checksum_bytes {
        return Err(SnapshotError::ChecksumMismatch);
    }

    let msgpack =
        decompress_size_prepended(payload).map_err(|_| SnapshotError::Decompression)?;

    let snapshot: LeagueSnapshot =
        from_slice(&msgpack).map_err(SnapshotError::Deserialization)?;

    if snapshot.version > SNAPSHOT_VERSION {
        return Err(SnapshotError::VersionMismatch {
            found: snapshot.version,
            expected: SNAPSHOT_VERSION,
        });
    }

    snapshot.validate()?;
    Ok(snapshot)
}

pub fn current_timestamp() -> u64 {
    Utc::now().timestamp_millis() as u64
}
