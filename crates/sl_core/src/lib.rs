//! # sl_core - League Match Statistics & Standings Engine
//!
//! This library keeps a league's derived data consistent with its source
//! events: score and penalty events roll up into roster lines, match
//! outcomes, standings tables and player career cards, and referee
//! assignments stay in sync with their denormalized match snapshots.
//!
//! ## Features
//! - Incremental write paths: one event mutation updates every projection
//! - Full-recompute rebuilds that converge to the same tables
//! - Roster lifecycle with eligibility validation and call-up tracking
//! - Referee assignment state machine plus a drift reconciler
//! - Compressed, checksummed league snapshots for offline tooling

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod reconcile;
pub mod roster;
pub mod services;
pub mod stats;
pub mod store;

// Re-export the error type every operation returns
pub use error::{LeagueError, Result};

// Re-export configuration
pub use config::{engine_defaults, EngineConfig, TieBreak};

// Re-export the write-path services
pub use services::{AssignmentService, PenaltyService, RosterService, ScoreService};

// Re-export the wire model types callers hold
pub use models::{
    Assignment, AssignmentStatus, EligibilityStatus, FinishType, Match, MatchStatus, Player,
    Role, Roster, RosterStatus, ScorePayload, StandingsRow, TeamFlag, Tournament, User,
};

// Re-export the store seam
pub use store::{LeagueSnapshot, LeagueState, LeagueStore, MemoryStore, UpdateOutcome};

// Re-export the reconciler
pub use reconcile::{AssignmentReconciler, Conflict, ConflictKind, RepairSummary};

// Re-export the CLI-facing report surface
pub use api::{ConflictReport, LeagueInfo, StandingsReport};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub use store::SNAPSHOT_VERSION;
