//! Roster lifecycle and eligibility validation.

pub mod eligibility;
pub mod lifecycle;

pub use eligibility::{EligibilityChecker, EligibilitySummary, PlayerVerdict};
pub use lifecycle::{referenced_player_ids, RosterLifecycle, ROSTER_MANAGER_ROLES};
