pub mod assignment;
pub mod events;
pub mod matches;
pub mod player;
pub mod roster;
pub mod settings;
pub mod standings;
pub mod tournament;
pub mod user;

pub use assignment::{Assignment, AssignmentStatus, Referee, StatusHistoryEntry};
pub use events::{
    format_match_time, parse_match_time, EventPlayer, PenaltyEvent, PenaltyPayload, ScoreEvent,
    ScorePayload,
};
pub use matches::{
    FinishType, KeyValue, Match, MatchStatus, MatchTeamStats, RefereeSnapshot, ScopeRef, TeamFlag,
    TeamSide,
};
pub use player::{
    AssignedClub, AssignedTeam, AssignmentSource, PlayUpOccurrence, PlayUpTracking, Player,
    PlayerStatLine,
};
pub use roster::{EligibilityStatus, ReasonCode, Roster, RosterPlayer, RosterStatus, TeamRef};
pub use settings::{resolve as resolve_settings, SettingsSource, StandingsSettings};
pub use standings::{StandingsMap, StandingsRow, StreakCode};
pub use tournament::{Matchday, Round, Season, Tournament};
pub use user::{RefereeProfile, Role, RoleSet, User};
