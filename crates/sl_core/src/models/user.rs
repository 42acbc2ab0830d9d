//! Users, roles and the referee profile attached to officiating users.

use serde::{Deserialize, Serialize};

use super::assignment::Referee;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    LeagueAdmin,
    ClubAdmin,
    RefAdmin,
    Referee,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::LeagueAdmin => "LEAGUE_ADMIN",
            Role::ClubAdmin => "CLUB_ADMIN",
            Role::RefAdmin => "REF_ADMIN",
            Role::Referee => "REFEREE",
        }
    }
}

/// Roles held by the acting caller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(Vec<Role>);

impl RoleSet {
    pub fn new(roles: &[Role]) -> Self {
        Self(roles.to_vec())
    }

    pub fn has(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn has_any(&self, roles: &[Role]) -> bool {
        roles.iter().any(|r| self.has(*r))
    }

    pub fn as_slice(&self) -> &[Role] {
        &self.0
    }
}

impl From<Vec<Role>> for RoleSet {
    fn from(roles: Vec<Role>) -> Self {
        Self(roles)
    }
}

/// Officiating profile carried by users holding the REFEREE role.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefereeProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: RoleSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referee: Option<RefereeProfile>,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Build the assignment-side referee record for this user.
    ///
    /// `None` unless the user actually holds the REFEREE role; a missing
    /// profile yields an empty one.
    pub fn referee_record(&self) -> Option<Referee> {
        if !self.roles.has(Role::Referee) {
            return None;
        }
        let profile = self.referee.clone().unwrap_or_default();
        Some(Referee {
            user_id: self.id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            club_id: profile.club_id,
            club_name: profile.club_name,
            logo_url: profile.logo_url,
            points: profile.points,
            level: profile.level,
        })
    }
}
