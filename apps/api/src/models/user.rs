use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::choices::UserType;

/// Identity record. The password hash lives in [`Credentials`] so it can
/// never be serialized alongside the public fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_staff: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_type: UserType,
    pub phone: String,
    pub bio: String,
    pub location: String,
    pub profile_picture: Option<String>,
    pub resume: Option<String>,
    pub linkedin_url: String,
    pub github_url: String,
    pub portfolio_url: String,
    /// Comma-separated skills as entered.
    pub skills: String,
    pub experience_years: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn skills_list(&self) -> Vec<String> {
        parse_skills(&self.skills)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileFields {
    pub user_type: UserType,
    pub phone: String,
    pub bio: String,
    pub location: String,
    pub profile_picture: Option<String>,
    pub resume: Option<String>,
    pub linkedin_url: String,
    pub github_url: String,
    pub portfolio_url: String,
    pub skills: String,
    pub experience_years: u32,
}

impl ProfileFields {
    /// The profile created alongside a freshly registered identity.
    pub fn for_new_user(user_type: UserType) -> Self {
        Self {
            user_type,
            ..Self::default()
        }
    }
}

/// Splits a comma-delimited skills string into trimmed, non-empty tokens,
/// preserving their order.
pub fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|skill| !skill.is_empty())
        .map(str::to_string)
        .collect()
}
