//! Login accounts and their sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_ROLE: &str = "staff";

/// A stored account. `password` holds the salted hash and is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub full_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// What the API hands back for an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub role: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            role: user.role.clone(),
        }
    }
}

/// Registration payload; `password` is plaintext here and hashed before storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl NewUser {
    /// `fullName` falls back to the username.
    pub fn full_name_or_username(&self) -> String {
        self.full_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.username)
            .to_string()
    }

    pub fn role_or_default(&self) -> String {
        self.role
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_ROLE)
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub user_id: i32,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn password_never_serialized() {
        let user = User {
            id: 1,
            username: "reception".to_string(),
            password: "deadbeef.cafe".to_string(),
            full_name: "Front Desk".to_string(),
            role: "staff".to_string(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["fullName"], json!("Front Desk"));
    }

    #[test]
    fn registration_fallbacks() {
        let new_user: NewUser =
            serde_json::from_value(json!({"username": "dr.k", "password": "s3cret", "fullName": ""}))
                .unwrap();
        assert_eq!(new_user.full_name_or_username(), "dr.k");
        assert_eq!(new_user.role_or_default(), "staff");
    }
}
