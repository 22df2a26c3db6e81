// models/src/medical/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ValidationError, ValidationResult};
use crate::principal::Principal;

// --- DTO for account creation ---
// Credentials live with the external identity provider; only profile data
// and the assigned role are kept here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Option<String>,
}

// --- Stored User Struct ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    /// Exactly one role per account; `None` until an administrator assigns one.
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Creates a new `User` from a `NewUser` DTO with a fresh id and timestamps.
    pub fn from_new_user(new_user: NewUser) -> ValidationResult<Self> {
        if new_user.username.trim().is_empty() {
            return Err(ValidationError::EmptyField("username"));
        }
        if new_user.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        let now = Utc::now();

        Ok(User {
            id: Uuid::new_v4().to_string(),
            name: new_user.name,
            username: new_user.username,
            email: new_user.email,
            phone: new_user.phone,
            role: new_user.role.filter(|r| !r.is_empty()),
            created_at: now,
            updated_at: now,
            last_login: None,
        })
    }

    pub fn assign_role(&mut self, role: Option<String>) {
        self.role = role.filter(|r| !r.is_empty());
        self.updated_at = Utc::now();
    }
}

impl Principal for User {
    fn role(&self) -> Option<&str> {
        self.role.as_deref().filter(|r| !r.is_empty())
    }
}
