// models/src/medical/role.rs

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ValidationError, ValidationResult};
use crate::identifiers::Identifier;

/// A role row as stored by the settings screens.
///
/// Operators can create and edit these freely. They describe intent only:
/// access decisions are made against the built-in role table in the
/// `security` crate, never against these rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRecord {
    #[serde(default = "new_record_id")]
    pub id: String,
    pub name: Identifier,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

impl RoleRecord {
    pub fn new(name: Identifier, display_name: impl Into<String>, permissions: Vec<String>) -> Self {
        let now = Utc::now();
        RoleRecord {
            id: new_record_id(),
            name,
            display_name: display_name.into(),
            description: String::new(),
            permissions,
            is_system: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks the record against a permission catalog predicate.
    ///
    /// `is_known` decides catalog membership for a well-formed
    /// `resource:action` string; the record itself does not know the catalog.
    pub fn validate_with<F>(&self, is_known: F) -> ValidationResult<()>
    where
        F: Fn(&str) -> bool,
    {
        if self.display_name.trim().is_empty() {
            return Err(ValidationError::EmptyField("display_name"));
        }
        let mut seen = HashSet::with_capacity(self.permissions.len());
        for permission in &self.permissions {
            match permission.split_once(':') {
                Some((resource, action)) if !resource.is_empty() && !action.is_empty() => {}
                _ => return Err(ValidationError::MalformedPermission(permission.clone())),
            }
            if !is_known(permission) {
                return Err(ValidationError::UnknownPermission(permission.clone()));
            }
            if !seen.insert(permission.as_str()) {
                return Err(ValidationError::DuplicatePermission(permission.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(p: &str) -> bool {
        matches!(p, "patient:read" | "ruang_informasi:read")
    }

    fn record(permissions: &[&str]) -> RoleRecord {
        RoleRecord::new(
            "kepala_ruangan".parse().unwrap(),
            "Kepala Ruangan",
            permissions.iter().map(|p| p.to_string()).collect(),
        )
    }

    #[test]
    fn should_accept_known_permissions() {
        assert!(record(&["patient:read", "ruang_informasi:read"]).validate_with(known).is_ok());
    }

    #[test]
    fn should_reject_malformed_permission() {
        assert_eq!(
            record(&["patient"]).validate_with(known).unwrap_err(),
            ValidationError::MalformedPermission("patient".to_string())
        );
        assert_eq!(
            record(&[":read"]).validate_with(known).unwrap_err(),
            ValidationError::MalformedPermission(":read".to_string())
        );
    }

    #[test]
    fn should_reject_unknown_and_duplicate_permissions() {
        assert_eq!(
            record(&["patient:*"]).validate_with(known).unwrap_err(),
            ValidationError::UnknownPermission("patient:*".to_string())
        );
        assert_eq!(
            record(&["patient:read", "patient:read"]).validate_with(known).unwrap_err(),
            ValidationError::DuplicatePermission("patient:read".to_string())
        );
    }

    #[test]
    fn should_reject_blank_display_name() {
        let mut r = record(&[]);
        r.display_name = " ".to_string();
        assert_eq!(r.validate_with(known).unwrap_err(), ValidationError::EmptyField("display_name"));
    }

    #[test]
    fn should_fill_defaults_when_deserializing() {
        let r: RoleRecord = serde_json::from_str(
            r#"{"name":"perawat","display_name":"Perawat","permissions":["patient:read"]}"#,
        )
        .unwrap();
        assert_eq!(r.name.as_str(), "perawat");
        assert!(!r.is_system);
        assert!(r.description.is_empty());
        assert!(!r.id.is_empty());
    }
}
