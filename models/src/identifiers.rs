// models/src/identifiers.rs

use core::ops::Deref;
use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use internment::Intern;

use crate::errors::{ValidationError, ValidationResult};

/// A role key such as `dokter` or `kepala_ruangan`. Keys are between 1 and
/// 64 bytes of lowercase ASCII letters, digits and underscores, and are
/// interned so repeated comparisons against the role table stay cheap.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(Intern<String>);

pub const MAX_IDENTIFIER_LEN: usize = 64;

impl Identifier {
    /// Creates a new identifier.
    ///
    /// # Errors
    /// Returns `InvalidIdentifierLength` for empty or over-long values and
    /// `InvalidIdentifier` when the value contains anything other than
    /// lowercase ASCII letters, digits or underscores.
    pub fn new(value: String) -> ValidationResult<Self> {
        if value.is_empty() || value.len() > MAX_IDENTIFIER_LEN {
            return Err(ValidationError::InvalidIdentifierLength);
        }
        let valid = value
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
        if !valid {
            return Err(ValidationError::InvalidIdentifier(value));
        }

        Ok(Self(Intern::new(value)))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for Identifier {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl FromStr for Identifier {
    type Err = ValidationError;

    fn from_str(s: &str) -> ValidationResult<Self> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for Identifier {
    type Error = ValidationError;

    fn try_from(value: String) -> ValidationResult<Self> {
        Self::new(value)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.0.to_string()
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}
