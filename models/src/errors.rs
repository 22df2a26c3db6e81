// models/src/errors.rs

pub use thiserror::Error;

/// A validation error raised while building or checking domain records.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ValidationError {
    /// An identifier has an invalid length.
    #[error("identifier has invalid length")]
    InvalidIdentifierLength,
    /// An identifier contains characters outside `[a-z0-9_]`.
    #[error("identifier '{0}' is invalid")]
    InvalidIdentifier(String),
    /// A required text field was left blank.
    #[error("field {0} must not be empty")]
    EmptyField(&'static str),
    /// A permission string is not shaped like `resource:action`.
    #[error("permission '{0}' is not of the form resource:action")]
    MalformedPermission(String),
    /// A permission string is well formed but not part of the catalog.
    #[error("permission '{0}' is not in the permission catalog")]
    UnknownPermission(String),
    /// The same permission was listed twice on one role.
    #[error("permission '{0}' is listed more than once")]
    DuplicatePermission(String),
}

/// A type alias for a `Result` that returns a `ValidationError` on failure.
pub type ValidationResult<T> = Result<T, ValidationError>;
