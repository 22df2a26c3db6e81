// models/src/lib.rs

pub mod errors;
pub mod identifiers;
pub mod medical;
pub mod principal;

pub use errors::{ValidationError, ValidationResult};
pub use identifiers::Identifier;
pub use principal::{Caller, Principal};
