// models/src/medical/mod.rs

pub mod role;
pub mod user;

pub use role::RoleRecord;
pub use user::{NewUser, User};
