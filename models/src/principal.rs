// models/src/principal.rs

use serde::{Deserialize, Serialize};

/// Anything the authorization checks can ask for a role.
///
/// The checks trust the returned value as given; resolving it from a request
/// is the job of the authentication layer.
pub trait Principal {
    fn role(&self) -> Option<&str>;
}

/// The minimal caller: a single, possibly absent, role name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    #[serde(default)]
    pub role: Option<String>,
}

impl Caller {
    pub fn with_role(role: impl Into<String>) -> Self {
        Caller { role: Some(role.into()) }
    }

    pub fn anonymous() -> Self {
        Caller { role: None }
    }
}

impl Principal for Caller {
    fn role(&self) -> Option<&str> {
        self.role.as_deref().filter(|r| !r.is_empty())
    }
}

impl<T: Principal + ?Sized> Principal for &T {
    fn role(&self) -> Option<&str> {
        (**self).role()
    }
}

impl<T: Principal + ?Sized> Principal for Box<T> {
    fn role(&self) -> Option<&str> {
        (**self).role()
    }
}
