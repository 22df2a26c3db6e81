// security/src/lib.rs
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

use models::Principal;

pub mod authorization;
pub mod middleware;
pub mod permissions;
pub mod roles;

pub use authorization::{
    get_user_permissions, has_all_permissions, has_any_permission, has_any_role, has_permission, has_role, is_admin,
};
pub use middleware::RequirePermission;
pub use permissions::{ALL_PERMISSIONS, Action, Permission, PermissionParseError, Resource, identifier, is_known_permission};
pub use roles::{BuiltinRole, RoleDefinition, RoleDrift, RolesConfig, all_roles, get_role_by_name};

/// Claims carried by bearer tokens issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (username)
    #[serde(default)]
    pub role: Option<String>,
    pub iat: i64, // Issued at
    pub exp: i64, // Expiration time
}

impl Principal for Claims {
    fn role(&self) -> Option<&str> {
        self.role.as_deref().filter(|r| !r.is_empty())
    }
}

/// Custom authentication errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken(String),
    JwtError(String),
    Forbidden(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Missing or invalid token"),
            AuthError::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
            AuthError::JwtError(msg) => write!(f, "JWT error: {}", msg),
            AuthError::Forbidden(permission) => write!(f, "Permission denied: {}", permission),
        }
    }
}

impl std::error::Error for AuthError {}

/// HS256 key pair derived from one shared secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn new(secret: &[u8]) -> Self {
        JwtKeys {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("JwtKeys(..)")
    }
}

/// Mints a token for an already-authenticated subject. No credential is checked here.
pub fn issue_token(keys: &JwtKeys, subject: &str, role: Option<&str>, ttl: Duration) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: subject.to_string(),
        role: role.map(str::to_string),
        iat: now,
        exp: now + ttl.num_seconds(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
        .map_err(|e| AuthError::JwtError(format!("Failed to encode JWT: {}", e)))
}

/// Decodes and validates a JWT token.
pub fn validate_jwt_token(keys: &JwtKeys, token: &str) -> Result<Claims, AuthError> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &keys.decoding, &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
