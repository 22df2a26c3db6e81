// rest_api/src/lib.rs
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use security::middleware::AuthenticatedCaller;
use security::{
    all_roles, get_role_by_name, get_user_permissions, has_all_permissions, has_any_permission, is_admin, JwtKeys,
    Permission, RequirePermission, RoleDefinition, RoleDrift, RolesConfig, ALL_PERMISSIONS,
};

pub mod config;

// Define the REST API error enum
#[derive(Debug, Error)]
pub enum RestApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ResponseError for RestApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            RestApiError::NotFound(_) => StatusCode::NOT_FOUND,
            RestApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "status": "error",
            "message": self.to_string(),
        }))
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionView {
    pub id: String,
    pub resource: String,
    pub action: String,
}

impl From<Permission> for PermissionView {
    fn from(p: Permission) -> Self {
        PermissionView {
            id: p.as_str().to_string(),
            resource: p.resource().as_str().to_string(),
            action: p.action().as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub subject: String,
    pub role: Option<String>,
    pub is_admin: bool,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    #[default]
    Any,
    All,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorizeRequest {
    pub permissions: Vec<String>,
    #[serde(default)]
    pub mode: CheckMode,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorizeResponse {
    pub granted: bool,
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Dialysis clinic authorization API is healthy",
        "status": "ok"
    }))
}

async fn list_permissions() -> web::Json<Vec<PermissionView>> {
    web::Json(ALL_PERMISSIONS.iter().copied().map(PermissionView::from).collect())
}

async fn list_roles() -> web::Json<&'static [RoleDefinition]> {
    web::Json(all_roles())
}

async fn get_role(name: web::Path<String>) -> Result<web::Json<&'static RoleDefinition>, RestApiError> {
    get_role_by_name(&name)
        .map(web::Json)
        .ok_or_else(|| RestApiError::NotFound(format!("role '{}'", name)))
}

async fn me(caller: AuthenticatedCaller) -> web::Json<MeResponse> {
    let claims = caller.0;
    web::Json(MeResponse {
        is_admin: is_admin(Some(&claims)),
        permissions: get_user_permissions(Some(&claims)),
        role: claims.role.clone(),
        subject: claims.sub.clone(),
    })
}

async fn authorize(
    caller: AuthenticatedCaller,
    payload: web::Json<AuthorizeRequest>,
) -> Result<web::Json<AuthorizeResponse>, RestApiError> {
    let request = payload.into_inner();
    if request.permissions.is_empty() {
        return Err(RestApiError::InvalidInput("permissions must not be empty".to_string()));
    }
    let claims = &caller.0;
    let granted = match request.mode {
        CheckMode::Any => has_any_permission(Some(claims), request.permissions.as_slice()),
        CheckMode::All => has_all_permissions(Some(claims), request.permissions.as_slice()),
    };
    Ok(web::Json(AuthorizeResponse { granted }))
}

/// Mounts the `/api/v1` routes. Catalog and role listings need `role:read`;
/// self-inspection and checks need only a valid token.
pub fn configure_routes(cfg: &mut web::ServiceConfig, keys: Arc<JwtKeys>) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health))
            .service(
                web::resource("/permissions")
                    .wrap(RequirePermission::new(Arc::clone(&keys), Permission::RoleRead))
                    .route(web::get().to(list_permissions)),
            )
            .service(
                web::resource("/roles")
                    .wrap(RequirePermission::new(Arc::clone(&keys), Permission::RoleRead))
                    .route(web::get().to(list_roles)),
            )
            .service(
                web::resource("/roles/{name}")
                    .wrap(RequirePermission::new(Arc::clone(&keys), Permission::RoleRead))
                    .route(web::get().to(get_role)),
            )
            .service(
                web::resource("/me")
                    .wrap(RequirePermission::authenticated(Arc::clone(&keys)))
                    .route(web::get().to(me)),
            )
            .service(
                web::resource("/authorize")
                    .wrap(RequirePermission::authenticated(keys))
                    .route(web::post().to(authorize)),
            ),
    );
}

/// Compares the exported role records with the built-in table and logs every
/// difference. Records are informational; nothing is reconciled.
pub fn audit_role_records(path: &Path) -> anyhow::Result<Vec<RoleDrift>> {
    let records = RolesConfig::from_yaml_file(path)?;
    for (role, err) in records.invalid_records() {
        warn!(role = %role, error = %err, "Invalid role record");
    }
    let drifts = records.audit();
    if drifts.is_empty() {
        info!(path = %path.display(), records = records.roles.len(), "Role records match the built-in table");
    }
    for drift in &drifts {
        warn!(path = %path.display(), "{}", drift);
    }
    Ok(drifts)
}
