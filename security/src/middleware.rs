// security/src/middleware.rs
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::{header, StatusCode};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError};
use futures::future::{ok, LocalBoxFuture, Ready};
use log::debug;
use serde_json::json;
use std::future::{ready, Ready as StdReady};
use std::rc::Rc;
use std::sync::Arc;

use crate::authorization::{has_all_permissions, has_any_permission};
use crate::{bearer_token, validate_jwt_token, AuthError, Claims, JwtKeys};

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "status": "error",
            "message": self.to_string(),
        }))
    }
}

#[derive(Debug, Clone)]
enum Requirement {
    Authenticated,
    Any(Vec<String>),
    All(Vec<String>),
}

impl Requirement {
    fn describe(&self) -> String {
        match self {
            Requirement::Authenticated => "authenticated caller".to_string(),
            Requirement::Any(perms) => perms.join(" | "),
            Requirement::All(perms) => perms.join(" & "),
        }
    }

    fn satisfied_by(&self, claims: &Claims) -> bool {
        match self {
            Requirement::Authenticated => true,
            Requirement::Any(perms) => has_any_permission(Some(claims), perms.as_slice()),
            Requirement::All(perms) => has_all_permissions(Some(claims), perms.as_slice()),
        }
    }
}

/// Guards a scope or resource: resolves the bearer token into `Claims`,
/// answers 401 when that fails and 403 when the caller lacks the required
/// permission. On success the claims are stored in request extensions, where
/// `AuthenticatedCaller` picks them up.
pub struct RequirePermission {
    keys: Arc<JwtKeys>,
    requirement: Rc<Requirement>,
}

impl RequirePermission {
    pub fn new(keys: Arc<JwtKeys>, permission: impl AsRef<str>) -> Self {
        Self::all(keys, [permission])
    }

    pub fn any<I, P>(keys: Arc<JwtKeys>, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let perms = permissions.into_iter().map(|p| p.as_ref().to_string()).collect();
        RequirePermission { keys, requirement: Rc::new(Requirement::Any(perms)) }
    }

    pub fn all<I, P>(keys: Arc<JwtKeys>, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let perms = permissions.into_iter().map(|p| p.as_ref().to_string()).collect();
        RequirePermission { keys, requirement: Rc::new(Requirement::All(perms)) }
    }

    /// Only a valid token is required; no permission is checked.
    pub fn authenticated(keys: Arc<JwtKeys>) -> Self {
        RequirePermission { keys, requirement: Rc::new(Requirement::Authenticated) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequirePermission
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequirePermissionService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequirePermissionService {
            service,
            keys: Arc::clone(&self.keys),
            requirement: Rc::clone(&self.requirement),
        })
    }
}

pub struct RequirePermissionService<S> {
    service: S,
    keys: Arc<JwtKeys>,
    requirement: Rc<Requirement>,
}

impl<S> RequirePermissionService<S> {
    fn resolve(&self, req: &ServiceRequest) -> Result<Claims, AuthError> {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|hv| hv.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AuthError::MissingToken)?;

        let claims = validate_jwt_token(&self.keys, token)?;

        if !self.requirement.satisfied_by(&claims) {
            debug!(
                "Denied {} {} for '{}' (role {:?}): requires {}",
                req.method(),
                req.path(),
                claims.sub,
                claims.role,
                self.requirement.describe()
            );
            return Err(AuthError::Forbidden(self.requirement.describe()));
        }
        Ok(claims)
    }
}

impl<S, B> Service<ServiceRequest> for RequirePermissionService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.resolve(&req) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(err) => {
                let response = err.error_response();
                Box::pin(ok(req.into_response(response).map_into_right_body()))
            }
        }
    }
}

/// The claims of a caller that passed a `RequirePermission` guard.
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller(pub Claims);

impl FromRequest for AuthenticatedCaller {
    type Error = AuthError;
    type Future = StdReady<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Claims>()
                .cloned()
                .map(AuthenticatedCaller)
                .ok_or(AuthError::MissingToken),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue_token;
    use actix_web::{test, web, App, HttpResponse};
    use chrono::Duration;

    const SECRET: &[u8] = b"middleware-test-secret-0123456789";

    fn keys() -> Arc<JwtKeys> {
        Arc::new(JwtKeys::new(SECRET))
    }

    fn bearer(role: Option<&str>) -> String {
        let token = issue_token(&keys(), "tester", role, Duration::minutes(5)).unwrap();
        format!("Bearer {}", token)
    }

    async fn whoami(caller: AuthenticatedCaller) -> HttpResponse {
        HttpResponse::Ok().body(caller.0.sub)
    }

    #[actix_web::test]
    async fn should_reject_missing_token_with_401() {
        let app = test::init_service(
            App::new().service(
                web::resource("/patients")
                    .wrap(RequirePermission::new(keys(), "patient:read"))
                    .to(whoami),
            ),
        )
        .await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/patients").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn should_reject_garbage_token_with_401() {
        let app = test::init_service(
            App::new().service(
                web::resource("/patients")
                    .wrap(RequirePermission::new(keys(), "patient:read"))
                    .to(whoami),
            ),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/patients")
            .insert_header((header::AUTHORIZATION, "Bearer not.a.token"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn should_forbid_role_without_permission() {
        let app = test::init_service(
            App::new().service(
                web::resource("/users")
                    .wrap(RequirePermission::new(keys(), "user:delete"))
                    .to(whoami),
            ),
        )
        .await;
        let req = test::TestRequest::delete()
            .uri("/users")
            .insert_header((header::AUTHORIZATION, bearer(Some("pasien"))))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "error");
    }

    #[actix_web::test]
    async fn should_pass_claims_through_when_granted() {
        let app = test::init_service(
            App::new().service(
                web::resource("/sessions")
                    .wrap(RequirePermission::any(keys(), ["hd_session:create", "hd_session:update"]))
                    .to(whoami),
            ),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/sessions")
            .insert_header((header::AUTHORIZATION, bearer(Some("dokter"))))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, web::Bytes::from_static(b"tester"));
    }

    #[actix_web::test]
    async fn should_require_every_permission_for_all_guard() {
        let app = test::init_service(
            App::new().service(
                web::resource("/diagnoses")
                    .wrap(RequirePermission::all(keys(), ["patient:delete", "diagnosis:create"]))
                    .to(whoami),
            ),
        )
        .await;
        let dokter = test::TestRequest::get()
            .uri("/diagnoses")
            .insert_header((header::AUTHORIZATION, bearer(Some("dokter"))))
            .to_request();
        assert_eq!(test::call_service(&app, dokter).await.status(), StatusCode::FORBIDDEN);

        let admin = test::TestRequest::get()
            .uri("/diagnoses")
            .insert_header((header::AUTHORIZATION, bearer(Some("admin"))))
            .to_request();
        assert_eq!(test::call_service(&app, admin).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn should_admit_roleless_caller_on_authenticated_guard() {
        let app = test::init_service(
            App::new().service(
                web::resource("/me")
                    .wrap(RequirePermission::authenticated(keys()))
                    .to(whoami),
            ),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((header::AUTHORIZATION, bearer(None)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn should_fail_extractor_without_guard() {
        let app = test::init_service(App::new().route("/open", web::get().to(whoami))).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/open").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
