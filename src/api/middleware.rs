//! API middleware
//!
//! Contains middleware for:
//! - Session resolution (cookie or bearer token to the current viewer,
//!   renewing expired hosted sessions from the refresh cookie)
//! - Authorization (signed-in and staff-only routes)
//!
//! Also holds the shared application state and the JSON error type.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;

use crate::backend::Backend;
use crate::config::Config;
use crate::models::{AuthSession, CurrentUser};
use crate::services::{
    with_access_token, AuthService, BlogService, CarouselService, ContactService, CourseService,
    FieldErrors, MarkdownRenderer, ProfileService, ServiceError,
};
use crate::theme::ThemeEngine;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

/// Name of the cookie holding the hosted refresh token
pub const REFRESH_COOKIE: &str = "refresh";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth_service: Arc<AuthService>,
    pub profile_service: Arc<ProfileService>,
    pub course_service: Arc<CourseService>,
    pub blog_service: Arc<BlogService>,
    pub contact_service: Arc<ContactService>,
    pub carousel_service: Arc<CarouselService>,
    pub markdown: Arc<MarkdownRenderer>,
    pub theme_engine: Arc<ThemeEngine>,
}

impl AppState {
    pub fn new(config: Config, backend: Backend, theme_engine: ThemeEngine) -> Self {
        Self {
            config: Arc::new(config),
            auth_service: Arc::new(AuthService::new(backend.auth, backend.profiles.clone())),
            profile_service: Arc::new(ProfileService::new(backend.profiles)),
            course_service: Arc::new(CourseService::new(backend.courses)),
            blog_service: Arc::new(BlogService::new(backend.posts)),
            contact_service: Arc::new(ContactService::new(backend.messages)),
            carousel_service: Arc::new(CarouselService::new(backend.carousel)),
            markdown: Arc::new(MarkdownRenderer::new()),
            theme_engine: Arc::new(theme_engine),
        }
    }
}

/// Signed-in viewer, inserted by [`optional_auth`]
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub CurrentUser);

/// Token the viewer was resolved from
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Viewer that may be anonymous; never rejects
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<CurrentUser>);

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    /// 400 carrying the per-field messages
    pub fn invalid_form(errors: &FieldErrors) -> Self {
        Self::with_details(
            "VALIDATION_ERROR",
            errors.to_string(),
            serde_json::to_value(errors).unwrap_or_default(),
        )
    }

    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::AuthenticationError(msg) => ApiError::unauthorized(msg),
            ServiceError::PermissionDenied(msg) => ApiError::forbidden(msg),
            ServiceError::Conflict(msg) => ApiError::conflict(msg),
            ServiceError::Missing(msg) => ApiError::internal_error(msg),
            ServiceError::InternalError(e) => {
                tracing::error!("Backend error: {:#}", e);
                ApiError::internal_error(e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Value of a cookie from the `Cookie` header
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// Extract session token from request: bearer header first, then cookie
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    cookie_value(headers, SESSION_COOKIE).filter(|token| !token.is_empty())
}

fn cookie(name: &str, value: &str, max_age: i64, config: &Config) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, value, max_age
    );
    if config.session.secure_cookie {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` values establishing `session`.
///
/// A session that cannot be refreshed keeps its cookie no longer than the
/// access token itself.
pub fn session_cookies(session: &AuthSession, config: &Config) -> Vec<String> {
    let max_age = config.session.max_age_seconds();

    match &session.refresh_token {
        Some(refresh_token) => vec![
            cookie(SESSION_COOKIE, &session.access_token, max_age, config),
            cookie(REFRESH_COOKIE, refresh_token, max_age, config),
        ],
        None => {
            let max_age = session
                .seconds_remaining()
                .map_or(max_age, |left| left.min(max_age));
            vec![cookie(SESSION_COOKIE, &session.access_token, max_age, config)]
        }
    }
}

/// `Set-Cookie` values removing the session
pub fn clear_session_cookies() -> Vec<String> {
    [SESSION_COOKIE, REFRESH_COOKIE]
        .iter()
        .map(|name| format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name))
        .collect()
}

/// Append `Set-Cookie` headers, skipping values that are not valid headers
pub fn append_cookies(headers: &mut HeaderMap, cookies: &[String]) {
    for cookie in cookies {
        match HeaderValue::from_str(cookie) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::warn!("Dropping invalid cookie: {}", e),
        }
    }
}

fn sets_session_cookie(headers: &HeaderMap) -> bool {
    let prefix = format!("{}=", SESSION_COOKIE);
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with(&prefix))
}

/// Trade the refresh cookie for a new session and its viewer
async fn renew_session(
    state: &AppState,
    refresh_token: &str,
) -> Result<Option<(CurrentUser, AuthSession)>, ServiceError> {
    let session = match state.auth_service.refresh(refresh_token).await? {
        Some(session) => session,
        None => return Ok(None),
    };
    let user = state
        .auth_service
        .current_user(&session.access_token)
        .await?
        .unwrap_or_else(|| CurrentUser::new(session.user.clone(), None));

    tracing::debug!(user_id = %user.id, "Renewed session");
    Ok(Some((user, session)))
}

/// Resolve the viewer for every request.
///
/// An expired access token is renewed from the refresh cookie and the new
/// cookies ride on the response. The viewer's token stays bound while the
/// handler runs, so backend calls are made as the viewer. A failing lookup
/// is logged and the request continues anonymously.
pub async fn optional_auth(
    axum::extract::State(state): axum::extract::State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let mut resolved: Option<(CurrentUser, String)> = None;
    let mut renewed: Option<AuthSession> = None;
    let mut stale_refresh = false;

    if let Some(token) = extract_session_token(request.headers()) {
        match state.auth_service.current_user(&token).await {
            Ok(Some(user)) => resolved = Some((user, token)),
            Ok(None) => {}
            Err(e) => tracing::warn!("Session lookup failed: {}", e),
        }
    }

    if resolved.is_none() {
        let refresh_token =
            cookie_value(request.headers(), REFRESH_COOKIE).filter(|token| !token.is_empty());
        if let Some(refresh_token) = refresh_token {
            match renew_session(&state, &refresh_token).await {
                Ok(Some((user, session))) => {
                    resolved = Some((user, session.access_token.clone()));
                    renewed = Some(session);
                }
                Ok(None) => stale_refresh = true,
                Err(e) => tracing::warn!("Session refresh failed: {}", e),
            }
        }
    }

    let access_token = resolved.as_ref().map(|(_, token)| token.clone());
    if let Some((user, token)) = resolved {
        request.extensions_mut().insert(AuthenticatedUser(user));
        request.extensions_mut().insert(SessionToken(token));
    }

    let mut response = with_access_token(access_token, next.run(request)).await;

    // Sign-in and sign-out set their own session cookies.
    if !sets_session_cookie(response.headers()) {
        let cookies = match renewed {
            Some(session) => session_cookies(&session, &state.config),
            None if stale_refresh => clear_session_cookies(),
            None => Vec::new(),
        };
        append_cookies(response.headers_mut(), &cookies);
    }

    response
}

/// Reject anonymous requests
pub async fn require_auth(request: Request, next: Next) -> Result<Response, ApiError> {
    if request.extensions().get::<AuthenticatedUser>().is_none() {
        return Err(ApiError::unauthorized("Authentication required"));
    }
    Ok(next.run(request).await)
}

/// Teachers and admins only
pub async fn require_staff(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.is_staff() {
        return Err(ApiError::forbidden("Teacher or admin privileges required"));
    }

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionToken>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))
    }
}

impl<S> OptionalFromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<SessionToken>().cloned())
    }
}

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Viewer(
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .map(|user| user.0.clone()),
        ))
    }
}
