//! Authentication API endpoints
//!
//! - POST /api/v1/auth/register - Create account and profile
//! - POST /api/v1/auth/login - Sign in, sets the session cookie
//! - POST /api/v1/auth/logout - Sign out, clears the session cookie
//! - GET /api/v1/auth/me - Current viewer

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::middleware::{
    append_cookies, clear_session_cookies, session_cookies, ApiError, AppState, AuthenticatedUser,
    SessionToken,
};
use crate::models::{AuthUser, CurrentUser};
use crate::services::{LoginForm, RegisterForm, ServiceError};

/// Response for successful sign-in
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: CurrentUser,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Response for successful registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: AuthUser,
}

/// POST /api/v1/auth/register
///
/// The account is created but not signed in: hosted projects may require
/// email confirmation first.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterForm>,
) -> Result<impl IntoResponse, ApiError> {
    let registration = body.validate().map_err(|e| ApiError::invalid_form(&e))?;

    let user = state.auth_service.sign_up(&registration).await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user })))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginForm>,
) -> Result<impl IntoResponse, ApiError> {
    let credentials = body.validate().map_err(|e| ApiError::invalid_form(&e))?;

    let session = state
        .auth_service
        .sign_in(&credentials)
        .await
        .map_err(|e| match e {
            ServiceError::AuthenticationError(_) => {
                ApiError::unauthorized("Email ou senha incorretos.")
            }
            other => other.into(),
        })?;

    let user = state
        .auth_service
        .current_user(&session.access_token)
        .await?
        .unwrap_or_else(|| CurrentUser::new(session.user.clone(), None));

    let mut headers = HeaderMap::new();
    append_cookies(&mut headers, &session_cookies(&session, &state.config));

    Ok((
        headers,
        Json(AuthResponse {
            user,
            token: session.access_token,
            expires_at: session.expires_at,
            refresh_token: session.refresh_token,
        }),
    ))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> Result<impl IntoResponse, ApiError> {
    state.auth_service.sign_out(&token).await?;

    let mut headers = HeaderMap::new();
    append_cookies(&mut headers, &clear_session_cookies());

    Ok((StatusCode::NO_CONTENT, headers))
}

/// GET /api/v1/auth/me
pub async fn me(AuthenticatedUser(user): AuthenticatedUser) -> Json<CurrentUser> {
    Json(user)
}
