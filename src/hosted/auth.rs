//! Auth provider backed by the hosted auth endpoints (`/auth/v1`)

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{check_status, parse_json, HostedClient, HostedError};
use crate::models::{AuthSession, AuthUser, SignedUp};
use crate::services::{AuthProvider, ServiceError};

pub struct HostedAuthProvider {
    client: HostedClient,
}

impl HostedAuthProvider {
    pub fn new(client: HostedClient) -> Self {
        Self { client }
    }
}

/// Token-grant response (password and refresh grants)
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    /// Unix seconds
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self) -> AuthSession {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| self.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)));

        AuthSession {
            access_token: self.access_token,
            user: self.user,
            expires_at,
            refresh_token: self.refresh_token.filter(|token| !token.is_empty()),
        }
    }
}

/// Sign-up body with its session, when the project signs new users in
fn signed_up_from(body: Value) -> Option<SignedUp> {
    if body.get("access_token").is_some() {
        if let Ok(token) = serde_json::from_value::<TokenResponse>(body.clone()) {
            let session = token.into_session();
            return Some(SignedUp {
                user: session.user.clone(),
                session: Some(session),
            });
        }
    }

    user_from_signup(body).map(|user| SignedUp { user, session: None })
}

/// Sign-up returns either a bare user or `{user, session}` depending on
/// whether email confirmation is enabled.
fn user_from_signup(body: Value) -> Option<AuthUser> {
    let user = match body.get("user") {
        Some(user) if user.is_object() => user.clone(),
        _ if body.get("id").is_some() => body,
        _ => return None,
    };
    serde_json::from_value(user).ok()
}

fn is_credential_error(err: &HostedError) -> bool {
    matches!(err.status(), Some(400) | Some(401) | Some(422))
}

#[async_trait]
impl AuthProvider for HostedAuthProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<SignedUp>, ServiceError> {
        let response = self
            .client
            .request(Method::POST, &self.client.auth_url("signup"), None)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(HostedError::from)?;

        let body: Value = parse_json(response).await?;
        Ok(signed_up_from(body))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, ServiceError> {
        let result: Result<TokenResponse, HostedError> = async {
            let response = self
                .client
                .request(
                    Method::POST,
                    &self.client.auth_url("token?grant_type=password"),
                    None,
                )
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await?;
            parse_json(response).await
        }
        .await;

        match result {
            Ok(token) => Ok(token.into_session()),
            Err(e) if is_credential_error(&e) => Err(ServiceError::AuthenticationError(e.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ServiceError> {
        let response = self
            .client
            .request(Method::POST, &self.client.auth_url("logout"), Some(access_token))
            .send()
            .await
            .map_err(HostedError::from)?;

        // An expired or revoked token has nothing left to sign out.
        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
        ) {
            tracing::debug!("Logout with stale token ({})", response.status());
            return Ok(());
        }

        check_status(response).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, ServiceError> {
        let response = self
            .client
            .request(Method::GET, &self.client.auth_url("user"), Some(access_token))
            .send()
            .await
            .map_err(HostedError::from)?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }

        let user: AuthUser = parse_json(response).await?;
        Ok(Some(user))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Option<AuthSession>, ServiceError> {
        let result: Result<TokenResponse, HostedError> = async {
            let response = self
                .client
                .request(
                    Method::POST,
                    &self.client.auth_url("token?grant_type=refresh_token"),
                    None,
                )
                .json(&json!({ "refresh_token": refresh_token }))
                .send()
                .await?;
            parse_json(response).await
        }
        .await;

        match result {
            Ok(token) => Ok(Some(token.into_session())),
            Err(e) if is_credential_error(&e) => {
                tracing::debug!("Refresh token rejected: {}", e);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_bare_user() {
        let body = json!({ "id": "u-1", "email": "a@b.com", "aud": "authenticated" });
        let user = user_from_signup(body).expect("user");
        assert_eq!(user.id, "u-1");
        assert_eq!(user.email.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn test_signup_with_session() {
        let body = json!({
            "access_token": "jwt",
            "user": { "id": "u-2", "email": "c@d.com" }
        });
        assert_eq!(user_from_signup(body).map(|u| u.id), Some("u-2".to_string()));
    }

    #[test]
    fn test_signup_without_user() {
        assert!(user_from_signup(json!({ "user": null })).is_none());
        assert!(user_from_signup(json!({})).is_none());
    }

    #[test]
    fn test_signup_keeps_session() {
        let signed_up = signed_up_from(json!({
            "access_token": "USER-JWT",
            "expires_in": 3600,
            "refresh_token": "r-1",
            "user": { "id": "u-3", "email": "e@f.com" }
        }))
        .expect("signed up");

        assert_eq!(signed_up.user.id, "u-3");
        let session = signed_up.session.expect("session");
        assert_eq!(session.access_token, "USER-JWT");
        assert_eq!(session.refresh_token.as_deref(), Some("r-1"));

        let pending = signed_up_from(json!({ "id": "u-4", "email": "g@h.com" })).unwrap();
        assert!(pending.session.is_none());
    }

    #[test]
    fn test_token_response_prefers_absolute_expiry() {
        let token: TokenResponse = serde_json::from_value(json!({
            "access_token": "jwt",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1_700_000_000,
            "refresh_token": "r",
            "user": { "id": "u-1", "email": "a@b.com" }
        }))
        .unwrap();

        let session = token.into_session();
        assert_eq!(session.access_token, "jwt");
        assert_eq!(session.refresh_token.as_deref(), Some("r"));
        assert_eq!(session.expires_at.map(|t| t.timestamp()), Some(1_700_000_000));
        assert!(session.is_expired());
    }

    #[test]
    fn test_token_response_relative_expiry() {
        let token: TokenResponse = serde_json::from_value(json!({
            "access_token": "jwt",
            "expires_in": 3600,
            "user": { "id": "u-1" }
        }))
        .unwrap();

        let session = token.into_session();
        assert!(!session.is_expired());
        assert!(session.user.email.is_none());
    }

    #[test]
    fn test_credential_errors() {
        let bad = HostedError::Api {
            status: 400,
            code: Some("invalid_grant".to_string()),
            message: "Invalid login credentials".to_string(),
        };
        let down = HostedError::Api {
            status: 503,
            code: None,
            message: "Service Unavailable".to_string(),
        };
        assert!(is_credential_error(&bad));
        assert!(!is_credential_error(&down));
    }
    mod over_http {
        use super::super::*;
        use crate::hosted::mock::{spawn, ANON_KEY};
        use axum::{
            routing::{get, post},
            Json, Router,
        };

        fn token_body(access_token: &str) -> Value {
            json!({
                "access_token": access_token,
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": format!("refresh-{}", access_token),
                "user": { "id": "u-1", "email": "paula@eepd.edu.br" }
            })
        }

        #[tokio::test]
        async fn test_sign_in_password_grant() {
            let mock = spawn(Router::new().route(
                "/auth/v1/token",
                post(|| async { Json(token_body("USER-JWT")) }),
            ))
            .await;
            let provider = HostedAuthProvider::new(mock.client.clone());

            let session = provider.sign_in("paula@eepd.edu.br", "segredo123").await.unwrap();
            assert_eq!(session.access_token, "USER-JWT");
            assert_eq!(session.refresh_token.as_deref(), Some("refresh-USER-JWT"));
            assert!(!session.is_expired());

            let seen = mock.log.to_path("/auth/v1/token");
            assert_eq!(seen[0].query.as_deref(), Some("grant_type=password"));
            assert_eq!(seen[0].apikey.as_deref(), Some(ANON_KEY));
        }

        #[tokio::test]
        async fn test_sign_in_bad_credentials() {
            let mock = spawn(Router::new().route(
                "/auth/v1/token",
                post(|| async {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": "invalid_grant",
                            "error_description": "Invalid login credentials"
                        })),
                    )
                }),
            ))
            .await;
            let provider = HostedAuthProvider::new(mock.client.clone());

            let err = provider.sign_in("paula@eepd.edu.br", "errada1").await.unwrap_err();
            assert!(matches!(err, ServiceError::AuthenticationError(_)));
        }

        #[tokio::test]
        async fn test_get_user_sends_token() {
            let mock = spawn(Router::new().route(
                "/auth/v1/user",
                get(|| async { Json(json!({ "id": "u-1", "email": "paula@eepd.edu.br" })) }),
            ))
            .await;
            let provider = HostedAuthProvider::new(mock.client.clone());

            let user = provider.get_user("USER-JWT").await.unwrap().expect("user");
            assert_eq!(user.id, "u-1");

            let seen = mock.log.to_path("/auth/v1/user");
            assert_eq!(seen[0].authorization.as_deref(), Some("Bearer USER-JWT"));
        }

        #[tokio::test]
        async fn test_get_user_rejected_token_is_anonymous() {
            let mock = spawn(Router::new().route(
                "/auth/v1/user",
                get(|| async {
                    (StatusCode::UNAUTHORIZED, Json(json!({ "msg": "JWT expired" })))
                }),
            ))
            .await;
            let provider = HostedAuthProvider::new(mock.client.clone());

            assert!(provider.get_user("STALE-JWT").await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_sign_out_stale_token_is_signed_out() {
            let mock = spawn(Router::new().route(
                "/auth/v1/logout",
                post(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "msg": "JWT expired" }))) }),
            ))
            .await;
            let provider = HostedAuthProvider::new(mock.client.clone());

            provider.sign_out("STALE-JWT").await.expect("already signed out");
            let seen = mock.log.to_path("/auth/v1/logout");
            assert_eq!(seen[0].authorization.as_deref(), Some("Bearer STALE-JWT"));
        }

        #[tokio::test]
        async fn test_sign_out_server_error_propagates() {
            let mock = spawn(Router::new().route(
                "/auth/v1/logout",
                post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            ))
            .await;
            let provider = HostedAuthProvider::new(mock.client.clone());

            let err = provider.sign_out("USER-JWT").await.unwrap_err();
            assert!(matches!(err, ServiceError::InternalError(_)));
        }

        #[tokio::test]
        async fn test_refresh_session() {
            let mock = spawn(Router::new().route(
                "/auth/v1/token",
                post(|Json(body): Json<Value>| async move {
                    if body["refresh_token"] == "refresh-OLD" {
                        (StatusCode::OK, Json(token_body("NEW-JWT")))
                    } else {
                        (
                            StatusCode::BAD_REQUEST,
                            Json(json!({ "error": "invalid_grant", "error_description": "Invalid Refresh Token" })),
                        )
                    }
                }),
            ))
            .await;
            let provider = HostedAuthProvider::new(mock.client.clone());

            let session = provider
                .refresh_session("refresh-OLD")
                .await
                .unwrap()
                .expect("new session");
            assert_eq!(session.access_token, "NEW-JWT");
            assert_eq!(session.refresh_token.as_deref(), Some("refresh-NEW-JWT"));

            let seen = mock.log.to_path("/auth/v1/token");
            assert_eq!(seen[0].query.as_deref(), Some("grant_type=refresh_token"));

            assert!(provider.refresh_session("revoked").await.unwrap().is_none());
        }
    }
}
