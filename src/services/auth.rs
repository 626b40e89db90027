//! Auth service
//!
//! Sign-up, sign-in, sign-out and current-user lookup. The credential checks
//! live behind [`AuthProvider`]: [`LocalAuthProvider`] uses the SQLite
//! accounts/sessions tables, `HostedAuthProvider` calls the hosted auth API.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::access::with_access_token;
use super::events::{AuthEvent, AuthEvents};
use super::password::{hash_password, verify_password};
use super::validation::{Credentials, Registration};
use super::ServiceError;
use crate::db::repositories::{AccountRepository, ProfileRepository, SessionRepository};
use crate::models::{
    Account, AuthSession, AuthUser, CurrentUser, NewProfile, SignedUp, StoredSession,
};

/// Default session lifetime in days
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

/// Message used for every credential mismatch
pub const INVALID_CREDENTIALS: &str = "Invalid login credentials";

/// Identity provider behind the auth service
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an auth user. `None` when the provider created nothing.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<SignedUp>, ServiceError>;

    /// Exchange credentials for a session
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, ServiceError>;

    /// Invalidate the session behind `access_token`
    async fn sign_out(&self, access_token: &str) -> Result<(), ServiceError>;

    /// User for a token; `None` when the token is unknown or expired
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, ServiceError>;

    /// Trade a refresh token for a new session; `None` when it was rejected
    async fn refresh_session(&self, _refresh_token: &str) -> Result<Option<AuthSession>, ServiceError> {
        Ok(None)
    }

    /// Drop sessions past their expiry. Returns how many were removed.
    async fn purge_expired_sessions(&self) -> Result<u64, ServiceError> {
        Ok(0)
    }
}

/// Auth provider backed by the local `accounts` and `sessions` tables
pub struct LocalAuthProvider {
    accounts: Arc<dyn AccountRepository>,
    sessions: Arc<dyn SessionRepository>,
    session_expiration_days: i64,
}

impl LocalAuthProvider {
    pub fn new(accounts: Arc<dyn AccountRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self {
            accounts,
            sessions,
            session_expiration_days: DEFAULT_SESSION_EXPIRATION_DAYS,
        }
    }

    pub fn with_session_expiration(mut self, days: i64) -> Self {
        self.session_expiration_days = days;
        self
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<SignedUp>, ServiceError> {
        let email = email.trim().to_lowercase();

        if self.accounts.exists_by_email(&email).await? {
            return Err(ServiceError::Conflict("User already registered".to_string()));
        }

        let account = Account {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash: hash_password(password)?,
            created_at: Utc::now(),
        };
        let created = self.accounts.create(&account).await?;

        Ok(Some(SignedUp {
            user: created.into(),
            session: None,
        }))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, ServiceError> {
        let account = self
            .accounts
            .get_by_email(email.trim())
            .await?
            .ok_or_else(|| ServiceError::AuthenticationError(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(password, &account.password_hash)? {
            return Err(ServiceError::AuthenticationError(
                INVALID_CREDENTIALS.to_string(),
            ));
        }

        let now = Utc::now();
        let session = StoredSession {
            id: Uuid::new_v4().to_string(),
            account_id: account.id.clone(),
            expires_at: now + Duration::days(self.session_expiration_days),
            created_at: now,
        };
        let session = self.sessions.create(&session).await?;

        Ok(AuthSession {
            access_token: session.id,
            user: account.into(),
            expires_at: Some(session.expires_at),
            refresh_token: None,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ServiceError> {
        self.sessions.delete(access_token).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, ServiceError> {
        let session = match self.sessions.get_by_id(access_token).await? {
            Some(session) => session,
            None => return Ok(None),
        };

        if session.is_expired() {
            self.sessions.delete(&session.id).await?;
            return Ok(None);
        }

        let account = self.accounts.get_by_id(&session.account_id).await?;
        Ok(account.map(AuthUser::from))
    }

    async fn purge_expired_sessions(&self) -> Result<u64, ServiceError> {
        Ok(self.sessions.delete_expired().await?)
    }
}

/// Auth operations used by pages and the JSON API
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
    profiles: Arc<dyn ProfileRepository>,
    events: AuthEvents,
}

impl AuthService {
    pub fn new(provider: Arc<dyn AuthProvider>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self {
            provider,
            profiles,
            events: AuthEvents::default(),
        }
    }

    pub fn events(&self) -> &AuthEvents {
        &self.events
    }

    /// Create the auth user, then insert its profile.
    ///
    /// The insert runs as the new user when the provider returned a session.
    /// A profile insert failure is returned as-is; the auth user created in
    /// the first step is not rolled back.
    pub async fn sign_up(&self, registration: &Registration) -> Result<AuthUser, ServiceError> {
        let SignedUp { user, session } = self
            .provider
            .sign_up(&registration.email, &registration.password)
            .await?
            .ok_or_else(|| ServiceError::Missing("Falha ao criar usuário".to_string()))?;

        let profile = NewProfile {
            id: user.id.clone(),
            email: registration.email.clone(),
            full_name: registration.full_name.clone(),
            phone: registration.phone.clone(),
            role: registration.role.clone(),
        };
        let token = session.map(|s| s.access_token);
        with_access_token(token, self.profiles.create(&profile)).await?;

        tracing::info!(user_id = %user.id, role = %registration.role, "Registered new user");
        Ok(user)
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, ServiceError> {
        let session = self
            .provider
            .sign_in(&credentials.email, &credentials.password)
            .await?;

        self.events.publish(AuthEvent::SignedIn {
            user_id: session.user.id.clone(),
        });
        Ok(session)
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), ServiceError> {
        self.provider.sign_out(access_token).await?;
        self.events.publish(AuthEvent::SignedOut);
        Ok(())
    }

    pub async fn purge_expired_sessions(&self) -> Result<u64, ServiceError> {
        self.provider.purge_expired_sessions().await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<Option<AuthSession>, ServiceError> {
        self.provider.refresh_session(refresh_token).await
    }

    pub async fn get_current_user(&self, access_token: &str) -> Result<Option<AuthUser>, ServiceError> {
        self.provider.get_user(access_token).await
    }

    /// Auth user joined with its profile, for the header and guards
    pub async fn current_user(&self, access_token: &str) -> Result<Option<CurrentUser>, ServiceError> {
        let user = match self.get_current_user(access_token).await? {
            Some(user) => user,
            None => return Ok(None),
        };
        let profile = with_access_token(
            Some(access_token.to_string()),
            self.profiles.get_by_id(&user.id),
        )
        .await?;

        Ok(Some(CurrentUser::new(user, profile)))
    }
}
