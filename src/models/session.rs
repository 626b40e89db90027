//! Auth session models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Profile, UserRole};

/// User record owned by the auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Signed-in session returned by the auth provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Bearer token (stored in the session cookie)
    pub access_token: String,
    pub user: AuthUser,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Exchanged for a new session once the access token expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl AuthSession {
    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |at| at < Utc::now())
    }

    /// Seconds until the access token expires, clamped at zero
    pub fn seconds_remaining(&self) -> Option<i64> {
        self.expires_at
            .map(|at| (at - Utc::now()).num_seconds().max(0))
    }
}

/// Result of creating an auth user.
///
/// `session` is present when the provider signs the new user in straight
/// away (hosted projects without email confirmation).
#[derive(Debug, Clone)]
pub struct SignedUp {
    pub user: AuthUser,
    pub session: Option<AuthSession>,
}

/// Viewer information for templates and handlers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    /// Absent when the profile row is missing
    pub role: Option<UserRole>,
}

impl CurrentUser {
    pub fn new(user: AuthUser, profile: Option<Profile>) -> Self {
        match profile {
            Some(profile) => Self {
                id: user.id,
                email: user.email.or(profile.email),
                full_name: profile.full_name,
                role: Some(profile.role),
            },
            None => Self {
                id: user.id,
                email: user.email,
                full_name: None,
                role: None,
            },
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self.role, Some(UserRole::Teacher) | Some(UserRole::Admin))
    }
}

/// Session persisted by the local store.
#[derive(Debug, Clone)]
pub struct StoredSession {
    /// Token
    pub id: String,
    pub account_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// Credentials row of the local store.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AuthUser {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: Some(account.email),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_stored_session_expiry() {
        let now = Utc::now();
        let live = StoredSession {
            id: "t".to_string(),
            account_id: "a".to_string(),
            expires_at: now + Duration::hours(1),
            created_at: now,
        };
        let stale = StoredSession {
            expires_at: now - Duration::seconds(1),
            ..live.clone()
        };
        assert!(!live.is_expired());
        assert!(stale.is_expired());
    }

    #[test]
    fn test_seconds_remaining() {
        let mut session = AuthSession {
            access_token: "t".to_string(),
            user: AuthUser { id: "u1".to_string(), email: None },
            expires_at: None,
            refresh_token: None,
        };
        assert_eq!(session.seconds_remaining(), None);

        session.expires_at = Some(Utc::now() + Duration::seconds(3600));
        let left = session.seconds_remaining().unwrap();
        assert!((3590..=3600).contains(&left));

        session.expires_at = Some(Utc::now() - Duration::seconds(5));
        assert_eq!(session.seconds_remaining(), Some(0));
    }

    #[test]
    fn test_current_user_without_profile_has_no_role() {
        let user = AuthUser {
            id: "u1".to_string(),
            email: Some("a@b.com".to_string()),
        };
        let current = CurrentUser::new(user, None);
        assert!(current.role.is_none());
        assert!(!current.is_staff());
    }

    #[test]
    fn test_current_user_takes_role_from_profile() {
        let user = AuthUser { id: "u1".to_string(), email: None };
        let profile = Profile {
            id: "u1".to_string(),
            email: Some("prof@eepd.edu.br".to_string()),
            full_name: Some("Carlos".to_string()),
            role: UserRole::Teacher,
            phone: None,
            created_at: Utc::now(),
        };
        let current = CurrentUser::new(user, Some(profile));
        assert_eq!(current.role, Some(UserRole::Teacher));
        assert_eq!(current.email.as_deref(), Some("prof@eepd.edu.br"));
        assert!(current.is_staff());
    }
}
