//! Auth-state notifications
//!
//! The auth service publishes an event whenever a session starts or ends.
//! Receivers that fall behind miss events (`RecvError::Lagged`).

use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { user_id: String },
    SignedOut,
}

/// Broadcast hub for [`AuthEvent`]s
#[derive(Debug, Clone)]
pub struct AuthEvents {
    sender: broadcast::Sender<AuthEvent>,
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl AuthEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.sender.subscribe()
    }

    /// Publish to current subscribers. No subscribers is not an error.
    pub fn publish(&self, event: AuthEvent) {
        let _ = self.sender.send(event);
    }
}

/// Log every auth event until the channel closes.
pub async fn log_auth_events(mut receiver: broadcast::Receiver<AuthEvent>) {
    loop {
        match receiver.recv().await {
            Ok(AuthEvent::SignedIn { user_id }) => {
                tracing::info!(user_id = %user_id, "User signed in");
            }
            Ok(AuthEvent::SignedOut) => {
                tracing::info!("User signed out");
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(lagged = n, "Auth event listener lagged behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let events = AuthEvents::default();
        let mut rx = events.subscribe();

        events.publish(AuthEvent::SignedIn {
            user_id: "u1".to_string(),
        });
        events.publish(AuthEvent::SignedOut);

        assert_eq!(
            rx.recv().await.unwrap(),
            AuthEvent::SignedIn {
                user_id: "u1".to_string()
            }
        );
        assert_eq!(rx.recv().await.unwrap(), AuthEvent::SignedOut);
    }

    #[test]
    fn test_publish_without_subscribers() {
        AuthEvents::default().publish(AuthEvent::SignedOut);
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags() {
        let events = AuthEvents::new(1);
        let mut rx = events.subscribe();

        events.publish(AuthEvent::SignedOut);
        events.publish(AuthEvent::SignedOut);

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
    }
}
