//! Request-scoped access token
//!
//! The hosted backend enforces row-level access with the caller's JWT, so
//! every table call made while handling a request must carry the viewer's
//! token. The token is bound to the task for the duration of a future;
//! repositories that don't need it (the local store) simply never read it.

use std::future::Future;

tokio::task_local! {
    static ACCESS_TOKEN: Option<String>;
}

/// Run `fut` with `token` as the caller's access token.
///
/// `None` shadows any outer token, so the calls go out anonymously.
pub async fn with_access_token<F: Future>(token: Option<String>, fut: F) -> F::Output {
    ACCESS_TOKEN.scope(token, fut).await
}

/// Access token bound by the nearest [`with_access_token`], if any
pub fn current_access_token() -> Option<String> {
    ACCESS_TOKEN.try_with(|token| token.clone()).ok().flatten()
}
