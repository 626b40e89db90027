//! One-shot toasts carried across a redirect
//!
//! A successful form post redirects (303) and stores its toast in a short
//! lived `flash` cookie. The next page shows it and clears the cookie.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::convert::Infallible;

use crate::api::middleware::cookie_value;
use crate::theme::Toast;

pub const FLASH_COOKIE: &str = "flash";

const FLASH_MAX_AGE: u32 = 60;

/// Toast left by the previous request, if any
#[derive(Debug, Clone, Default)]
pub struct Flash(pub Option<Toast>);

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Flash(
            cookie_value(&parts.headers, FLASH_COOKIE).and_then(|raw| decode(&raw)),
        ))
    }
}

fn decode(raw: &str) -> Option<Toast> {
    let json = urlencoding::decode(raw).ok()?;
    match serde_json::from_str(&json) {
        Ok(toast) => Some(toast),
        Err(e) => {
            tracing::debug!("Ignoring malformed flash cookie: {}", e);
            None
        }
    }
}

/// `Set-Cookie` value carrying `toast` to the next page
pub fn flash_cookie(toast: &Toast) -> String {
    let json = serde_json::to_string(toast).unwrap_or_default();
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        FLASH_COOKIE,
        urlencoding::encode(&json),
        FLASH_MAX_AGE
    )
}

/// `Set-Cookie` value removing a shown toast
pub fn clear_flash_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", FLASH_COOKIE)
}

/// 303 to `location` with a toast and any extra cookies
pub fn redirect_with(location: &str, toast: Toast, cookies: &[String]) -> Response {
    let mut headers = HeaderMap::new();

    let values = cookies
        .iter()
        .cloned()
        .chain(std::iter::once(flash_cookie(&toast)));
    for cookie in values {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Invalid Set-Cookie value: {}", e),
        }
    }

    match HeaderValue::from_str(location) {
        Ok(value) => {
            headers.insert(header::LOCATION, value);
        }
        Err(e) => {
            tracing::error!("Invalid redirect location {:?}: {}", location, e);
            headers.insert(header::LOCATION, HeaderValue::from_static("/"));
        }
    }

    (StatusCode::SEE_OTHER, headers).into_response()
}
