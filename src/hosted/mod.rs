//! Hosted backend client
//!
//! A thin typed wrapper over a Supabase-compatible backend-as-a-service:
//! PostgREST table endpoints under `/rest/v1` and GoTrue auth endpoints under
//! `/auth/v1`. Every call is a single request/response round trip; non-2xx
//! responses become a [`HostedError`] that callers propagate unchanged.
//!
//! Table calls run as the viewer: they send the access token bound with
//! [`with_access_token`](crate::services::with_access_token), or the anon key
//! when nobody is signed in.

pub mod auth;
#[cfg(test)]
pub(crate) mod mock;
pub mod query;
pub mod tables;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::HostedConfig;
use crate::services::current_access_token;

pub use auth::HostedAuthProvider;
pub use query::Query;
pub use tables::{
    HostedBlogPostRepository, HostedCarouselImageRepository, HostedContactMessageRepository,
    HostedCourseRepository, HostedProfileRepository,
};

/// Errors raised by the hosted client
#[derive(Debug, thiserror::Error)]
pub enum HostedError {
    /// Non-2xx response from the service
    #[error("{message} (status {status})")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("Expected at most one row, got {0}")]
    MultipleRows(usize),
    #[error("Refusing to update {0} without a filter")]
    UnfilteredUpdate(String),
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl HostedError {
    pub fn status(&self) -> Option<u16> {
        match self {
            HostedError::Api { status, .. } => Some(*status),
            HostedError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<HostedError> for crate::services::ServiceError {
    fn from(err: HostedError) -> Self {
        crate::services::ServiceError::InternalError(err.into())
    }
}

/// Error body shapes used by PostgREST (`message`, `code`) and GoTrue
/// (`msg`, `error_description`, `error_code`).
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
    code: Option<serde_json::Value>,
    error_code: Option<String>,
}

/// Client for one hosted project
#[derive(Clone)]
pub struct HostedClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HostedClient {
    pub fn new(config: &HostedConfig) -> anyhow::Result<Self> {
        Self::with_builder(config, reqwest::Client::builder())
    }

    pub(crate) fn with_builder(
        config: &HostedConfig,
        builder: reqwest::ClientBuilder,
    ) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(&config.api_key)?);

        let http = builder
            .user_agent(concat!("eepd/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Request carrying the bearer token (the anon key when `token` is `None`)
    pub(crate) fn request(&self, method: Method, url: &str, token: Option<&str>) -> RequestBuilder {
        let bearer = token.unwrap_or(&self.api_key);
        self.http
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", bearer))
    }

    /// Table request on behalf of the current viewer
    fn table_request(&self, method: Method, table: &str) -> RequestBuilder {
        let token = current_access_token();
        self.request(method, &self.table_url(table), token.as_deref())
    }

    /// `GET /rest/v1/{table}`
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Vec<T>, HostedError> {
        let response = self
            .table_request(Method::GET, table)
            .query(&query.to_params())
            .send()
            .await?;

        parse_json(response).await
    }

    /// Select expecting zero or one row
    pub async fn maybe_single<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Option<T>, HostedError> {
        let rows = self.select(table, query).await?;
        at_most_one(rows)
    }

    /// `POST /rest/v1/{table}` returning the inserted rows
    pub async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<Vec<T>, HostedError> {
        let response = self
            .table_request(Method::POST, table)
            .header("Prefer", "return=representation")
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;

        parse_json(response).await
    }

    /// `PATCH /rest/v1/{table}?<filters>` returning the updated rows
    pub async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        filter: &Query,
        body: &B,
    ) -> Result<Vec<T>, HostedError> {
        if !filter.has_filters() {
            return Err(HostedError::UnfilteredUpdate(table.to_string()));
        }

        let response = self
            .table_request(Method::PATCH, table)
            .query(&filter.to_params())
            .header("Prefer", "return=representation")
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;

        parse_json(response).await
    }
}

/// Zero rows is `None`, more than one is an error.
pub(crate) fn at_most_one<T>(rows: Vec<T>) -> Result<Option<T>, HostedError> {
    if rows.len() > 1 {
        return Err(HostedError::MultipleRows(rows.len()));
    }
    Ok(rows.into_iter().next())
}

/// Decode a 2xx JSON body, or turn the response into [`HostedError::Api`]
pub(crate) async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, HostedError> {
    let response = check_status(response).await?;
    Ok(response.json().await?)
}

pub(crate) async fn check_status(response: Response) -> Result<Response, HostedError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    Err(api_error(status, &text))
}

fn api_error(status: StatusCode, text: &str) -> HostedError {
    let body: ErrorBody = serde_json::from_str(text).unwrap_or_default();

    let message = body
        .message
        .or(body.msg)
        .or(body.error_description)
        .or(body.error.clone())
        .unwrap_or_else(|| {
            if text.is_empty() {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            } else {
                text.to_string()
            }
        });

    let code = body
        .error_code
        .or_else(|| match body.code {
            Some(serde_json::Value::String(code)) => Some(code),
            Some(serde_json::Value::Number(code)) => Some(code.to_string()),
            _ => None,
        })
        .or(body.error);

    HostedError::Api {
        status: status.as_u16(),
        code,
        message,
    }
}
