//! In-process stand-in for the hosted service
//!
//! Tests describe the endpoints they need as an axum [`Router`]; every
//! request that reaches it is recorded with the headers the client sent.

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::sync::{Arc, Mutex};

use super::HostedClient;
use crate::config::HostedConfig;

pub const ANON_KEY: &str = "ANON-KEY";

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub apikey: Option<String>,
    pub prefer: Option<String>,
}

#[derive(Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<SeenRequest>>>);

impl RequestLog {
    pub fn all(&self) -> Vec<SeenRequest> {
        self.0.lock().unwrap().clone()
    }

    /// Requests to `path`, in arrival order
    pub fn to_path(&self, path: &str) -> Vec<SeenRequest> {
        self.all().into_iter().filter(|r| r.path == path).collect()
    }
}

async fn record(State(log): State<RequestLog>, request: Request, next: Next) -> Response {
    let seen = {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let seen = SeenRequest {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            query: request.uri().query().map(str::to_string),
            authorization: header("authorization"),
            apikey: header("apikey"),
            prefer: header("prefer"),
        };
        seen
    };
    log.0.lock().unwrap().push(seen);

    next.run(request).await
}

pub struct MockHosted {
    pub client: HostedClient,
    pub log: RequestLog,
}

/// Serve `routes` on a loopback port and point a client at it
pub async fn spawn(routes: Router) -> MockHosted {
    let log = RequestLog::default();
    let app = routes.layer(middleware::from_fn_with_state(log.clone(), record));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = HostedConfig {
        url: format!("http://{}", addr),
        api_key: ANON_KEY.to_string(),
        timeout_seconds: 5,
    };
    let client =
        HostedClient::with_builder(&config, reqwest::Client::builder().no_proxy()).unwrap();

    MockHosted { client, log }
}
