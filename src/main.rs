//! EEPD-BH - Institutional website server

use anyhow::Result;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eepd::{
    api::{self, AppState},
    backend::Backend,
    config::Config,
    services::events::log_auth_events,
    theme::ThemeEngine,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eepd=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting EEPD-BH site...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded (backend: {:?})", config.backend.driver);

    // Connect the backend
    let backend = Backend::from_config(&config).await?;

    // Initialize theme engine
    let theme_engine = ThemeEngine::new(config.theme.path.as_deref())?;
    tracing::info!("Templates loaded: {}", theme_engine.template_names().len());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, backend, theme_engine);

    match state.auth_service.purge_expired_sessions().await {
        Ok(0) => {}
        Ok(n) => tracing::info!("Purged {} expired sessions", n),
        Err(e) => tracing::warn!("Failed to purge expired sessions: {}", e),
    }

    tokio::spawn(log_auth_events(state.auth_service.events().subscribe()));

    // Build router
    let app = api::build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
