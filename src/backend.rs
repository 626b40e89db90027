//! Backend selection
//!
//! Bundles the repositories and auth provider for the configured driver:
//! the local SQLite store or the hosted backend-as-a-service.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::{BackendDriver, Config};
use crate::db::repositories::{
    BlogPostRepository, CarouselImageRepository, ContactMessageRepository, CourseRepository,
    ProfileRepository, SqlxAccountRepository, SqlxBlogPostRepository,
    SqlxCarouselImageRepository, SqlxContactMessageRepository, SqlxCourseRepository,
    SqlxProfileRepository, SqlxSessionRepository,
};
use crate::db::{create_pool, migrations, DynDatabasePool};
use crate::hosted::{
    HostedAuthProvider, HostedBlogPostRepository, HostedCarouselImageRepository, HostedClient,
    HostedContactMessageRepository, HostedCourseRepository, HostedProfileRepository,
};
use crate::services::{AuthProvider, LocalAuthProvider};

/// Data and auth access for one backend
#[derive(Clone)]
pub struct Backend {
    pub profiles: Arc<dyn ProfileRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub posts: Arc<dyn BlogPostRepository>,
    pub messages: Arc<dyn ContactMessageRepository>,
    pub carousel: Arc<dyn CarouselImageRepository>,
    pub auth: Arc<dyn AuthProvider>,
}

impl Backend {
    /// Local store over an already migrated pool
    pub fn local(pool: DynDatabasePool, session_expiration_days: i64) -> Self {
        let auth = LocalAuthProvider::new(
            SqlxAccountRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
        )
        .with_session_expiration(session_expiration_days);

        Self {
            profiles: SqlxProfileRepository::boxed(pool.clone()),
            courses: SqlxCourseRepository::boxed(pool.clone()),
            posts: SqlxBlogPostRepository::boxed(pool.clone()),
            messages: SqlxContactMessageRepository::boxed(pool.clone()),
            carousel: SqlxCarouselImageRepository::boxed(pool),
            auth: Arc::new(auth),
        }
    }

    pub fn hosted(client: HostedClient) -> Self {
        Self {
            profiles: HostedProfileRepository::boxed(client.clone()),
            courses: HostedCourseRepository::boxed(client.clone()),
            posts: HostedBlogPostRepository::boxed(client.clone()),
            messages: HostedContactMessageRepository::boxed(client.clone()),
            carousel: HostedCarouselImageRepository::boxed(client.clone()),
            auth: Arc::new(HostedAuthProvider::new(client)),
        }
    }

    /// Build the backend named by `config.backend.driver`
    pub async fn from_config(config: &Config) -> Result<Self> {
        match config.backend.driver {
            BackendDriver::Local => {
                tracing::info!("Using local store at {}", config.database.url);
                let pool = create_pool(&config.database)
                    .await
                    .context("Failed to open local store")?;
                migrations::run_migrations(&pool)
                    .await
                    .context("Failed to run migrations")?;
                Ok(Self::local(pool, config.session.max_age_days))
            }
            BackendDriver::Hosted => {
                tracing::info!("Using hosted backend at {}", config.hosted.url);
                let client = HostedClient::new(&config.hosted)
                    .context("Failed to build hosted client")?;
                Ok(Self::hosted(client))
            }
        }
    }
}
