//! API layer - HTTP handlers and routing
//!
//! JSON endpoints under `/api/v1` for the same operations the pages use:
//! - Auth (register, login, logout, current viewer)
//! - Profiles (teacher and student directories, own profile)
//! - Courses
//! - Blog posts (public listing, staff create/update)
//! - Contact messages
//! - Carousel slides
//!
//! [`build_router`] mounts the API next to the server-rendered pages.

pub mod auth;
pub mod carousel;
pub mod common;
pub mod contact;
pub mod courses;
pub mod middleware;
pub mod posts;
pub mod profiles;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;

pub use middleware::{ApiError, AppState, AuthenticatedUser, SessionToken, Viewer};

/// Build the JSON API router
pub fn build_api_router(config: &Config) -> Router<AppState> {
    // Staff routes (teachers and admins)
    let staff_routes = Router::new()
        .route("/posts", post(posts::create_post))
        .route("/posts/{id}", put(posts::update_post))
        .route_layer(axum_middleware::from_fn(middleware::require_staff))
        .route_layer(axum_middleware::from_fn(middleware::require_auth));

    // Protected routes (any signed-in user)
    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/profiles/me", get(profiles::get_me).put(profiles::update_me))
        .route_layer(axum_middleware::from_fn(middleware::require_auth));

    // Directories, behind sign-in like the pages that show them
    let mut directory_routes = Router::new()
        .route("/profiles/teachers", get(profiles::list_teachers))
        .route("/profiles/students", get(profiles::list_students));
    if config.site.directories_require_login {
        directory_routes =
            directory_routes.route_layer(axum_middleware::from_fn(middleware::require_auth));
    }

    // Public routes
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/courses", get(courses::list_courses))
        .route("/courses/{id}", get(courses::get_course))
        .route("/posts", get(posts::list_posts))
        .route("/posts/{id}", get(posts::get_post))
        .route("/contact", post(contact::create_message))
        .route("/carousel", get(carousel::list_slides))
        .merge(directory_routes)
        .merge(staff_routes)
        .merge(protected_routes)
}

/// Build the complete router: pages, API and shared middleware
pub fn build_router(state: AppState) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    match state.config.server.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(e) => tracing::warn!(
            "Ignoring invalid CORS origin {:?}: {}",
            state.config.server.cors_origin,
            e
        ),
    }

    // Static assets skip the session lookup.
    let app = Router::new()
        .nest("/api/v1", build_api_router(&state.config))
        .merge(crate::web::router())
        .fallback(crate::web::pages::not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth,
        ));

    Router::new()
        .merge(app)
        .merge(crate::web::asset_router())
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
