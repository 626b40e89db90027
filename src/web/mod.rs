//! Server-rendered site
//!
//! Page routes (Portuguese paths, as linked from the header) plus the
//! embedded stylesheet and script.

pub mod assets;
pub mod flash;
pub mod pages;

use axum::{routing::get, Router};

use crate::api::AppState;

/// Page routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/cursos", get(pages::courses))
        .route("/blog", get(pages::blog))
        .route("/blog/{id}", get(pages::post))
        .route("/contato", get(pages::contact).post(pages::submit_contact))
        .route("/login", get(pages::login).post(pages::submit_login))
        .route("/cadastro", get(pages::register).post(pages::submit_register))
        .route("/sair", axum::routing::post(pages::sign_out))
        .route("/professores", get(pages::teachers))
        .route("/alunos", get(pages::students))
}

/// Embedded stylesheet and script
pub fn asset_router() -> Router<AppState> {
    Router::new().route("/assets/{*path}", get(assets::serve_asset))
}

#[cfg(test)]
mod tests;
