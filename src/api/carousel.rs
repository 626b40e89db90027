//! Home page carousel API

use axum::{extract::State, Json};

use crate::api::middleware::AppState;
use crate::models::Slide;

/// GET /api/v1/carousel - Active slides, or the built-in photos
pub async fn list_slides(State(state): State<AppState>) -> Json<Vec<Slide>> {
    Json(state.carousel_service.slides().await)
}
