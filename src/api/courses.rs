//! Course catalog API

use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::middleware::{ApiError, AppState};
use crate::models::Course;

/// GET /api/v1/courses - All courses, name ascending
pub async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, ApiError> {
    Ok(Json(state.course_service.get_all_courses().await?))
}

/// GET /api/v1/courses/{id}
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Course>, ApiError> {
    state
        .course_service
        .get_course(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Course not found: {}", id)))
}
