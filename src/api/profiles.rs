//! Profile API endpoints

use axum::{extract::State, Json};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{Profile, ProfileUpdate};

/// GET /api/v1/profiles/teachers
pub async fn list_teachers(State(state): State<AppState>) -> Result<Json<Vec<Profile>>, ApiError> {
    Ok(Json(state.profile_service.get_all_teachers().await?))
}

/// GET /api/v1/profiles/students
pub async fn list_students(State(state): State<AppState>) -> Result<Json<Vec<Profile>>, ApiError> {
    Ok(Json(state.profile_service.get_all_students().await?))
}

/// GET /api/v1/profiles/me
pub async fn get_me(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Profile>, ApiError> {
    state
        .profile_service
        .get_profile(&user.id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Profile not found"))
}

/// PUT /api/v1/profiles/me
pub async fn update_me(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<Profile>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::validation_error("Nothing to update"));
    }

    Ok(Json(state.profile_service.update_profile(&user.id, &body).await?))
}
