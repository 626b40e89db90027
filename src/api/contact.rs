//! Contact form API

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::api::middleware::{ApiError, AppState};
use crate::services::ContactForm;

/// POST /api/v1/contact
///
/// The form is validated before anything reaches the backend.
pub async fn create_message(
    State(state): State<AppState>,
    Json(body): Json<ContactForm>,
) -> Result<impl IntoResponse, ApiError> {
    let message = body.validate().map_err(|e| ApiError::invalid_form(&e))?;

    let created = state.contact_service.create_contact_message(message).await?;

    Ok((StatusCode::CREATED, Json(created)))
}
