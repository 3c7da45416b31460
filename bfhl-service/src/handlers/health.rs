use crate::dtos::Envelope;
use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};

/// Liveness probe. Depends on nothing but configuration, so it always
/// succeeds while the process is serving.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(Envelope::status(&state.config.official_email))
}
