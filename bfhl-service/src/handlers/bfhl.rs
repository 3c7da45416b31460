use crate::dtos::Envelope;
use crate::error::BfhlError;
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

/// `POST /bfhl`: run the operation named by the body's single key.
pub async fn bfhl(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let email = &state.config.official_email;

    let Json(body) = match payload {
        Ok(body) => body,
        // Without a JSON content type the body is never parsed, so it reads as empty.
        Err(JsonRejection::MissingJsonContentType(_)) => {
            return BfhlError::InvalidBody("Request body cannot be empty".to_string())
                .into_envelope_response(email);
        }
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Rejected request body");
            return BfhlError::InvalidJson.into_envelope_response(email);
        }
    };

    match state.dispatcher.dispatch(&body).await {
        Ok(data) => (StatusCode::OK, Json(Envelope::success(email, data))).into_response(),
        Err(err) => {
            tracing::info!(
                kind = err.kind(),
                status = err.status_code().as_u16(),
                "bfhl request failed"
            );
            err.into_envelope_response(email)
        }
    }
}

/// Fallback for unknown routes and wrong methods on known routes.
pub async fn not_found(State(state): State<AppState>) -> Response {
    BfhlError::NotFound.into_envelope_response(&state.config.official_email)
}
