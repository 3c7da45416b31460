//! Request-level error taxonomy and its fixed HTTP status table.

use crate::dtos::Envelope;
use crate::services::ai::AiError;
use crate::services::math::KernelError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

pub const ALLOWED_KEYS: [&str; 5] = ["fibonacci", "prime", "lcm", "hcf", "AI"];

#[derive(Debug, Error)]
pub enum BfhlError {
    #[error("{0}")]
    InvalidBody(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Unknown key: {0}. Allowed keys: fibonacci, prime, lcm, hcf, AI")]
    UnknownKey(String),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error("Invalid JSON format")]
    InvalidJson,

    #[error("Endpoint not found")]
    NotFound,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<KernelError> for BfhlError {
    fn from(err: KernelError) -> Self {
        BfhlError::InvalidInput(err.to_string())
    }
}

impl BfhlError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        BfhlError::InvalidInput(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            BfhlError::InvalidBody(_)
            | BfhlError::InvalidInput(_)
            | BfhlError::UnknownKey(_)
            | BfhlError::InvalidJson => StatusCode::BAD_REQUEST,
            BfhlError::Ai(_) => StatusCode::SERVICE_UNAVAILABLE,
            BfhlError::NotFound => StatusCode::NOT_FOUND,
            BfhlError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable name used in logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            BfhlError::InvalidBody(_) => "InvalidBody",
            BfhlError::InvalidInput(_) => "InvalidInput",
            BfhlError::UnknownKey(_) => "UnknownKey",
            BfhlError::Ai(err) => err.kind(),
            BfhlError::InvalidJson => "InvalidJSON",
            BfhlError::NotFound => "NotFound",
            BfhlError::Internal(_) => "Internal",
        }
    }

    /// Message safe to return to the caller. Internal detail is logged here
    /// and replaced by a generic message.
    pub fn public_message(&self) -> String {
        match self {
            BfhlError::Internal(err) => {
                tracing::error!(error = ?err, "Internal error while processing request");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Render as an error envelope carrying the service identity.
    pub fn into_envelope_response(self, official_email: &str) -> Response {
        let status = self.status_code();
        let body: Envelope<()> = Envelope::failure(official_email, self.public_message());
        (status, Json(body)).into_response()
    }
}
