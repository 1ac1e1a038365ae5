//! Request-level error type with HTTP status code mapping.
//!
//! [`ReplyError`] is the error every reply operation returns. Each variant
//! maps to one HTTP status and the same JSON envelope. [`StartupError`]
//! covers service assembly and never reaches a client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ValidationError;
use crate::generator::GenerationError;
use crate::persistence::PersistenceError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// { "detail": "Error generating reply: generation request timed out" }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable failure message.
    pub detail: String,
}

/// Failure of one reply request or batch row.
///
/// | Variant       | Side effects before failing      | HTTP status |
/// |---------------|----------------------------------|-------------|
/// | `Validation`  | none                             | 422         |
/// | `Generation`  | one generation call              | 500         |
/// | `Persistence` | one generation call, one write   | 500         |
#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    /// Request rejected before any side effect.
    #[error("{0}")]
    Validation(String),

    /// The LLM provider failed.
    #[error("Error generating reply: {0}")]
    Generation(#[from] GenerationError),

    /// The store failed.
    #[error("Error generating reply: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Failure to assemble the reply service at process start.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The configured generator could not be built.
    #[error("cannot build reply generator: {0}")]
    Generator(#[source] GenerationError),

    /// The configured store could not be opened or initialized.
    #[error("cannot open reply store: {0}")]
    Store(#[source] PersistenceError),
}

impl From<ValidationError> for ReplyError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl ReplyError {
    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Generation(_) | Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ReplyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            detail: self.to_string(),
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
