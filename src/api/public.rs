//! Public API types

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use http::StatusCode;

use crate::client::ChatError;

// Errors

pub struct ApiError(anyhow::Error);

const INTERNAL_ERROR: &str = "Internal Server Error";

/// Convert `ApiError` into an Axum compatible response with a JSON
/// `{"error": ...}` body.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Always log the error
        tracing::error!("{}", self.0);

        if let Some(rejection) = self.0.downcast_ref::<JsonRejection>() {
            let body = chat::ErrorResponse {
                error: rejection.body_text(),
            };
            return (rejection.status(), Json(body)).into_response();
        }

        let (status, message) = match self.0.downcast_ref::<ChatError>() {
            Some(err @ ChatError::Configuration(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            Some(ChatError::Upstream { status, message }) => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                message.clone(),
            ),
            Some(err @ ChatError::EmptyGeneration) => (StatusCode::BAD_GATEWAY, err.to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string()),
        };

        (status, Json(chat::ErrorResponse { error: message })).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod chat {
    pub use crate::api::routes::chat::public::*;
}
