use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;

/// A failed pipeline stage surfaces as a JSON error body in place of an
/// answer; nothing partial is returned.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            DomainError::EmbeddingService(_) | DomainError::GenerationService(_) => {
                StatusCode::BAD_GATEWAY
            }
            DomainError::SetupRequired(_) => StatusCode::SERVICE_UNAVAILABLE,
            DomainError::Load { .. } | DomainError::Index(_) | DomainError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        tracing::error!(error = %self.0, status = %status.as_u16(), "request failed");
        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
