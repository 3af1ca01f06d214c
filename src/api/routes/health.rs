use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::api::state::AppState;
use crate::domain::ports::VectorStore;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub indexed_chunks: usize,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Ready once the vector index is reachable. An empty index is still ready;
/// it answers with no context until ingestion runs.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, StatusCode> {
    match state.vector_store.count().await {
        Ok(indexed_chunks) => Ok(Json(ReadinessResponse {
            status: "ready".into(),
            indexed_chunks,
        })),
        Err(e) => {
            tracing::error!(error = %e, "vector index unreachable");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
