use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResultResponse {
    pub chunk_id: Uuid,
    pub content: String,
    pub document: String,
    pub page: usize,
    pub domain: String,
    pub score: f32,
}

/// Retrieval without generation, for inspecting what the index would feed
/// the model. Result count is the deployment's configured k.
pub async fn search_handler(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<SearchResultResponse>>, ApiError> {
    let results = state.rag_service.retrieve(&request.query).await?;

    Ok(Json(
        results
            .into_iter()
            .map(|r| SearchResultResponse {
                chunk_id: r.chunk.id,
                content: r.chunk.content,
                document: r.chunk.metadata.document,
                page: r.chunk.metadata.page,
                domain: r.chunk.metadata.domain,
                score: r.score,
            })
            .collect(),
    ))
}
