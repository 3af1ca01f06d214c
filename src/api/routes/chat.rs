use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::application::Citation;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: Uuid,
    pub answer: String,
    pub citations: Vec<Citation>,
}

/// Answers one free-text question synchronously. Omitting `session_id`
/// starts a fresh conversation; the returned id carries it forward.
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let session_id = match request.session_id {
        Some(id) => id,
        None => state.sessions.create()?,
    };

    let answer = state.chat_service.ask(session_id, &request.message).await?;

    Ok(Json(ChatResponse {
        session_id,
        answer: answer.answer,
        citations: answer.citations,
    }))
}
