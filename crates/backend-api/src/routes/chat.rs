use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{services::chat as chat_service, ApiError, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    /// Client-generated identifier grouping the turns of one conversation.
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    /// `greeting`, `faq`, `out_of_scope`, `llm` or `fallback`.
    pub source: String,
}

impl From<chat_service::ChatReply> for ChatResponse {
    fn from(reply: chat_service::ChatReply) -> Self {
        Self {
            response: reply.response,
            session_id: reply.session_id,
            source: reply.source.as_str().to_string(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "Chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 422, description = "Missing message or session id", body = crate::error::ErrorResponse),
        (status = 429, description = "Too many requests from this client", body = crate::error::ErrorResponse)
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let reply = chat_service::respond(
        &state,
        payload.message.as_deref(),
        payload.session_id.as_deref(),
    )
    .await?;

    Ok(Json(reply.into()))
}
