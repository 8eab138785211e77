use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use smartassist_database::{ChatLog, ChatLogFilter, DashboardStats};
use utoipa::{IntoParams, ToSchema};

use crate::{services::logs as log_service, ApiError, AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatLogResponse {
    pub id: i64,
    pub session_id: String,
    pub message: String,
    pub response: String,
    pub source: String,
    pub created_at: String,
}

impl From<ChatLog> for ChatLogResponse {
    fn from(log: ChatLog) -> Self {
        Self {
            id: log.id,
            session_id: log.session_id,
            message: log.message,
            response: log.response,
            source: log.source,
            created_at: log.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ChatLogQuery {
    pub session_id: Option<String>,
    /// Text contained in the session id, message or response.
    pub search: Option<String>,
    /// Defaults to 500, capped at 1000.
    pub limit: Option<u32>,
}

impl From<ChatLogQuery> for ChatLogFilter {
    fn from(query: ChatLogQuery) -> Self {
        Self {
            session_id: query.session_id.filter(|value| !value.trim().is_empty()),
            search: query.search.filter(|value| !value.trim().is_empty()),
            limit: query.limit,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub faqs: i64,
    pub chats: i64,
    pub sessions: i64,
    pub categories: i64,
    pub latest_activity: Option<String>,
}

impl From<DashboardStats> for DashboardResponse {
    fn from(stats: DashboardStats) -> Self {
        Self {
            faqs: stats.faqs,
            chats: stats.chats,
            sessions: stats.sessions,
            categories: stats.categories,
            latest_activity: stats.latest_activity,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/chat-logs",
    tag = "Admin",
    security(("bearerAuth" = [])),
    params(ChatLogQuery),
    responses(
        (status = 200, description = "Chat turns, newest first", body = [ChatLogResponse]),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access only", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_chat_logs(
    State(state): State<AppState>,
    Query(query): Query<ChatLogQuery>,
) -> Result<Json<Vec<ChatLogResponse>>, ApiError> {
    let logs = log_service::list(state.db_pool(), &query.into()).await?;
    Ok(Json(logs.into_iter().map(ChatLogResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Admin",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Knowledge base and chat figures", body = DashboardResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access only", body = crate::error::ErrorResponse)
    )
)]
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>, ApiError> {
    Ok(Json(log_service::dashboard(state.db_pool()).await?.into()))
}
