use smartassist_database::{ChatLog, ChatLogFilter, ChatLogRepository, DashboardStats};
use sqlx::SqlitePool;

use crate::services::ServiceError;

/// Newest first, capped at the effective limit.
pub async fn list(pool: &SqlitePool, filter: &ChatLogFilter) -> Result<Vec<ChatLog>, ServiceError> {
    Ok(ChatLogRepository::new(pool.clone()).list(filter).await?)
}

pub async fn dashboard(pool: &SqlitePool) -> Result<DashboardStats, ServiceError> {
    Ok(ChatLogRepository::new(pool.clone()).dashboard_stats().await?)
}
