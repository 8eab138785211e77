//! Repository for the chat transcript log.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use super::faq_repository::like_pattern;
use crate::entities::{ChatLog, ChatLogFilter, DashboardStats, NewChatLog};
use crate::types::{now_timestamp, DatabaseResult};

const CHAT_LOG_COLUMNS: &str = "id, session_id, message, response, source, created_at";

pub const DEFAULT_LOG_LIMIT: u32 = 500;
pub const MAX_LOG_LIMIT: u32 = 1000;

/// Repository for chat log database operations
#[derive(Clone)]
pub struct ChatLogRepository {
    pool: SqlitePool,
}

impl ChatLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn append(&self, entry: &NewChatLog) -> DatabaseResult<ChatLog> {
        let now = now_timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO chat_logs (session_id, message, response, source, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.session_id)
        .bind(&entry.message)
        .bind(&entry.response)
        .bind(entry.source.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, session_id = %entry.session_id, source = %entry.source, "appended chat log");

        Ok(ChatLog {
            id,
            session_id: entry.session_id.clone(),
            message: entry.message.clone(),
            response: entry.response.clone(),
            source: entry.source.as_str().to_string(),
            created_at: now,
        })
    }

    /// Newest entries first, optionally narrowed to one session or a search term.
    pub async fn list(&self, filter: &ChatLogFilter) -> DatabaseResult<Vec<ChatLog>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {CHAT_LOG_COLUMNS} FROM chat_logs WHERE 1 = 1"
        ));

        if let Some(session_id) = filter
            .session_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            query.push(" AND session_id = ").push_bind(session_id.to_string());
        }

        if let Some(term) = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            let pattern = like_pattern(term);
            query
                .push(" AND (lower(session_id) LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR lower(message) LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR lower(response) LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }

        query
            .push(" ORDER BY id DESC LIMIT ")
            .push_bind(i64::from(effective_limit(filter.limit)));

        let logs = query
            .build_query_as::<ChatLog>()
            .fetch_all(&self.pool)
            .await?;

        Ok(logs)
    }

    /// The latest `limit` turns of a session, oldest first.
    pub async fn recent_for_session(
        &self,
        session_id: &str,
        limit: u32,
    ) -> DatabaseResult<Vec<ChatLog>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut logs = sqlx::query_as::<_, ChatLog>(&format!(
            "SELECT {CHAT_LOG_COLUMNS} FROM chat_logs WHERE session_id = ? ORDER BY id DESC LIMIT ?"
        ))
        .bind(session_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        logs.reverse();
        Ok(logs)
    }

    /// Whether the session has an earlier turn answered from the FAQ or the assistant.
    pub async fn session_has_in_scope_turn(&self, session_id: &str) -> DatabaseResult<bool> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM chat_logs WHERE session_id = ? AND source IN ('faq', 'llm'))",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(found != 0)
    }

    pub async fn count(&self) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chat_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_sessions(&self) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(DISTINCT session_id) FROM chat_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn latest_activity(&self) -> DatabaseResult<Option<String>> {
        let latest = sqlx::query_scalar::<_, Option<String>>("SELECT MAX(created_at) FROM chat_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(latest)
    }

    /// Counts for the admin dashboard, combining the FAQ and chat log tables.
    pub async fn dashboard_stats(&self) -> DatabaseResult<DashboardStats> {
        let (faqs, categories) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*),
                   COUNT(DISTINCT CASE WHEN trim(category) != '' THEN category END)
            FROM knowledge_base
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardStats {
            faqs,
            chats: self.count().await?,
            sessions: self.count_sessions().await?,
            categories,
            latest_activity: self.latest_activity().await?,
        })
    }

    /// Delete every logged turn and return how many were removed.
    pub async fn clear(&self) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM chat_logs")
            .execute(&self.pool)
            .await?;

        info!(removed = result.rows_affected(), "cleared chat logs");
        Ok(result.rows_affected())
    }
}

/// Requested page size, defaulted and capped.
pub fn effective_limit(requested: Option<u32>) -> u32 {
    match requested {
        None | Some(0) => DEFAULT_LOG_LIMIT,
        Some(limit) => limit.min(MAX_LOG_LIMIT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CreateFaqRequest, ResponseSource};
    use crate::repos::FaqRepository;
    use crate::test_support::test_pool;

    fn turn(session_id: &str, message: &str, source: ResponseSource) -> NewChatLog {
        NewChatLog {
            session_id: session_id.to_string(),
            message: message.to_string(),
            response: format!("reply to {message}"),
            source,
        }
    }

    #[test]
    fn effective_limit_defaults_and_caps() {
        assert_eq!(effective_limit(None), 500);
        assert_eq!(effective_limit(Some(0)), 500);
        assert_eq!(effective_limit(Some(25)), 25);
        assert_eq!(effective_limit(Some(5000)), 1000);
    }

    #[tokio::test]
    async fn list_returns_newest_first_with_filters() {
        let (pool, _dir) = test_pool().await;
        let repo = ChatLogRepository::new(pool);

        repo.append(&turn("alpha", "How do I apply?", ResponseSource::Faq))
            .await
            .unwrap();
        repo.append(&turn("beta", "Library hours?", ResponseSource::Llm))
            .await
            .unwrap();
        repo.append(&turn("alpha", "What about fees?", ResponseSource::Llm))
            .await
            .unwrap();

        let all = repo.list(&ChatLogFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].message, "What about fees?");

        let alpha = repo
            .list(&ChatLogFilter {
                session_id: Some("alpha".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(alpha.len(), 2);
        assert!(alpha.iter().all(|log| log.session_id == "alpha"));

        let search = repo
            .list(&ChatLogFilter {
                search: Some("LIBRARY".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(search.len(), 1);
        assert_eq!(search[0].source, "llm");

        let limited = repo
            .list(&ChatLogFilter {
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn recent_for_session_is_oldest_first_and_bounded() {
        let (pool, _dir) = test_pool().await;
        let repo = ChatLogRepository::new(pool);

        for message in ["one", "two", "three"] {
            repo.append(&turn("s1", message, ResponseSource::Llm))
                .await
                .unwrap();
        }
        repo.append(&turn("s2", "other", ResponseSource::Llm))
            .await
            .unwrap();

        let recent = repo.recent_for_session("s1", 2).await.unwrap();
        let messages: Vec<_> = recent.iter().map(|log| log.message.as_str()).collect();
        assert_eq!(messages, vec!["two", "three"]);
        assert!(repo.recent_for_session("s1", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn in_scope_history_ignores_greetings_and_refusals() {
        let (pool, _dir) = test_pool().await;
        let repo = ChatLogRepository::new(pool);

        repo.append(&turn("s1", "hello", ResponseSource::Greeting))
            .await
            .unwrap();
        repo.append(&turn("s1", "bitcoin?", ResponseSource::OutOfScope))
            .await
            .unwrap();
        assert!(!repo.session_has_in_scope_turn("s1").await.unwrap());

        repo.append(&turn("s1", "fees?", ResponseSource::Faq))
            .await
            .unwrap();
        assert!(repo.session_has_in_scope_turn("s1").await.unwrap());
    }

    #[tokio::test]
    async fn dashboard_stats_and_clear() {
        let (pool, _dir) = test_pool().await;
        let repo = ChatLogRepository::new(pool.clone());
        let faqs = FaqRepository::new(pool);

        let empty = repo.dashboard_stats().await.unwrap();
        assert_eq!(empty.faqs, 0);
        assert!(empty.latest_activity.is_none());

        faqs.create(&CreateFaqRequest {
            category: "Fees".into(),
            question: "What are the fees?".into(),
            answer: "See the schedule.".into(),
            keywords: None,
        })
        .await
        .unwrap();
        repo.append(&turn("a", "hi", ResponseSource::Greeting))
            .await
            .unwrap();
        repo.append(&turn("b", "fees", ResponseSource::Faq))
            .await
            .unwrap();

        let stats = repo.dashboard_stats().await.unwrap();
        assert_eq!(stats.faqs, 1);
        assert_eq!(stats.categories, 1);
        assert_eq!(stats.chats, 2);
        assert_eq!(stats.sessions, 2);
        assert!(stats.latest_activity.is_some());

        assert_eq!(repo.clear().await.unwrap(), 2);
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
