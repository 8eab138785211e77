//! SmartAssist Database Crate
//!
//! Connection management, migrations, and repositories for the knowledge base
//! and the chat transcript log. Users and sessions are owned by the auth crate
//! but share the same schema.

use sqlx::SqlitePool;
use smartassist_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod seed;
pub mod types;

pub use connection::prepare_database;
pub use migrations::{run_migrations, MIGRATOR};
pub use seed::{sample_faqs, seed_knowledge_base};

pub use repos::{
    effective_limit, ChatLogRepository, FaqRepository, DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT,
};

pub use entities::{
    ChatLog, ChatLogFilter, CreateFaqRequest, DashboardStats, FaqEntry, FaqFilter, NewChatLog,
    ResponseSource, UpdateFaqRequest,
};

pub use types::{now_timestamp, DatabaseError, DatabaseResult};

/// Connect to the configured database and apply pending migrations.
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    pub async fn test_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 1,
            seed_on_start: false,
        };

        let pool = initialize_database(&config).await.unwrap();
        (pool, temp_dir)
    }
}
