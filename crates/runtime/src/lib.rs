use std::sync::Arc;

use anyhow::{Context, Result};
use smartassist_auth::Authenticator;
use smartassist_config::AppConfig;
use smartassist_database::{initialize_database, seed_knowledge_base};
use smartassist_orchestrator::Orchestrator;
use sqlx::SqlitePool;
use tracing::{info, warn};

pub const DEFAULT_ADMIN_NAME: &str = "GSU Administrator";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@gsu.ac.zw";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123!";

pub mod telemetry {
    use anyhow::Result;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub authenticator: Authenticator,
    pub orchestrator: Arc<Orchestrator>,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        let authenticator = Authenticator::new(db_pool.clone(), config.auth.clone());
        let purged = authenticator
            .purge_expired_sessions()
            .await
            .context("failed to purge expired sessions")?;
        if purged > 0 {
            info!(purged, "removed expired sessions");
        }

        let orchestrator = Arc::new(
            Orchestrator::new(config)
                .bootstrap()
                .context("failed to bootstrap orchestrator")?,
        );

        if orchestrator.is_configured() {
            info!(providers = ?orchestrator.provider_names(), "orchestrator ready");
        } else {
            warn!("no completion providers configured, unmatched questions get the static reply");
        }

        let services = Self {
            db_pool,
            authenticator,
            orchestrator,
        };

        if config.database.seed_on_start {
            services.seed().await?;
        }

        Ok(services)
    }

    /// Ensure the default administrator and the sample FAQs exist.
    pub async fn seed(&self) -> Result<SeedSummary> {
        let admin = self
            .authenticator
            .upsert_admin(DEFAULT_ADMIN_NAME, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD)
            .await
            .context("failed to seed administrator")?;

        let faqs = seed_knowledge_base(&self.db_pool)
            .await
            .context("failed to seed knowledge base")?;

        info!(admin = %admin.email, faqs, "database seeded");
        Ok(SeedSummary {
            admin_email: admin.email,
            faqs,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub admin_email: String,
    pub faqs: usize,
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
