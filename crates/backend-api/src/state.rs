use std::{net::IpAddr, num::NonZeroU32, sync::Arc, time::Duration};

use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter,
};
use smartassist_auth::{AuthSession, Authenticator, User};
use smartassist_config::{AppConfig, RateLimitConfig};
use smartassist_knowledge::KnowledgeMatcher;
use smartassist_orchestrator::Orchestrator;
use sqlx::SqlitePool;
use tracing::debug;

use crate::ApiError;

/// Tracked clients before stale limiter entries are swept.
const LIMITER_SWEEP_THRESHOLD: usize = 10_000;

#[derive(Clone)]
pub struct AppState {
    db_pool: SqlitePool,
    authenticator: Authenticator,
    orchestrator: Arc<Orchestrator>,
    matcher: KnowledgeMatcher,
    chat_limiter: ChatRateLimiter,
    cookie_secure: bool,
}

impl AppState {
    pub fn new(
        db_pool: SqlitePool,
        authenticator: Authenticator,
        orchestrator: Arc<Orchestrator>,
        config: &AppConfig,
    ) -> Self {
        Self {
            db_pool,
            authenticator,
            orchestrator,
            matcher: KnowledgeMatcher::new(config.knowledge.match_threshold),
            chat_limiter: ChatRateLimiter::new(&config.rate_limit),
            cookie_secure: config.auth.cookie_secure,
        }
    }

    pub fn db_pool(&self) -> &SqlitePool {
        &self.db_pool
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn matcher(&self) -> &KnowledgeMatcher {
        &self.matcher
    }

    pub fn chat_limiter(&self) -> &ChatRateLimiter {
        &self.chat_limiter
    }

    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    pub async fn authenticate(&self, token: &str) -> Result<(User, AuthSession), ApiError> {
        self.authenticator
            .authenticate_token(token)
            .await
            .map_err(ApiError::from)
    }
}

/// Per-client quota for the public chat endpoint. A limit of zero disables it.
#[derive(Clone)]
pub struct ChatRateLimiter {
    limiter: Option<Arc<DefaultKeyedRateLimiter<String>>>,
    trusted_proxies: Arc<[IpAddr]>,
}

impl ChatRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let limiter = NonZeroU32::new(config.chat_per_minute)
            .map(|limit| Arc::new(RateLimiter::keyed(Quota::per_minute(limit))));
        Self {
            limiter,
            trusted_proxies: config.trusted_proxies.clone().into(),
        }
    }

    /// Peers allowed to name the client through forwarding headers.
    pub fn trusted_proxies(&self) -> &[IpAddr] {
        &self.trusted_proxies
    }

    /// Take one request from the client's quota, or report how long until one frees up.
    pub fn check(&self, client: &str) -> Result<(), Duration> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };

        if limiter.len() > LIMITER_SWEEP_THRESHOLD {
            limiter.retain_recent();
        }

        limiter.check_key(&client.to_string()).map_err(|not_until| {
            let wait = not_until.wait_time_from(DefaultClock::default().now());
            debug!(client, wait_ms = wait.as_millis() as u64, "chat rate limit exceeded");
            wait
        })
    }
}
