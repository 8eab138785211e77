use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "smartassist.toml",
    "config/smartassist.toml",
    "crates/config/smartassist.toml",
    "../smartassist.toml",
    "../config/smartassist.toml",
    "../crates/config/smartassist.toml",
];

/// Longest accepted session lifetime: ten years.
pub const MAX_SESSION_TTL_SECONDS: u64 = 10 * 365 * 86_400;

const DEFAULT_SYSTEM_PROMPT: &str = "You are GSU SmartAssist, an intelligent university chatbot for Gwanda State University (GSU). Help students, staff, and applicants with admissions, programmes, fees, academic calendar, library services, and ICT support.";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Insert the sample FAQs and the default administrator on startup.
    #[serde(default)]
    pub seed_on_start: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://smartassist.db".to_string(),
            max_connections: 10,
            seed_on_start: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_session_ttl")]
    pub session_ttl_seconds: u64,
    #[serde(default)]
    pub cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: Self::default_session_ttl(),
            cookie_secure: false,
        }
    }
}

impl AuthConfig {
    const fn default_session_ttl() -> u64 {
        86_400
    }
}

/// Settings for the chat-completion fallback used when no FAQ answers a question.
///
/// ```
/// use smartassist_config::OrchestratorConfig;
///
/// let orchestrator = OrchestratorConfig::default();
/// assert_eq!(orchestrator.providers.len(), 2);
/// assert_eq!(orchestrator.providers[0].name, "openai");
/// assert_eq!(orchestrator.max_tokens, 500);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    #[serde(default = "OrchestratorConfig::default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "OrchestratorConfig::default_temperature")]
    pub temperature: f32,
    #[serde(default = "OrchestratorConfig::default_max_tokens")]
    pub max_tokens: u32,
    /// Number of earlier turns of the same chat session replayed to the provider.
    #[serde(default = "OrchestratorConfig::default_history_turns")]
    pub history_turns: u32,
    #[serde(default = "OrchestratorConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Providers in failover order.
    #[serde(default = "OrchestratorConfig::default_providers")]
    pub providers: Vec<ProviderConfig>,
}

impl OrchestratorConfig {
    fn default_system_prompt() -> String {
        DEFAULT_SYSTEM_PROMPT.to_string()
    }

    const fn default_temperature() -> f32 {
        0.7
    }

    const fn default_max_tokens() -> u32 {
        500
    }

    const fn default_history_turns() -> u32 {
        4
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    fn default_providers() -> Vec<ProviderConfig> {
        vec![
            ProviderConfig {
                name: "openai".to_string(),
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-3.5-turbo".to_string(),
                api_key: None,
                api_key_env: Some("OPENAI_API_KEY".to_string()),
                referer: None,
                title: None,
            },
            ProviderConfig {
                name: "openrouter".to_string(),
                base_url: "https://openrouter.ai/api/v1".to_string(),
                model: "openai/gpt-4o-mini".to_string(),
                api_key: None,
                api_key_env: Some("OPENROUTER_API_KEY".to_string()),
                referer: None,
                title: Some("GSU SmartAssist".to_string()),
            },
        ]
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            system_prompt: Self::default_system_prompt(),
            temperature: Self::default_temperature(),
            max_tokens: Self::default_max_tokens(),
            history_turns: Self::default_history_turns(),
            request_timeout_seconds: Self::default_request_timeout(),
            providers: Self::default_providers(),
        }
    }
}

/// One OpenAI-compatible chat-completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is unset.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub referer: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl ProviderConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                self.api_key_env
                    .as_deref()
                    .and_then(|name| std::env::var(name).ok())
                    .filter(|key| !key.trim().is_empty())
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Minimum weighted score, between 0 and 1, for an FAQ entry to answer a message.
    #[serde(default = "KnowledgeConfig::default_match_threshold")]
    pub match_threshold: f64,
}

impl KnowledgeConfig {
    const fn default_match_threshold() -> f64 {
        0.5
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            match_threshold: Self::default_match_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "RateLimitConfig::default_chat_per_minute")]
    pub chat_per_minute: u32,
    /// Reverse proxies whose `X-Forwarded-For` and `X-Real-IP` headers are believed.
    /// Requests from any other peer are keyed on the peer address.
    #[serde(default)]
    pub trusted_proxies: Vec<IpAddr>,
}

impl RateLimitConfig {
    const fn default_chat_per_minute() -> u32 {
        60
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            chat_per_minute: Self::default_chat_per_minute(),
            trusted_proxies: Vec::new(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use smartassist_config::load;
///
/// std::env::remove_var("SMARTASSIST_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let session_ttl = defaults.auth.session_ttl_seconds as i64;

    let builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("database.seed_on_start", defaults.database.seed_on_start)?
        .set_default("auth.session_ttl_seconds", session_ttl)?
        .set_default("knowledge.match_threshold", defaults.knowledge.match_threshold)?
        .set_default(
            "rate_limit.chat_per_minute",
            i64::from(defaults.rate_limit.chat_per_minute),
        )?;

    let mut builder = builder;
    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("SMARTASSIST_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via SMARTASSIST_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(
        config::Environment::with_prefix("SMARTASSIST").separator("__"),
    );

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    config.auth.session_ttl_seconds = config.auth.session_ttl_seconds.min(MAX_SESSION_TTL_SECONDS);
    config.knowledge.match_threshold = config.knowledge.match_threshold.clamp(0.0, 1.0);

    debug!(
        http = ?config.http,
        database = ?config.database,
        providers = config.orchestrator.providers.len(),
        "loaded backend configuration"
    );
    Ok(config)
}
