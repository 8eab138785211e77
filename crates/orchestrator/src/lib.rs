use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use smartassist_config::{AppConfig, OrchestratorConfig};

mod provider;

pub use provider::OpenAiCompatibleProvider;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("no completion providers are configured")]
    NoProviders,
    #[error("all {attempts} completion providers failed")]
    AllProvidersFailed { attempts: usize },
    #[error("failed to initialise provider {identifier}: {source}")]
    ProviderInit {
        identifier: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("provider http request failed: {0}")]
    ProviderHttp(#[from] reqwest::Error),
    #[error("provider {provider} returned status {status}: {message}")]
    ProviderStatus {
        provider: String,
        status: u16,
        message: String,
    },
    #[error("invalid provider response: {0}")]
    ProviderResponse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub provider: String,
    pub model: String,
    /// `None` when the provider answered without usable text.
    pub content: Option<String>,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, OrchestratorError>;

    fn name(&self) -> &str;
}

/// Ordered list of completion providers tried one after another.
pub struct Orchestrator {
    config: OrchestratorConfig,
    providers: Vec<Arc<dyn CompletionProvider>>,
}

impl Orchestrator {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: config.orchestrator.clone(),
            providers: Vec::new(),
        }
    }

    /// Build an orchestrator around already constructed providers.
    pub fn with_providers(
        config: OrchestratorConfig,
        providers: Vec<Arc<dyn CompletionProvider>>,
    ) -> Self {
        Self { config, providers }
    }

    /// Register every configured provider that has an API key, in configured order.
    pub fn bootstrap(mut self) -> Result<Self, OrchestratorError> {
        let timeout = Duration::from_secs(self.config.request_timeout_seconds.max(1));
        let mut providers: Vec<Arc<dyn CompletionProvider>> = Vec::new();

        for provider in &self.config.providers {
            let Some(api_key) = provider.resolve_api_key() else {
                warn!(
                    provider = %provider.name,
                    env = provider.api_key_env.as_deref().unwrap_or("-"),
                    "skipping completion provider without api key"
                );
                continue;
            };

            let source = if provider.api_key.as_deref().is_some_and(|key| !key.trim().is_empty()) {
                "config"
            } else {
                "env"
            };
            debug!(provider = %provider.name, model = %provider.model, source, "registering completion provider");

            providers.push(Arc::new(OpenAiCompatibleProvider::new(
                provider, api_key, timeout,
            )?));
        }

        info!(count = providers.len(), "completion providers initialised");
        self.providers = providers;
        Ok(self)
    }

    pub fn is_configured(&self) -> bool {
        !self.providers.is_empty()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers
            .iter()
            .map(|provider| provider.name().to_string())
            .collect()
    }

    pub fn system_prompt(&self) -> &str {
        &self.config.system_prompt
    }

    pub fn history_turns(&self) -> u32 {
        self.config.history_turns
    }

    /// Send the conversation to each provider in turn until one succeeds.
    pub async fn complete(&self, messages: Vec<ChatMessage>) -> Result<Completion, OrchestratorError> {
        if self.providers.is_empty() {
            return Err(OrchestratorError::NoProviders);
        }

        let request = CompletionRequest {
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let mut attempts = 0;
        for provider in &self.providers {
            attempts += 1;
            match provider.complete(&request).await {
                Ok(completion) => {
                    debug!(provider = %completion.provider, attempts, "completion succeeded");
                    return Ok(completion);
                }
                Err(error) => {
                    warn!(provider = %provider.name(), %error, "completion provider failed");
                }
            }
        }

        Err(OrchestratorError::AllProvidersFailed { attempts })
    }
}
