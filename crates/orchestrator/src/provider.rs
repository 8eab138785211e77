//! OpenAI-compatible `/chat/completions` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use smartassist_config::ProviderConfig;

use crate::{ChatMessage, Completion, CompletionProvider, CompletionRequest, OrchestratorError};

/// Any endpoint speaking the OpenAI chat-completions dialect (OpenAI, OpenRouter, ...).
pub struct OpenAiCompatibleProvider {
    name: String,
    base_url: String,
    model: String,
    api_key: String,
    referer: Option<String>,
    title: Option<String>,
    http: Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        config: &ProviderConfig,
        api_key: String,
        request_timeout: Duration,
    ) -> Result<Self, OrchestratorError> {
        let http = Client::builder()
            .timeout(request_timeout)
            .user_agent("gsu-smartassist")
            .build()
            .map_err(|source| OrchestratorError::ProviderInit {
                identifier: config.name.clone(),
                source,
            })?;

        Ok(Self {
            name: config.name.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            referer: config.referer.clone(),
            title: config.title.clone(),
            http,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, OrchestratorError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let mut builder = self.http.post(url).bearer_auth(&self.api_key).json(&body);
        if let Some(referer) = &self.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.title {
            builder = builder.header("X-Title", title);
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);

            return Err(OrchestratorError::ProviderStatus {
                provider: self.name.clone(),
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&text)?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty());

        debug!(provider = %self.name, model = %self.model, empty = content.is_none(), "completion received");

        Ok(Completion {
            provider: self.name.clone(),
            model: parsed.model.unwrap_or_else(|| self.model.clone()),
            content,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}
