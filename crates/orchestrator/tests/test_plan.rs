//! Integration tests for the orchestrator crate.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use async_trait::async_trait;
use httpmock::prelude::*;
use serial_test::serial;
use smartassist_config::{AppConfig, OrchestratorConfig, ProviderConfig};
use smartassist_orchestrator::{
    ChatMessage, Completion, CompletionProvider, CompletionRequest, OpenAiCompatibleProvider,
    Orchestrator, OrchestratorError,
};

struct DummyProvider {
    name: &'static str,
    reply: Option<&'static str>,
    calls: AtomicUsize,
}

impl DummyProvider {
    fn succeeding(name: &'static str, reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply: Some(reply),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for DummyProvider {
    async fn complete(&self, _request: &CompletionRequest) -> Result<Completion, OrchestratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Some(reply) => Ok(Completion {
                provider: self.name.to_string(),
                model: "dummy".to_string(),
                content: Some(reply.to_string()),
            }),
            None => Err(OrchestratorError::ProviderStatus {
                provider: self.name.to_string(),
                status: 500,
                message: "boom".to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        self.name
    }
}

fn dyn_provider(provider: &Arc<DummyProvider>) -> Arc<dyn CompletionProvider> {
    provider.clone()
}

fn provider_config(name: &str, base_url: &str) -> ProviderConfig {
    ProviderConfig {
        name: name.to_string(),
        base_url: base_url.to_string(),
        model: format!("{name}-model"),
        api_key: Some(format!("{name}-key")),
        api_key_env: None,
        referer: None,
        title: None,
    }
}

fn config_with_providers(providers: Vec<ProviderConfig>) -> AppConfig {
    let mut config = AppConfig::default();
    config.orchestrator.providers = providers;
    config.orchestrator.request_timeout_seconds = 2;
    config
}

fn conversation() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system("You are GSU SmartAssist."),
        ChatMessage::user("When does the semester start?"),
    ]
}

#[tokio::test]
async fn complete_without_providers_reports_no_providers() {
    let orchestrator = Orchestrator::with_providers(OrchestratorConfig::default(), Vec::new());

    assert!(!orchestrator.is_configured());
    let error = orchestrator
        .complete(conversation())
        .await
        .expect_err("no providers should fail");
    assert!(matches!(error, OrchestratorError::NoProviders));
}

#[tokio::test]
async fn complete_fails_over_to_next_provider() {
    let first = DummyProvider::failing("first");
    let second = DummyProvider::succeeding("second", "Semester starts in August.");
    let third = DummyProvider::succeeding("third", "unused");

    let orchestrator = Orchestrator::with_providers(
        OrchestratorConfig::default(),
        vec![dyn_provider(&first), dyn_provider(&second), dyn_provider(&third)],
    );

    let completion = orchestrator
        .complete(conversation())
        .await
        .expect("second provider should answer");

    assert_eq!(completion.provider, "second");
    assert_eq!(completion.content.as_deref(), Some("Semester starts in August."));
    assert_eq!(first.calls(), 1);
    assert_eq!(second.calls(), 1);
    assert_eq!(third.calls(), 0);
}

#[tokio::test]
async fn complete_reports_attempts_when_every_provider_fails() {
    let orchestrator = Orchestrator::with_providers(
        OrchestratorConfig::default(),
        vec![
            dyn_provider(&DummyProvider::failing("a")),
            dyn_provider(&DummyProvider::failing("b")),
        ],
    );

    let error = orchestrator
        .complete(conversation())
        .await
        .expect_err("all providers fail");
    assert!(matches!(error, OrchestratorError::AllProvidersFailed { attempts: 2 }));
}

#[test]
#[serial]
fn bootstrap_skips_providers_without_keys() {
    std::env::remove_var("SMARTASSIST_TEST_MISSING_KEY");

    let mut keyless = provider_config("keyless", "http://localhost:1");
    keyless.api_key = None;
    keyless.api_key_env = Some("SMARTASSIST_TEST_MISSING_KEY".to_string());

    let config = config_with_providers(vec![
        keyless,
        provider_config("keyed", "http://localhost:2"),
    ]);

    let orchestrator = Orchestrator::new(&config)
        .bootstrap()
        .expect("bootstrap should succeed");

    assert_eq!(orchestrator.provider_names(), vec!["keyed".to_string()]);
}

#[test]
#[serial]
fn bootstrap_reads_keys_from_named_environment_variable() {
    std::env::set_var("SMARTASSIST_TEST_PRESENT_KEY", "sk-test");

    let mut from_env = provider_config("from-env", "http://localhost:1");
    from_env.api_key = None;
    from_env.api_key_env = Some("SMARTASSIST_TEST_PRESENT_KEY".to_string());

    let orchestrator = Orchestrator::new(&config_with_providers(vec![from_env]))
        .bootstrap()
        .expect("bootstrap should succeed");
    std::env::remove_var("SMARTASSIST_TEST_PRESENT_KEY");

    assert!(orchestrator.is_configured());
    assert_eq!(orchestrator.provider_names(), vec!["from-env".to_string()]);
}

#[tokio::test]
async fn openai_provider_posts_chat_completion_request() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("authorization", "Bearer primary-key")
                .header("X-Title", "GSU SmartAssist")
                .json_body_partial(
                    r#"{"model":"primary-model","temperature":0.7,"max_tokens":500}"#,
                );
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "model": "primary-model-0613",
                    "choices": [{
                        "message": {"role": "assistant", "content": "  Registration opens in July.  "}
                    }]
                }));
        })
        .await;

    let mut primary = provider_config("primary", &server.base_url());
    primary.title = Some("GSU SmartAssist".to_string());

    let orchestrator = Orchestrator::new(&config_with_providers(vec![primary]))
        .bootstrap()
        .expect("bootstrap should succeed");

    let completion = orchestrator
        .complete(conversation())
        .await
        .expect("completion should succeed");

    mock.assert_async().await;
    assert_eq!(completion.provider, "primary");
    assert_eq!(completion.model, "primary-model-0613");
    assert_eq!(completion.content.as_deref(), Some("Registration opens in July."));
}

#[tokio::test]
async fn openai_provider_failure_falls_back_to_second_endpoint() {
    let failing = MockServer::start_async().await;
    let healthy = MockServer::start_async().await;

    let failing_mock = failing
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(401)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"error": {"message": "invalid api key"}}));
        })
        .await;
    let healthy_mock = healthy
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "choices": [{"message": {"content": "The library opens at 8am."}}]
                }));
        })
        .await;

    let config = config_with_providers(vec![
        provider_config("openai", &failing.base_url()),
        provider_config("openrouter", &healthy.base_url()),
    ]);
    let orchestrator = Orchestrator::new(&config).bootstrap().expect("bootstrap");

    let completion = orchestrator
        .complete(conversation())
        .await
        .expect("second provider should answer");

    failing_mock.assert_async().await;
    healthy_mock.assert_async().await;
    assert_eq!(completion.provider, "openrouter");
    assert_eq!(completion.model, "openrouter-model");
    assert_eq!(completion.content.as_deref(), Some("The library opens at 8am."));
}

#[tokio::test]
async fn openai_provider_maps_error_status_and_message() {
    let server = MockServer::start_async().await;

    let _mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(429)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"error": {"message": "rate limited"}}));
        })
        .await;

    let provider = OpenAiCompatibleProvider::new(
        &provider_config("openai", &server.base_url()),
        "key".to_string(),
        Duration::from_secs(2),
    )
    .expect("provider should build");

    let request = CompletionRequest {
        messages: conversation(),
        temperature: 0.7,
        max_tokens: 500,
    };
    let error = provider
        .complete(&request)
        .await
        .expect_err("429 should fail");

    match error {
        OrchestratorError::ProviderStatus {
            provider,
            status,
            message,
        } => {
            assert_eq!(provider, "openai");
            assert_eq!(status, 429);
            assert_eq!(message, "rate limited");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn openai_provider_treats_blank_content_as_empty_completion() {
    let server = MockServer::start_async().await;

    let _mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"choices": [{"message": {"content": "   "}}]}));
        })
        .await;

    let provider = OpenAiCompatibleProvider::new(
        &provider_config("openai", &server.base_url()),
        "key".to_string(),
        Duration::from_secs(2),
    )
    .expect("provider should build");

    let completion = provider
        .complete(&CompletionRequest {
            messages: conversation(),
            temperature: 0.7,
            max_tokens: 500,
        })
        .await
        .expect("blank content is still a successful call");

    assert!(completion.content.is_none());
    assert_eq!(completion.model, "openai-model");
}
