//! Answering a visitor's chat message.
//!
//! A message is answered by the first branch that applies: a greeting prompt,
//! a stored FAQ answer, the out-of-scope notice, or the language model. Every
//! answered turn is appended to the chat log, which also feeds follow-up
//! detection and the history replayed to the model.

use smartassist_database::{ChatLogRepository, FaqRepository, NewChatLog, ResponseSource};
use smartassist_knowledge::{detect_greeting, is_follow_up, is_in_scope, responses};
use smartassist_orchestrator::{ChatMessage, OrchestratorError};
use tracing::{debug, error, info, warn};

use crate::error::FieldErrors;
use crate::services::ServiceError;
use crate::AppState;

pub const MAX_MESSAGE_CHARS: usize = 2000;
pub const MAX_SESSION_ID_CHARS: usize = 255;

#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub response: String,
    pub session_id: String,
    pub source: ResponseSource,
}

pub async fn respond(
    state: &AppState,
    message: Option<&str>,
    session_id: Option<&str>,
) -> Result<ChatReply, ServiceError> {
    let (message, session_id) = validate(message, session_id)?;
    let logs = ChatLogRepository::new(state.db_pool().clone());

    let (response, source) = answer(state, &logs, &message, &session_id).await?;

    logs.append(&NewChatLog {
        session_id: session_id.clone(),
        message,
        response: response.clone(),
        source,
    })
    .await?;

    info!(session = %session_id, %source, "chat turn answered");
    Ok(ChatReply {
        response,
        session_id,
        source,
    })
}

fn validate(
    message: Option<&str>,
    session_id: Option<&str>,
) -> Result<(String, String), FieldErrors> {
    let mut errors = FieldErrors::default();

    let message = errors.require("message", message);
    if message
        .as_ref()
        .is_some_and(|message| message.chars().count() > MAX_MESSAGE_CHARS)
    {
        errors.add(
            "message",
            format!("The message may not be greater than {MAX_MESSAGE_CHARS} characters."),
        );
    }

    let session_id = errors.require("session_id", session_id);
    if session_id
        .as_ref()
        .is_some_and(|session| session.chars().count() > MAX_SESSION_ID_CHARS)
    {
        errors.add(
            "session_id",
            format!("The session id may not be greater than {MAX_SESSION_ID_CHARS} characters."),
        );
    }

    match (message, session_id) {
        (Some(message), Some(session_id)) if errors.is_empty() => Ok((message, session_id)),
        _ => Err(errors),
    }
}

async fn answer(
    state: &AppState,
    logs: &ChatLogRepository,
    message: &str,
    session_id: &str,
) -> Result<(String, ResponseSource), ServiceError> {
    if let Some(greeting) = detect_greeting(message) {
        return Ok((greeting.response().to_string(), ResponseSource::Greeting));
    }

    let faqs = FaqRepository::new(state.db_pool().clone()).all().await?;
    if let Some(found) = state.matcher().find(message, &faqs) {
        debug!(faq = found.entry.id, total = found.score.total, "answered from knowledge base");
        return Ok((found.entry.answer.clone(), ResponseSource::Faq));
    }

    let in_scope = is_in_scope(message)
        || (is_follow_up(message) && logs.session_has_in_scope_turn(session_id).await?);
    if !in_scope {
        return Ok((responses::OUT_OF_SCOPE.to_string(), ResponseSource::OutOfScope));
    }

    let conversation = conversation(state, logs, message, session_id).await?;
    Ok(complete(state, conversation).await)
}

/// System prompt, the session's most recent turns, then the new message.
async fn conversation(
    state: &AppState,
    logs: &ChatLogRepository,
    message: &str,
    session_id: &str,
) -> Result<Vec<ChatMessage>, ServiceError> {
    let orchestrator = state.orchestrator();
    let history = logs
        .recent_for_session(session_id, orchestrator.history_turns())
        .await?;

    let mut messages = Vec::with_capacity(history.len() * 2 + 2);
    messages.push(ChatMessage::system(orchestrator.system_prompt()));
    for turn in history {
        messages.push(ChatMessage::user(turn.message));
        messages.push(ChatMessage::assistant(turn.response));
    }
    messages.push(ChatMessage::user(message));

    Ok(messages)
}

async fn complete(state: &AppState, conversation: Vec<ChatMessage>) -> (String, ResponseSource) {
    match state.orchestrator().complete(conversation).await {
        Ok(completion) => match completion.content {
            Some(content) => (content, ResponseSource::Llm),
            None => {
                warn!(provider = %completion.provider, "completion returned no content");
                (responses::EMPTY_COMPLETION.to_string(), ResponseSource::Fallback)
            }
        },
        Err(OrchestratorError::NoProviders) => {
            debug!("no completion providers configured");
            (responses::NOT_CONFIGURED.to_string(), ResponseSource::Fallback)
        }
        Err(err) => {
            error!(error = %err, "completion failed");
            (responses::PROVIDER_FAILURE.to_string(), ResponseSource::Fallback)
        }
    }
}
