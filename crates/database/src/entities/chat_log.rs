//! Chat log entity definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatLog {
    pub id: i64,
    pub session_id: String,
    pub message: String,
    pub response: String,
    pub source: String,
    pub created_at: String,
}

/// Which branch of the assistant produced a logged response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Greeting,
    Faq,
    OutOfScope,
    Llm,
    Fallback,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Greeting => "greeting",
            ResponseSource::Faq => "faq",
            ResponseSource::OutOfScope => "out_of_scope",
            ResponseSource::Llm => "llm",
            ResponseSource::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct NewChatLog {
    pub session_id: String,
    pub message: String,
    pub response: String,
    pub source: ResponseSource,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatLogFilter {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Aggregate figures shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub faqs: i64,
    pub chats: i64,
    pub sessions: i64,
    pub categories: i64,
    pub latest_activity: Option<String>,
}
