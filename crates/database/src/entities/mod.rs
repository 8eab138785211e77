//! Domain entities for the database layer

pub mod chat_log;
pub mod faq;

pub use chat_log::{ChatLog, ChatLogFilter, DashboardStats, NewChatLog, ResponseSource};
pub use faq::{CreateFaqRequest, FaqEntry, FaqFilter, UpdateFaqRequest};
