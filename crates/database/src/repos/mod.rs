//! Database repository implementations

pub mod chat_log_repository;
pub mod faq_repository;

pub use chat_log_repository::*;
pub use faq_repository::*;
