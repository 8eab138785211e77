pub mod chat;
pub mod error;
pub mod faq;
pub mod logs;

pub use error::*;
