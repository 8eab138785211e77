pub mod admin;
pub mod auth;
pub mod chat;
pub mod docs;
pub mod faqs;
pub mod health;
pub mod pages;
