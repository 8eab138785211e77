//! # SmartAssist Knowledge Crate
//!
//! Text analysis behind the assistant: scoring stored FAQ entries against a
//! visitor's message, recognising greetings, and deciding whether a message
//! belongs to the university domain at all.
//!
//! Everything here is pure and synchronous. Callers fetch the FAQ entries and
//! the session history; this crate only decides.

pub mod matcher;
pub mod responses;
pub mod router;
pub mod text;

pub use matcher::{best_match, score, KnowledgeMatcher, MatchCandidate, MatchScore, ScoredMatch};
pub use router::{detect_greeting, is_follow_up, is_in_scope, Greeting};
pub use text::{normalize, similarity_percent, tokenize, words};
