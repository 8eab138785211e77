//! Scores FAQ entries against a message and picks the best answer.

use std::collections::HashSet;

use serde::Serialize;
use smartassist_database::FaqEntry;
use tracing::debug;

use crate::text::{normalize, similarity_percent, tokenize};

pub const OVERLAP_WEIGHT: f64 = 0.55;
pub const SIMILARITY_WEIGHT: f64 = 0.35;
pub const CONTAINMENT_BONUS: f64 = 0.10;
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Anything with a question and keyword phrases can be matched.
pub trait MatchCandidate {
    fn question(&self) -> &str;
    fn keywords(&self) -> Vec<&str>;
}

impl MatchCandidate for FaqEntry {
    fn question(&self) -> &str {
        &self.question
    }

    fn keywords(&self) -> Vec<&str> {
        self.keyword_list()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchScore {
    /// Share of the message's tokens found in the entry, 0 to 1.
    pub overlap: f64,
    /// Whole-string similarity of message and question, 0 to 1.
    pub similarity: f64,
    pub containment: bool,
    pub total: f64,
}

impl MatchScore {
    fn is_grounded(&self) -> bool {
        self.overlap > 0.0 || self.containment
    }
}

#[derive(Debug)]
pub struct ScoredMatch<'a, C> {
    pub entry: &'a C,
    pub score: MatchScore,
}

struct PreparedMessage {
    tokens: Vec<String>,
    normalized: String,
}

impl PreparedMessage {
    fn new(message: &str) -> Self {
        Self {
            tokens: tokenize(message),
            normalized: normalize(message),
        }
    }

    fn score<C: MatchCandidate + ?Sized>(&self, candidate: &C) -> MatchScore {
        if self.tokens.is_empty() {
            return MatchScore {
                overlap: 0.0,
                similarity: 0.0,
                containment: false,
                total: 0.0,
            };
        }

        let keywords = candidate.keywords();
        let mut entry_tokens: HashSet<String> = tokenize(candidate.question()).into_iter().collect();
        for keyword in &keywords {
            entry_tokens.extend(tokenize(keyword));
        }

        let shared = self
            .tokens
            .iter()
            .filter(|token| entry_tokens.contains(*token))
            .count();
        let overlap = shared as f64 / self.tokens.len() as f64;

        let question = normalize(candidate.question());
        let similarity = similarity_percent(&self.normalized, &question) / 100.0;

        let containment = self.contains_either_way(&question)
            || keywords
                .iter()
                .map(|keyword| normalize(keyword))
                .any(|phrase| self.contains_phrase(&phrase));

        let mut total = OVERLAP_WEIGHT * overlap + SIMILARITY_WEIGHT * similarity;
        if containment {
            total += CONTAINMENT_BONUS;
        }

        MatchScore {
            overlap,
            similarity,
            containment,
            total,
        }
    }

    fn contains_either_way(&self, question: &str) -> bool {
        !self.normalized.is_empty()
            && !question.is_empty()
            && (question.contains(&self.normalized) || self.normalized.contains(question))
    }

    /// Whole-word containment of a normalized phrase.
    fn contains_phrase(&self, phrase: &str) -> bool {
        !phrase.is_empty() && format!(" {} ", self.normalized).contains(&format!(" {phrase} "))
    }
}

/// Score one entry against a message.
pub fn score<C: MatchCandidate + ?Sized>(message: &str, candidate: &C) -> MatchScore {
    PreparedMessage::new(message).score(candidate)
}

/// Highest scoring entry at or above `threshold`. Ties keep the earlier entry.
pub fn best_match<'a, C: MatchCandidate>(
    message: &str,
    entries: &'a [C],
    threshold: f64,
) -> Option<ScoredMatch<'a, C>> {
    let prepared = PreparedMessage::new(message);
    if prepared.tokens.is_empty() {
        return None;
    }

    let mut best: Option<ScoredMatch<'a, C>> = None;
    for entry in entries {
        let score = prepared.score(entry);
        if !score.is_grounded() {
            continue;
        }
        if best.as_ref().map_or(true, |current| score.total > current.score.total) {
            best = Some(ScoredMatch { entry, score });
        }
    }

    best.filter(|candidate| candidate.score.total >= threshold)
}

/// Matcher bound to a configured acceptance threshold.
#[derive(Debug, Clone, Copy)]
pub struct KnowledgeMatcher {
    threshold: f64,
}

impl Default for KnowledgeMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl KnowledgeMatcher {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn find<'a, C: MatchCandidate>(
        &self,
        message: &str,
        entries: &'a [C],
    ) -> Option<ScoredMatch<'a, C>> {
        let found = best_match(message, entries, self.threshold);
        if let Some(found) = &found {
            debug!(
                total = found.score.total,
                overlap = found.score.overlap,
                similarity = found.score.similarity,
                "knowledge base match"
            );
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Faq {
        question: &'static str,
        keywords: &'static str,
    }

    impl MatchCandidate for Faq {
        fn question(&self) -> &str {
            self.question
        }

        fn keywords(&self) -> Vec<&str> {
            self.keywords
                .split(',')
                .map(str::trim)
                .filter(|keyword| !keyword.is_empty())
                .collect()
        }
    }

    fn faqs() -> Vec<Faq> {
        vec![
            Faq {
                question: "How do I apply for a programme at GSU?",
                keywords: "apply, admission, application",
            },
            Faq {
                question: "What are the current tuition fees?",
                keywords: "fees, tuition, payment",
            },
            Faq {
                question: "What programmes are available at GSU?",
                keywords: "programmes, courses, faculties",
            },
        ]
    }

    #[test]
    fn reworded_question_matches_its_entry() {
        let entries = faqs();
        let found = best_match(
            "What programmes are currently available at GSU?",
            &entries,
            DEFAULT_THRESHOLD,
        )
        .expect("should match");

        assert_eq!(found.entry.question, "What programmes are available at GSU?");
        assert!((found.score.overlap - 0.75).abs() < 1e-9);
        assert!(found.score.containment);
        assert!(found.score.total > 0.8);
    }

    #[test]
    fn single_keyword_message_matches_through_containment() {
        let entries = faqs();
        let found = best_match("fees", &entries, DEFAULT_THRESHOLD).expect("should match");
        assert_eq!(found.entry.question, "What are the current tuition fees?");
        assert!(found.score.containment);
    }

    #[test]
    fn unrelated_message_does_not_match() {
        let entries = faqs();
        assert!(best_match("What is the Bitcoin price today?", &entries, DEFAULT_THRESHOLD).is_none());
    }

    #[test]
    fn stop_word_only_message_never_matches() {
        let entries = faqs();
        assert!(best_match("what is the", &entries, 0.0).is_none());
        assert_eq!(score("is it", &entries[0]).total, 0.0);
    }

    #[test]
    fn similarity_alone_is_not_enough() {
        let entries = vec![Faq {
            question: "Where is the library?",
            keywords: "",
        }];
        let result = score("Where is the lobby?", &entries[0]);
        assert_eq!(result.overlap, 0.0);
        assert!(!result.containment);
        assert!(best_match("Where is the lobby?", &entries, 0.0).is_none());
    }

    #[test]
    fn threshold_is_respected() {
        let entries = faqs();
        let found = best_match("tuition payment plans", &entries, DEFAULT_THRESHOLD);
        let total = score("tuition payment plans", &entries[1]).total;

        assert!(total > 0.0);
        assert!(best_match("tuition payment plans", &entries, 1.0).is_none());
        assert_eq!(found.is_some(), total >= DEFAULT_THRESHOLD);
    }

    #[test]
    fn keyword_phrase_must_match_whole_words() {
        let entry = Faq {
            question: "Who do I contact about ICT problems?",
            keywords: "ict",
        };
        assert!(score("ict help desk", &entry).containment);
        assert!(!score("strict rules", &entry).containment);
    }

    #[test]
    fn ties_keep_the_earliest_entry() {
        let entries = vec![
            Faq {
                question: "Library opening hours",
                keywords: "library",
            },
            Faq {
                question: "Library opening hours",
                keywords: "library",
            },
        ];
        let found = best_match("library opening hours", &entries, 0.0).expect("should match");
        assert!(std::ptr::eq(found.entry, &entries[0]));
    }

    #[test]
    fn matcher_clamps_threshold() {
        assert_eq!(KnowledgeMatcher::new(4.0).threshold(), 1.0);
        assert_eq!(KnowledgeMatcher::new(-1.0).threshold(), 0.0);
        assert_eq!(KnowledgeMatcher::default().threshold(), DEFAULT_THRESHOLD);
    }

    #[test]
    fn faq_entries_are_match_candidates() {
        let entry = FaqEntry {
            id: 1,
            category: "Support".into(),
            question: "How do I contact ICTS support?".into(),
            answer: "Email support@gsu.ac.zw".into(),
            keywords: Some("icts, tech, help, support".into()),
            created_at: String::new(),
            updated_at: String::new(),
        };
        let found = KnowledgeMatcher::default()
            .find("I need ICTS help", std::slice::from_ref(&entry))
            .expect("should match");
        assert_eq!(found.entry.id, 1);
    }
}
