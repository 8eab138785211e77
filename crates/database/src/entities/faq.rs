//! Knowledge base (FAQ) entity definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FaqEntry {
    pub id: i64,
    pub category: String,
    pub question: String,
    pub answer: String,
    pub keywords: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl FaqEntry {
    /// Comma separated keyword phrases, trimmed, without empty items.
    pub fn keyword_list(&self) -> Vec<&str> {
        self.keywords
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|keyword| !keyword.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFaqRequest {
    pub category: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub keywords: Option<String>,
}

/// Partial update. `keywords` distinguishes "absent" (`None`) from "cleared" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateFaqRequest {
    pub category: Option<String>,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub keywords: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FaqFilter {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(keywords: Option<&str>) -> FaqEntry {
        FaqEntry {
            id: 1,
            category: "Fees".into(),
            question: "What are the current tuition fees?".into(),
            answer: "See the fee schedule.".into(),
            keywords: keywords.map(str::to_string),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn keyword_list_splits_and_trims() {
        let faq = entry(Some(" fees, tuition ,, payment "));
        assert_eq!(faq.keyword_list(), vec!["fees", "tuition", "payment"]);
        assert!(entry(None).keyword_list().is_empty());
    }
}
