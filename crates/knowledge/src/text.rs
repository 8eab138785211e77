//! Tokenising, normalising and whole-string similarity.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("invalid separator pattern"));

/// Words that carry no meaning when comparing a question to an FAQ entry.
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "am", "an", "and", "any", "are", "as", "at", "be", "been", "but", "by", "can",
    "could", "did", "do", "does", "for", "from", "get", "had", "has", "have", "how", "i", "if",
    "in", "into", "is", "it", "its", "me", "my", "need", "of", "on", "or", "our", "please", "should",
    "so", "some", "tell", "that", "the", "their", "them", "there", "these", "they", "this",
    "those", "to", "us", "want", "was", "we", "were", "what", "when", "where", "which", "who",
    "why", "will", "with", "would", "you", "your",
];

static STOP_WORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOP_WORDS.iter().copied().collect());

/// Lowercased alphanumeric runs, in order, keeping duplicates and stop words.
pub fn words(text: &str) -> Vec<String> {
    NON_ALPHANUMERIC
        .split(&text.to_lowercase())
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// Meaningful words: no stop words, no single characters, first occurrence only.
///
/// ```
/// use smartassist_knowledge::tokenize;
///
/// assert_eq!(
///     tokenize("How do I pay my FEES? Fees, fees!"),
///     vec!["pay".to_string(), "fees".to_string()]
/// );
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    words(text)
        .into_iter()
        .filter(|word| word.chars().count() > 1)
        .filter(|word| !STOP_WORD_SET.contains(word.as_str()))
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

/// Lowercase with every run of punctuation and whitespace collapsed to one space.
pub fn normalize(text: &str) -> String {
    NON_ALPHANUMERIC
        .replace_all(&text.to_lowercase(), " ")
        .trim()
        .to_string()
}

/// Percentage of characters the two strings share, counting the longest common
/// substring and then, recursively, the common parts on either side of it.
pub fn similarity_percent(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    (common_length(&a, &b) * 2) as f64 * 100.0 / total as f64
}

fn common_length(a: &[char], b: &[char]) -> usize {
    let (start_a, start_b, length) = longest_common_substring(a, b);
    if length == 0 {
        return 0;
    }

    length
        + common_length(&a[..start_a], &b[..start_b])
        + common_length(&a[start_a + length..], &b[start_b + length..])
}

/// First longest common run as `(start in a, start in b, length)`.
fn longest_common_substring(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);

    for i in 0..a.len() {
        for j in 0..b.len() {
            let mut length = 0;
            while i + length < a.len() && j + length < b.len() && a[i + length] == b[j + length] {
                length += 1;
            }
            if length > best.2 {
                best = (i, j, length);
            }
        }
    }

    best
}
