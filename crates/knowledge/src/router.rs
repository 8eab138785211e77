//! Greeting and scope detection for incoming chat messages.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::responses::{ENGLISH_GREETING, SHONA_GREETING};
use crate::text::{normalize, words};

const SHONA_GREETINGS: &[&str] = &[
    "mhoro", "mhoroi", "makadii", "mangwanani", "masikati", "manheru", "kwaziwai",
];

const ENGLISH_GREETINGS: &[&str] = &["hi", "hello", "hey", "hie", "greetings", "howdy"];

/// Words that complete "good ..." as a greeting.
const TIMES_OF_DAY: &[&str] = &["morning", "afternoon", "evening", "day"];

/// Words that may accompany a greeting without making it a question.
const GREETING_FILLERS: &[&str] = &[
    "there", "all", "everyone", "gsu", "smartassist", "assistant", "bot", "zvenyu", "henyu",
];

const SCOPE_VOCABULARY: &[&str] = &[
    "gsu", "gwanda", "filabusi", "university", "varsity", "admission", "admissions", "apply",
    "applying", "application", "applications", "enrol", "enroll", "enrolment", "enrollment",
    "programme", "programmes", "program", "programs", "course", "courses", "module", "modules",
    "degree", "degrees", "diploma", "faculty", "faculties", "department", "fee", "fees",
    "tuition", "payment", "payments", "pay", "bursary", "scholarship", "scholarships", "calendar",
    "semester", "semesters", "exam", "exams", "examination", "examinations", "registration",
    "register", "timetable", "results", "transcript", "library", "libraries", "book", "books",
    "ict", "icts", "wifi", "internet", "email", "portal", "password", "login", "elearning",
    "moodle", "hostel", "hostels", "accommodation", "residence", "campus", "campuses",
    "lecturer", "lecturers", "student", "students", "staff", "graduation", "graduate",
    "postgraduate", "undergraduate", "dean", "registrar", "bursar", "orientation",
];

/// Openers of short messages that continue the previous question.
const FOLLOW_UP_MARKERS: &[&str] = &[
    "what about", "how about", "what else", "tell me more", "and", "also", "more", "explain",
    "why", "when", "where", "how",
];

pub const MAX_FOLLOW_UP_WORDS: usize = 8;

static SCOPE_WORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| SCOPE_VOCABULARY.iter().copied().collect());

/// Which welcome prompt a greeting should receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Greeting {
    Shona,
    English,
}

impl Greeting {
    pub fn response(&self) -> &'static str {
        match self {
            Greeting::Shona => SHONA_GREETING,
            Greeting::English => ENGLISH_GREETING,
        }
    }
}

/// Recognise a message made only of greetings. Any Shona greeting selects the Shona prompt.
///
/// ```
/// use smartassist_knowledge::{detect_greeting, Greeting};
///
/// assert_eq!(detect_greeting("Mhoro!"), Some(Greeting::Shona));
/// assert_eq!(detect_greeting("Good morning"), Some(Greeting::English));
/// assert_eq!(detect_greeting("Hello, how do I apply?"), None);
/// ```
pub fn detect_greeting(message: &str) -> Option<Greeting> {
    let words = words(message);
    let mut shona = false;
    let mut greeted = false;
    let mut index = 0;

    while index < words.len() {
        let word = words[index].as_str();

        if SHONA_GREETINGS.contains(&word) {
            shona = true;
            greeted = true;
        } else if ENGLISH_GREETINGS.contains(&word) {
            greeted = true;
        } else if word == "good"
            && words
                .get(index + 1)
                .is_some_and(|next| TIMES_OF_DAY.contains(&next.as_str()))
        {
            greeted = true;
            index += 1;
        } else if !GREETING_FILLERS.contains(&word) {
            return None;
        }

        index += 1;
    }

    match (greeted, shona) {
        (false, _) => None,
        (true, true) => Some(Greeting::Shona),
        (true, false) => Some(Greeting::English),
    }
}

/// Whether the message mentions anything from the university domain.
pub fn is_in_scope(message: &str) -> bool {
    words(message)
        .iter()
        .any(|word| SCOPE_WORDS.contains(word.as_str()))
}

/// A short message opening with a follow-up phrase such as "what about".
pub fn is_follow_up(message: &str) -> bool {
    let word_count = words(message).len();
    if word_count == 0 || word_count > MAX_FOLLOW_UP_WORDS {
        return false;
    }

    let normalized = normalize(message);
    FOLLOW_UP_MARKERS.iter().any(|marker| {
        normalized == *marker || normalized.starts_with(&format!("{marker} "))
    })
}
