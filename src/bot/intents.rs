//! Intent classification by static patterns and keyword tables.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const GREETING_WORDS: &[&str] = &["hello", "hi", "hey"];
const GREETING_PHRASES: &[(&str, &str)] = &[
    ("good", "morning"),
    ("good", "afternoon"),
    ("good", "evening"),
];

const BOOKING_KEYWORDS: &[&str] = &["book", "reserve", "enroll", "register", "schedule", "appointment"];
const COURSE_KEYWORDS: &[&str] = &["course", "class", "program", "training", "learn", "study"];

const SIMPLE_KEYWORDS: &[(&str, Intent)] = &[
    ("pricing", Intent::Pricing),
    ("price", Intent::Pricing),
    ("cost", Intent::Pricing),
    ("fee", Intent::Pricing),
    ("help", Intent::Help),
    ("contact", Intent::Contact),
];

/// What the user is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Faq,
    FaqOverview,
    Booking,
    CourseInfo,
    Enrollment,
    Pricing,
    Payment,
    Help,
    Contact,
    HumanAgent,
    Default,
    Fallback,
    Error,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::Faq => "faq",
            Intent::FaqOverview => "faq_overview",
            Intent::Booking => "booking",
            Intent::CourseInfo => "course_info",
            Intent::Enrollment => "enrollment",
            Intent::Pricing => "pricing",
            Intent::Payment => "payment",
            Intent::Help => "help",
            Intent::Contact => "contact",
            Intent::HumanAgent => "human_agent",
            Intent::Default => "default",
            Intent::Fallback => "fallback",
            Intent::Error => "error",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a `/command` quick-reply payload to its intent.
///
/// Returns `None` when `text` is not a payload. Unknown payloads map to
/// [`Intent::Fallback`].
pub fn payload_intent(text: &str) -> Option<Intent> {
    let payload = text.trim();
    if !payload.starts_with('/') {
        return None;
    }

    let intent = match payload.to_lowercase().as_str() {
        "/browse_courses" | "/courses" | "/schedule" | "/course_details" => Intent::CourseInfo,
        "/enrollment" | "/enrollment_help" | "/enroll" => Intent::Enrollment,
        "/pricing" => Intent::Pricing,
        "/payment" => Intent::Payment,
        "/faq" => Intent::FaqOverview,
        "/help" | "/more_info" | "/support" => Intent::Help,
        "/contact_support" => Intent::Contact,
        "/human_agent" => Intent::HumanAgent,
        "/book_consultation" | "/availability" => Intent::Booking,
        _ => Intent::Fallback,
    };
    Some(intent)
}

fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Greeting words and phrases, matched on word boundaries.
pub fn is_greeting(text: &str) -> bool {
    let words = words(text);
    words.iter().any(|w| GREETING_WORDS.contains(&w.as_str()))
        || words
            .windows(2)
            .any(|pair| GREETING_PHRASES.contains(&(pair[0].as_str(), pair[1].as_str())))
}

pub fn is_booking(text: &str) -> bool {
    let lower = text.to_lowercase();
    BOOKING_KEYWORDS.iter().any(|k| lower.contains(k))
}

pub fn is_course_query(text: &str) -> bool {
    let lower = text.to_lowercase();
    COURSE_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// First match in the pricing/help/contact keyword table.
pub fn simple_keyword(text: &str) -> Option<Intent> {
    let lower = text.to_lowercase();
    SIMPLE_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, intent)| *intent)
}
