//! Rule-based responder.
//!
//! A message is classified by static rules (quick-reply payloads, greeting,
//! course code, FAQ search, booking/course keywords, a small keyword table)
//! into a base reply, then enhanced with metadata, personalisation,
//! fallback quick replies, suggestions and a human hand-off offer for
//! strongly negative messages. The sender's conversation context is
//! updated after every non-error reply.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chatbotx_session::{BotResponse, Button, QuickReply, ServerFrame};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::cache::{compute_key, CacheStats, TtlCache};
use super::context::{ContextStore, ConversationContext};
use super::intents::{self, Intent};
use super::language::LanguageDetector;
use super::sentiment::{SentimentAnalyzer, SentimentScore};
use crate::catalog::{Catalog, CourseRecord, FaqHit, FaqItem};
use crate::utils::toml_config::{ChatbotxConfig, ConfigManager};

/// Compound sentiment below which a human hand-off is offered.
pub const ESCALATION_THRESHOLD: f64 = -0.5;

const ESCALATION_OFFER: &str =
    "\n\nI understand this might be frustrating. Would you like me to connect you with a human agent?";
const MAX_SUGGESTIONS: usize = 3;
const MAX_LISTED_COURSES: usize = 5;
const FAQ_RESULT_LIMIT: usize = 5;

/// A reply produced by the [`Responder`].
#[derive(Debug, Clone, Serialize)]
pub struct BotReply {
    pub text: String,
    pub quick_replies: Vec<QuickReply>,
    pub buttons: Vec<Button>,
    pub suggestions: Vec<String>,
    pub metadata: Map<String, Value>,
    pub escalation_suggested: bool,
    pub intent: Intent,
    /// Which rule produced the reply
    pub source: &'static str,
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faq_id: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

impl BotReply {
    fn new(text: impl Into<String>, intent: Intent, source: &'static str, confidence: f32) -> Self {
        Self {
            text: text.into(),
            quick_replies: Vec::new(),
            buttons: Vec::new(),
            suggestions: Vec::new(),
            metadata: Map::new(),
            escalation_suggested: false,
            intent,
            source,
            confidence,
            faq_id: None,
            error: false,
        }
    }

    fn with_quick_replies(mut self, replies: &[(&str, &str)]) -> Self {
        self.quick_replies = replies
            .iter()
            .map(|(title, payload)| QuickReply::new(*title, *payload))
            .collect();
        self
    }

    /// An error reply. Error replies skip enhancement and context updates.
    pub fn error(text: impl Into<String>) -> Self {
        let mut reply = Self::new(text, Intent::Error, "error", 0.0);
        reply.error = true;
        reply
    }

    /// Body of a `bot_response` frame.
    pub fn to_bot_response(&self) -> BotResponse {
        BotResponse {
            text: self.text.clone(),
            buttons: self.buttons.clone(),
            quick_replies: self.quick_replies.clone(),
            suggestions: self.suggestions.clone(),
            metadata: self.metadata.clone(),
            escalation_suggested: self.escalation_suggested,
            timestamp: Utc::now(),
        }
    }

    pub fn to_frame(&self) -> ServerFrame {
        ServerFrame::BotResponse(self.to_bot_response())
    }
}

/// Turns user messages into [`BotReply`]s.
///
/// Chat and business-hour settings are read from the live configuration
/// on every message.
pub struct Responder {
    catalog: Arc<Catalog>,
    config: Arc<ConfigManager>,
    contexts: ContextStore,
    faq_cache: TtlCache<Vec<FaqHit>>,
}

impl Responder {
    pub fn new(catalog: Arc<Catalog>, config: Arc<ConfigManager>) -> Self {
        let chat = config.config().chat.clone();
        Self {
            catalog,
            config,
            contexts: ContextStore::new(Duration::from_secs(chat.context_ttl_secs)),
            faq_cache: TtlCache::new(Duration::from_secs(chat.faq_cache_ttl_secs)),
        }
    }

    /// Current configuration, with the cache TTLs brought in line with it.
    fn settings(&self) -> Arc<ChatbotxConfig> {
        let config = self.config.config();
        self.contexts.set_ttl(Duration::from_secs(config.chat.context_ttl_secs));
        self.faq_cache.set_ttl(Duration::from_secs(config.chat.faq_cache_ttl_secs));
        config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Produce a reply for one user message.
    ///
    /// A `user_name` string in `metadata` is remembered in the sender's
    /// context and used to personalise this and later replies.
    pub fn process_message(
        &self,
        message: &str,
        sender_id: &str,
        metadata: &Map<String, Value>,
    ) -> BotReply {
        let started = Instant::now();
        let message = message.trim();
        if message.is_empty() {
            return BotReply::error("Empty message received");
        }

        let config = self.settings();
        let language = LanguageDetector::from_config(&config.chat).detect(message);
        let sentiment =
            SentimentAnalyzer::new(config.chat.enable_sentiment_analysis).analyze(message);
        let mut context = self.contexts.load(sender_id);
        if let Some(name) = metadata.get("user_name").and_then(Value::as_str) {
            if !name.trim().is_empty() {
                context.user_name = Some(name.trim().to_string());
            }
        }

        let base = self.classify(message, &config);
        let reply = self.enhance(
            base,
            message,
            sender_id,
            &language,
            sentiment,
            &context,
            metadata,
            config.chat.max_quick_replies,
            started,
        );

        let context = self.contexts.record_exchange(
            sender_id,
            context,
            message,
            &reply.text,
            reply.intent.as_str(),
        );
        debug!(
            sender_id = %sender_id,
            intent = %reply.intent,
            source = reply.source,
            message_count = context.message_count,
            "Processed chat message"
        );

        reply
    }

    /// Live conversation context for a sender.
    pub fn context(&self, sender_id: &str) -> Option<ConversationContext> {
        self.contexts.get(sender_id)
    }

    pub fn forget(&self, sender_id: &str) {
        self.contexts.forget(sender_id);
    }

    /// FAQ search through the result cache.
    pub fn search_faq(&self, query: &str) -> Vec<FaqHit> {
        self.settings();
        let key = compute_key("faq", query);
        if let Some(hits) = self.faq_cache.get(&key) {
            return hits;
        }
        let hits = self.catalog.search_faq(query, FAQ_RESULT_LIMIT);
        self.faq_cache.insert(key, hits.clone());
        hits
    }

    pub fn faq_cache_stats(&self) -> CacheStats {
        self.faq_cache.stats()
    }

    /// Drop expired contexts and cached FAQ results.
    pub fn purge_expired(&self) -> usize {
        self.contexts.purge_expired() + self.faq_cache.purge_expired()
    }

    fn classify(&self, message: &str, config: &ChatbotxConfig) -> BotReply {
        if let Some(intent) = intents::payload_intent(message) {
            return self.reply_for(intent, config);
        }
        if intents::is_greeting(message) {
            return greeting_reply();
        }
        if let Some(course) = self.mentioned_course(message) {
            return course_detail_reply(course);
        }
        if let Some(hit) = self.search_faq(message).into_iter().next() {
            return faq_reply(&hit.item);
        }
        if intents::is_booking(message) {
            return booking_reply(config);
        }
        if intents::is_course_query(message) {
            return self.course_list_reply();
        }
        if let Some(intent) = intents::simple_keyword(message) {
            return self.reply_for(intent, config);
        }
        default_reply()
    }

    fn reply_for(&self, intent: Intent, config: &ChatbotxConfig) -> BotReply {
        match intent {
            Intent::Greeting => greeting_reply(),
            Intent::CourseInfo => self.course_list_reply(),
            Intent::Enrollment => enrollment_reply(),
            Intent::Pricing => self.pricing_reply(),
            Intent::Payment => self.payment_reply(),
            Intent::FaqOverview => self.faq_overview_reply(config.chat.max_quick_replies),
            Intent::Help => help_reply(),
            Intent::Contact => self.contact_reply(),
            Intent::HumanAgent => self.human_agent_reply(),
            Intent::Booking => booking_reply(config),
            Intent::Default => default_reply(),
            Intent::Faq | Intent::Fallback | Intent::Error => fallback_reply(),
        }
    }

    fn mentioned_course(&self, message: &str) -> Option<&CourseRecord> {
        message
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() >= 4 && w.chars().any(|c| c.is_ascii_digit()))
            .find_map(|w| self.catalog.course(w))
    }

    fn course_list_reply(&self) -> BotReply {
        let courses = self.catalog.active_courses();
        if courses.is_empty() {
            return BotReply::new(
                "We have many exciting courses available! Please visit our website or contact us directly for the most up-to-date course information.",
                Intent::CourseInfo,
                "course_query",
                0.7,
            );
        }

        let mut text = String::from("Here are our available courses:\n\n");
        for course in courses.iter().take(MAX_LISTED_COURSES) {
            text.push_str(&format!(
                "📚 **{}** ({})\n   Duration: {}\n   Price: ${:.2}\n   Level: {}\n\n",
                course.title,
                course.code,
                course.duration,
                course.price,
                title_case(&course.level)
            ));
        }

        let mut reply = BotReply::new(text, Intent::CourseInfo, "course_query", 0.9)
            .with_quick_replies(&[
                ("Enroll Now", "/enroll"),
                ("More Details", "/course_details"),
                ("Schedule", "/schedule"),
            ]);
        reply.buttons = courses
            .iter()
            .take(MAX_LISTED_COURSES)
            .map(|c| Button {
                title: format!("{} details", c.code),
                payload: c.code.clone(),
            })
            .collect();
        reply
    }

    fn pricing_reply(&self) -> BotReply {
        let courses = self.catalog.active_courses();
        let text = if courses.is_empty() {
            "Our courses have different pricing. Please contact us for detailed information about fees."
                .to_string()
        } else {
            let mut text = String::from("Our courses have different pricing:\n\n");
            for course in &courses {
                text.push_str(&format!(
                    "• {} ({}): ${:.2} {}\n",
                    course.title, course.code, course.price, course.currency
                ));
            }
            text.push_str("\nWe also offer installment plans for select courses.");
            text
        };

        BotReply::new(text, Intent::Pricing, "pricing", 0.8).with_quick_replies(&[
            ("Payment Options", "/payment"),
            ("Course Catalog", "/courses"),
            ("Contact Support", "/contact_support"),
        ])
    }

    fn payment_reply(&self) -> BotReply {
        let Some(faq) = self.catalog.faqs_by_category("payment").into_iter().next() else {
            return self.pricing_reply();
        };
        let mut reply = faq_reply(faq).with_quick_replies(&[
            ("Course Catalog", "/courses"),
            ("Enrollment", "/enrollment"),
        ]);
        reply.intent = Intent::Payment;
        reply
    }

    fn faq_overview_reply(&self, max_quick_replies: usize) -> BotReply {
        let faqs = self.catalog.faqs();
        let mut text = String::from("Here are some frequently asked questions:\n\n");
        for faq in faqs {
            text.push_str(&format!("• {}\n", faq.question));
        }

        let mut reply = BotReply::new(text.trim_end(), Intent::FaqOverview, "faq_overview", 0.9);
        reply.quick_replies = faqs
            .iter()
            .take(max_quick_replies)
            .map(|f| QuickReply::new(f.question.clone(), f.question.clone()))
            .collect();
        reply
    }

    fn contact_reply(&self) -> BotReply {
        let contact = self.catalog.contact();
        BotReply::new(
            format!(
                "You can reach our support team at {} or {}. Our office at {} is open {}.",
                contact.email, contact.phone, contact.address, contact.hours
            ),
            Intent::Contact,
            "contact",
            0.9,
        )
        .with_quick_replies(&[("Human Agent", "/human_agent"), ("FAQ", "/faq")])
    }

    fn human_agent_reply(&self) -> BotReply {
        let contact = self.catalog.contact();
        BotReply::new(
            format!(
                "I'll connect you with a human agent. Our support team is available {}. You can also email us at {}.",
                contact.hours, contact.email
            ),
            Intent::HumanAgent,
            "human_handoff",
            1.0,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn enhance(
        &self,
        mut reply: BotReply,
        message: &str,
        sender_id: &str,
        language: &str,
        sentiment: SentimentScore,
        context: &ConversationContext,
        request_metadata: &Map<String, Value>,
        max_quick_replies: usize,
        started: Instant,
    ) -> BotReply {
        if let Some(name) = &context.user_name {
            reply.text = format!("Hi {}, {}", name, reply.text);
        }

        if reply.quick_replies.is_empty() {
            reply.quick_replies = generate_quick_replies(&reply.text, max_quick_replies);
        }
        reply.quick_replies.truncate(max_quick_replies);
        reply.suggestions = generate_suggestions(message);

        if sentiment.compound < ESCALATION_THRESHOLD {
            reply.text.push_str(ESCALATION_OFFER);
            reply.escalation_suggested = true;
        }

        let mut metadata = Map::new();
        metadata.insert("timestamp".into(), json!(Utc::now().to_rfc3339()));
        metadata.insert("language".into(), json!(language));
        metadata.insert(
            "sentiment".into(),
            json!({
                "compound": sentiment.compound,
                "pos": sentiment.pos,
                "neu": sentiment.neu,
                "neg": sentiment.neg,
            }),
        );
        metadata.insert("user_id".into(), json!(sender_id));
        metadata.insert("intent".into(), json!(reply.intent.as_str()));
        metadata.insert("source".into(), json!(reply.source));
        metadata.insert("confidence".into(), json!(reply.confidence));
        if let Some(faq_id) = &reply.faq_id {
            metadata.insert("faq_id".into(), json!(faq_id));
        }
        if !request_metadata.is_empty() {
            metadata.insert("client".into(), Value::Object(request_metadata.clone()));
        }
        metadata.insert(
            "response_time".into(),
            json!(started.elapsed().as_secs_f64()),
        );
        reply.metadata = metadata;

        reply
    }
}

fn booking_reply(config: &ChatbotxConfig) -> BotReply {
    BotReply::new(
        format!(
            "I'd be happy to help you book a consultation! Sessions run Monday to Friday between {:02}:00 and {:02}:00. Tell me which course you're interested in and your preferred date and time.",
            config.business.hours_start, config.business.hours_end
        ),
        Intent::Booking,
        "booking",
        0.8,
    )
    .with_quick_replies(&[
        ("Check Availability", "/availability"),
        ("Browse Courses", "/browse_courses"),
        ("Contact Support", "/contact_support"),
    ])
}

fn greeting_reply() -> BotReply {
    BotReply::new(
        "Hello! Welcome to our Education Support Assistant. I'm here to help you with course information, enrollments, and answer any questions you might have. How can I assist you today?",
        Intent::Greeting,
        "greeting",
        1.0,
    )
    .with_quick_replies(&[
        ("Browse Courses", "/browse_courses"),
        ("Enrollment Help", "/enrollment_help"),
        ("FAQ", "/faq"),
        ("Contact Support", "/contact_support"),
    ])
}

fn default_reply() -> BotReply {
    BotReply::new(
        "I'm here to help! You can ask me about courses, enrollment, schedules, fees, or any other questions related to our educational programs.",
        Intent::Default,
        "default",
        0.5,
    )
    .with_quick_replies(&[
        ("Course Catalog", "/courses"),
        ("Enrollment Process", "/enrollment"),
        ("Pricing", "/pricing"),
        ("Support", "/support"),
    ])
}

fn fallback_reply() -> BotReply {
    BotReply::new(
        "I'm sorry, I didn't quite understand that. Could you please rephrase your question or choose from the options below?",
        Intent::Fallback,
        "fallback",
        0.3,
    )
    .with_quick_replies(&[
        ("Course Information", "/courses"),
        ("Enrollment", "/enrollment"),
        ("FAQ", "/faq"),
        ("Human Agent", "/human_agent"),
    ])
}

fn enrollment_reply() -> BotReply {
    BotReply::new(
        "To enroll, you can browse our courses, select your desired program, and follow the registration process.",
        Intent::Enrollment,
        "enrollment",
        0.9,
    )
    .with_quick_replies(&[
        ("Browse Courses", "/browse_courses"),
        ("Book Consultation", "/book_consultation"),
        ("Payment Options", "/payment"),
    ])
}

fn help_reply() -> BotReply {
    BotReply::new(
        "I can help you with course information, enrollment, schedules, and general questions about our programs.",
        Intent::Help,
        "help",
        0.8,
    )
    .with_quick_replies(&[
        ("Browse Courses", "/browse_courses"),
        ("Enrollment Help", "/enrollment_help"),
        ("FAQ", "/faq"),
        ("Human Agent", "/human_agent"),
    ])
}

fn faq_reply(faq: &FaqItem) -> BotReply {
    let mut reply = BotReply::new(faq.answer.clone(), Intent::Faq, "faq", 0.85);
    reply.faq_id = Some(faq.id.clone());
    reply
}

fn course_detail_reply(course: &CourseRecord) -> BotReply {
    let text = format!(
        "📚 **{}** ({})\n{}\n\n   Category: {}\n   Duration: {}\n   Price: ${:.2}\n   Level: {}\n   Instructor: {}\n   Schedule: {}\n   Class size: up to {} students",
        course.title,
        course.code,
        course.description,
        course.category,
        course.duration,
        course.price,
        title_case(&course.level),
        course.instructor,
        course.schedule,
        course.max_students
    );
    BotReply::new(text, Intent::CourseInfo, "course_query", 0.95).with_quick_replies(&[
        ("Enroll Now", "/enroll"),
        ("Book Consultation", "/book_consultation"),
        ("Pricing", "/pricing"),
    ])
}

/// Default quick replies for a reply that has none.
pub fn generate_quick_replies(reply_text: &str, max: usize) -> Vec<QuickReply> {
    let lower = reply_text.to_lowercase();
    let mut replies = vec![
        QuickReply::new("Help", "/help"),
        QuickReply::new("More Info", "/more_info"),
    ];
    if lower.contains("course") {
        replies.push(QuickReply::new("Enroll", "/enroll"));
    }
    if lower.contains("price") || lower.contains("cost") {
        replies.push(QuickReply::new("Payment Options", "/payment"));
    }
    replies.truncate(max);
    replies
}

/// Follow-up suggestions derived from the user's message.
pub fn generate_suggestions(message: &str) -> Vec<String> {
    let lower = message.to_lowercase();
    let mut suggestions = Vec::new();
    if lower.contains("course") {
        suggestions.extend([
            "Browse our complete course catalog",
            "Check course prerequisites",
            "View course schedules",
        ]);
    }
    if lower.contains("price") || lower.contains("cost") {
        suggestions.extend(["View payment plans", "Check for discounts", "Compare course prices"]);
    }
    suggestions
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
