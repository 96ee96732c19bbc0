//! Course catalog, FAQ knowledge base and contact details.
//!
//! The catalog is seeded in memory at startup and is read-only afterwards.
//! FAQ search is a keyword ranking: every normalised query token found in a
//! question scores 2, every token found in an answer scores 1, and results
//! below [`MIN_FAQ_SCORE`] are dropped.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

/// Minimum score for a FAQ to count as a hit.
pub const MIN_FAQ_SCORE: u32 = 2;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "can", "do", "does", "for", "how", "i", "in", "is", "it", "me",
    "my", "of", "on", "or", "our", "the", "to", "we", "what", "with", "you", "your",
];

/// A course offered by the school.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CourseRecord {
    /// Lowercase id used in URLs, e.g. `cs101`
    pub id: String,
    /// Course code, e.g. `CS101`
    pub code: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub duration: String,
    pub price: f64,
    pub currency: String,
    pub level: String,
    /// `active` or `archived`
    pub status: String,
    pub max_students: u32,
    pub instructor: String,
    pub schedule: String,
}

impl CourseRecord {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

/// One FAQ entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FaqItem {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub language: String,
    /// Lower sorts first on equal scores
    pub priority: u32,
}

/// A FAQ search result.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FaqHit {
    pub item: FaqItem,
    pub score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
    pub address: String,
    pub hours: String,
}

/// Read-only catalog of courses, FAQs and contact details.
#[derive(Debug, Clone)]
pub struct Catalog {
    courses: Vec<CourseRecord>,
    faqs: Vec<FaqItem>,
    contact: ContactInfo,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::seeded()
    }
}

impl Catalog {
    /// Build a catalog from explicit data.
    pub fn new(courses: Vec<CourseRecord>, faqs: Vec<FaqItem>, contact: ContactInfo) -> Self {
        Self {
            courses,
            faqs,
            contact,
        }
    }

    /// Catalog with the default courses and FAQs.
    pub fn seeded() -> Self {
        Self::new(seed_courses(), seed_faqs(), seed_contact())
    }

    /// Active courses in catalog order.
    pub fn active_courses(&self) -> Vec<&CourseRecord> {
        self.courses.iter().filter(|c| c.is_active()).collect()
    }

    /// Look a course up by id or code, ignoring case.
    pub fn course(&self, id: &str) -> Option<&CourseRecord> {
        let id = id.trim();
        self.courses
            .iter()
            .find(|c| c.id.eq_ignore_ascii_case(id) || c.code.eq_ignore_ascii_case(id))
    }

    /// Distinct categories of active courses, in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.active_courses()
            .into_iter()
            .map(|c| c.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    pub fn faqs(&self) -> &[FaqItem] {
        &self.faqs
    }

    pub fn faqs_by_category(&self, category: &str) -> Vec<&FaqItem> {
        self.faqs
            .iter()
            .filter(|f| f.category.eq_ignore_ascii_case(category.trim()))
            .collect()
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    /// Rank FAQs against a free-text query, best first.
    pub fn search_faq(&self, query: &str, limit: usize) -> Vec<FaqHit> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<FaqHit> = self
            .faqs
            .iter()
            .filter_map(|faq| {
                let question = tokenize(&faq.question);
                let answer = tokenize(&faq.answer);
                let score: u32 = query_tokens
                    .iter()
                    .map(|t| {
                        let mut s = 0;
                        if question.contains(t) {
                            s += 2;
                        }
                        if answer.contains(t) {
                            s += 1;
                        }
                        s
                    })
                    .sum();

                (score >= MIN_FAQ_SCORE).then(|| FaqHit {
                    item: faq.clone(),
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.item.priority.cmp(&b.item.priority))
                .then(a.item.id.cmp(&b.item.id))
        });
        hits.truncate(limit);
        hits
    }
}

/// Lowercase alphanumeric tokens without stop words, with a naive plural strip.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        .map(|w| {
            if w.len() > 3 && w.ends_with('s') && !w.ends_with("ss") {
                w[..w.len() - 1].to_string()
            } else {
                w.to_string()
            }
        })
        .collect()
}

fn course(
    code: &str,
    title: &str,
    description: &str,
    category: &str,
    duration: &str,
    price: f64,
    level: &str,
    max_students: u32,
    instructor: &str,
    schedule: &str,
) -> CourseRecord {
    CourseRecord {
        id: code.to_lowercase(),
        code: code.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        duration: duration.to_string(),
        price,
        currency: "USD".to_string(),
        level: level.to_string(),
        status: "active".to_string(),
        max_students,
        instructor: instructor.to_string(),
        schedule: schedule.to_string(),
    }
}

fn seed_courses() -> Vec<CourseRecord> {
    vec![
        course(
            "CS101",
            "Introduction to Programming",
            "Learn the fundamentals of programming with Python",
            "Computer Science",
            "8 weeks",
            299.99,
            "beginner",
            30,
            "Dr. Jane Smith",
            "Mon/Wed/Fri 10:00-12:00",
        ),
        course(
            "DS201",
            "Data Science Fundamentals",
            "Introduction to data analysis and visualization",
            "Data Science",
            "10 weeks",
            399.99,
            "intermediate",
            25,
            "Dr. John Doe",
            "Tue/Thu 14:00-16:00",
        ),
        course(
            "WEB101",
            "Web Development",
            "Full-stack web development with modern technologies",
            "Web Development",
            "14 weeks",
            749.0,
            "beginner",
            30,
            "Web Faculty",
            "Sat 09:00-13:00",
        ),
    ]
}

fn faq(id: &str, question: &str, answer: &str, category: &str) -> FaqItem {
    FaqItem {
        id: id.to_string(),
        question: question.to_string(),
        answer: answer.to_string(),
        category: category.to_string(),
        language: "en".to_string(),
        priority: 1,
    }
}

fn seed_faqs() -> Vec<FaqItem> {
    vec![
        faq(
            "1",
            "What courses do you offer?",
            "We offer a wide range of courses including Computer Science, Data Science, Web Development, Mobile App Development, AI/ML, and Digital Marketing. Visit our course catalog for detailed information.",
            "courses",
        ),
        faq(
            "2",
            "How do I enroll in a course?",
            "You can enroll in a course by visiting our website, selecting your desired course, and completing the registration process. You can also ask me to help you with the enrollment process.",
            "enrollment",
        ),
        faq(
            "3",
            "What are the payment options?",
            "We accept various payment methods including credit cards, debit cards, PayPal, and bank transfers. We also offer installment plans for select courses.",
            "payment",
        ),
        faq(
            "4",
            "Do you provide certificates?",
            "Yes, we provide industry-recognized certificates upon successful completion of courses. Our certificates are accredited and can be verified online.",
            "certification",
        ),
    ]
}

fn seed_contact() -> ContactInfo {
    ContactInfo {
        email: "support@chatbotx.com".to_string(),
        phone: "+1 (555) 123-4567".to_string(),
        address: "123 Education Street, Learning City".to_string(),
        hours: "Monday-Friday, 9 AM - 5 PM".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_course_lookup_is_case_insensitive() {
        let catalog = Catalog::seeded();
        assert_eq!(catalog.course("cs101").unwrap().code, "CS101");
        assert_eq!(catalog.course("DS201").unwrap().instructor, "Dr. John Doe");
        assert_eq!(catalog.course(" Web101 ").unwrap().id, "web101");
        assert!(catalog.course("xx999").is_none());
    }

    #[test]
    fn test_categories_are_distinct() {
        let catalog = Catalog::seeded();
        assert_eq!(
            catalog.categories(),
            vec!["Computer Science", "Data Science", "Web Development"]
        );
    }

    #[test]
    fn test_archived_courses_are_hidden() {
        let mut courses = seed_courses();
        courses[1].status = "archived".to_string();
        let catalog = Catalog::new(courses, seed_faqs(), seed_contact());
        let ids: Vec<&str> = catalog.active_courses().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["cs101", "web101"]);
        // Still reachable by id
        assert!(catalog.course("ds201").is_some());
    }

    #[rstest]
    #[case("What payment options do you have?", "3")]
    #[case("do you provide a certificate", "4")]
    #[case("which courses do you offer", "1")]
    #[case("how can I enroll", "2")]
    fn test_faq_search_best_hit(#[case] query: &str, #[case] expected: &str) {
        let catalog = Catalog::seeded();
        let hits = catalog.search_faq(query, 3);
        assert_eq!(hits[0].item.id, expected, "query: {}", query);
    }

    #[rstest]
    #[case("hello")]
    #[case("help")]
    #[case("pricing")]
    #[case("   ")]
    fn test_faq_search_misses(#[case] query: &str) {
        let catalog = Catalog::seeded();
        assert!(catalog.search_faq(query, 3).is_empty(), "query: {}", query);
    }

    #[test]
    fn test_faqs_by_category() {
        let catalog = Catalog::seeded();
        let payment = catalog.faqs_by_category("Payment");
        assert_eq!(payment.len(), 1);
        assert_eq!(payment[0].id, "3");
        assert!(catalog.faqs_by_category("none").is_empty());
    }

    #[test]
    fn test_tokenize_strips_plurals_and_stop_words() {
        let tokens = tokenize("What are the Payment Options?");
        assert!(tokens.contains("payment"));
        assert!(tokens.contains("option"));
        assert!(!tokens.contains("what"));
        assert!(tokenize("class").contains("class"));
    }
}
