//! Course catalog slice.

use serde::{Deserialize, Serialize};

/// A course as listed by `GET /api/v1/courses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Course id, e.g. `cs101`
    pub id: String,
    /// Course title
    pub title: String,
    /// Short description
    pub description: String,
    /// Category such as `Computer Science`
    pub category: String,
    /// Human-readable duration
    pub duration: String,
    /// Price in `currency`
    pub price: f64,
    /// ISO currency code
    pub currency: String,
    /// Difficulty level
    pub level: String,
}

/// Catalog filter applied by [`CoursesState::visible`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseFilter {
    /// Exact category match (case-insensitive)
    pub category: Option<String>,
    /// Substring search over title and description (case-insensitive)
    pub search: Option<String>,
}

/// Updates accepted by [`CoursesState::reduce`].
#[derive(Debug, Clone)]
pub enum CoursesAction {
    /// A catalog request was sent
    FetchStarted,
    /// The catalog arrived
    FetchSucceeded(Vec<Course>),
    /// The catalog request failed
    FetchFailed(String),
    /// Select a course by id
    Select(String),
    /// Replace the filter
    SetFilter(CourseFilter),
}

/// State of the course catalog screen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoursesState {
    /// Loaded courses
    pub courses: Vec<Course>,
    /// Id of the selected course
    pub selected: Option<String>,
    /// Whether a fetch is in flight
    pub loading: bool,
    /// Last fetch error
    pub error: Option<String>,
    /// Active filter
    pub filter: CourseFilter,
}

impl CoursesState {
    /// Apply an update.
    pub fn reduce(&mut self, action: CoursesAction) {
        match action {
            CoursesAction::FetchStarted => {
                self.loading = true;
                self.error = None;
            }
            CoursesAction::FetchSucceeded(courses) => {
                self.loading = false;
                self.courses = courses;
                // Selection survives a refresh only if the course still exists
                if let Some(id) = &self.selected {
                    if !self.courses.iter().any(|c| &c.id == id) {
                        self.selected = None;
                    }
                }
            }
            CoursesAction::FetchFailed(error) => {
                self.loading = false;
                self.error = Some(error);
            }
            CoursesAction::Select(id) => {
                self.selected = self
                    .courses
                    .iter()
                    .any(|c| c.id == id)
                    .then_some(id);
            }
            CoursesAction::SetFilter(filter) => self.filter = filter,
        }
    }

    /// The selected course, if any.
    pub fn selected_course(&self) -> Option<&Course> {
        let id = self.selected.as_ref()?;
        self.courses.iter().find(|c| &c.id == id)
    }

    /// Courses matching the active filter, in catalog order.
    pub fn visible(&self) -> Vec<&Course> {
        let category = self.filter.category.as_ref().map(|c| c.to_lowercase());
        let search = self
            .filter
            .search
            .as_ref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        self.courses
            .iter()
            .filter(|c| {
                category
                    .as_ref()
                    .map_or(true, |cat| c.category.to_lowercase() == *cat)
            })
            .filter(|c| {
                search.as_ref().map_or(true, |q| {
                    c.title.to_lowercase().contains(q) || c.description.to_lowercase().contains(q)
                })
            })
            .collect()
    }
}
