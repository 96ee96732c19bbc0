//! Read-only catalog endpoints: courses, FAQs and contact details.

use crate::{
    catalog::{ContactInfo, CourseRecord, FaqHit, FaqItem},
    types::{AppError, Result},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct FaqSearchQuery {
    /// Free-text query
    pub q: String,
}

/// Active courses
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    responses((status = 200, description = "Active courses", body = [CourseRecord])),
    tag = "catalog"
)]
pub async fn list_courses(State(state): State<AppState>) -> Json<Vec<CourseRecord>> {
    Json(state.catalog.active_courses().into_iter().cloned().collect())
}

/// One course by id or code
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    params(("id" = String, Path, description = "Course id or code, case-insensitive")),
    responses(
        (status = 200, description = "Course", body = CourseRecord),
        (status = 404, description = "Unknown course")
    ),
    tag = "catalog"
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CourseRecord>> {
    state
        .catalog
        .course(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Course '{}' not found", id)))
}

#[utoipa::path(
    get,
    path = "/api/v1/contact",
    responses((status = 200, description = "Contact details", body = ContactInfo)),
    tag = "catalog"
)]
pub async fn contact(State(state): State<AppState>) -> Json<ContactInfo> {
    Json(state.catalog.contact().clone())
}

#[utoipa::path(
    get,
    path = "/api/v1/faq",
    responses((status = 200, description = "All FAQs", body = [FaqItem])),
    tag = "catalog"
)]
pub async fn list_faqs(State(state): State<AppState>) -> Json<Vec<FaqItem>> {
    Json(state.catalog.faqs().to_vec())
}

#[utoipa::path(
    get,
    path = "/api/v1/faq/category/{category}",
    params(("category" = String, Path, description = "FAQ category")),
    responses((status = 200, description = "FAQs in the category", body = [FaqItem])),
    tag = "catalog"
)]
pub async fn faqs_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Json<Vec<FaqItem>> {
    Json(
        state
            .catalog
            .faqs_by_category(&category)
            .into_iter()
            .cloned()
            .collect(),
    )
}

/// Keyword search over FAQ questions and answers, best match first
#[utoipa::path(
    get,
    path = "/api/v1/faq/search",
    params(FaqSearchQuery),
    responses(
        (status = 200, description = "Ranked matches", body = [FaqHit]),
        (status = 400, description = "Empty query")
    ),
    tag = "catalog"
)]
pub async fn search_faqs(
    State(state): State<AppState>,
    Query(query): Query<FaqSearchQuery>,
) -> Result<Json<Vec<FaqHit>>> {
    if query.q.trim().is_empty() {
        return Err(AppError::InvalidInput("q must not be empty".to_string()));
    }
    Ok(Json(state.responder.search_faq(&query.q)))
}
