//! HTTP API Handlers and Routes
//!
//! The REST API of ChatBotX, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions under `/api/v1`
//!
//! # API Endpoints
//!
//! ## Chat (`/api/v1/chat`)
//! - `POST /chat/message` - Send a message and receive the assistant's reply
//! - `GET /chat/history/{sender_id}` - Stored exchanges for a sender
//! - `DELETE /chat/history/{sender_id}` - Forget a sender
//! - `POST /chat/feedback` - Rate a reply
//!
//! ## Analytics (`/api/v1/analytics`)
//! - `GET /analytics/dashboard?days=` - Dashboard figures
//! - `GET /analytics/conversations` - Conversation log
//! - `GET /analytics/intents`, `GET /analytics/users`
//!
//! ## Catalog
//! - `GET /courses`, `GET /courses/{id}`, `GET /contact`
//! - `GET /faq`, `GET /faq/category/{category}`, `GET /faq/search?q=`
//!
//! ## Booking (`/api/v1/booking`)
//! - `POST /booking/appointment`, `GET /booking/appointments/{email}`,
//!   `GET /booking/availability?date=`
//!
//! ## Users and notifications
//! - `POST /users/register`, `POST /users/login`, `GET /users/profile/{user_id}`
//! - `GET /notifications`, `POST /notifications/mark-read/{id}`
//!
//! ## Admin (`/api/v1/admin`)
//! - `GET /admin/health`, `GET /admin/config`, `GET /admin/connections`
//!
//! # Authentication
//!
//! Profile and admin endpoints require a JWT in the `Authorization` header:
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! # OpenAPI Documentation
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::analytics::{ConversationRecord, SatisfactionRecord, UserActivity};
use crate::catalog::{ContactInfo, CourseRecord, FaqHit, FaqItem};
use crate::types::{
    AvailabilityResponse, Booking, BookingRequest, BookingResponse, ChatRequest, ChatResponse,
    DeleteHistoryResponse, FeedbackRequest, HealthResponse, HistoryEntry, HistoryResponse,
    LoginRequest, MessageResponse, Notification, RegisterRequest, SystemHealth, TokenResponse,
    UserProfile,
};
use crate::ws::{ConnectionInfo, ConnectionStats};

/// OpenAPI description of the REST API.
#[derive(OpenApi)]
#[openapi(
    info(title = "ChatBotX API", description = "Education support assistant"),
    paths(
        handlers::chat::send_message,
        handlers::chat::get_history,
        handlers::chat::delete_history,
        handlers::chat::submit_feedback,
        handlers::analytics::dashboard,
        handlers::analytics::conversations,
        handlers::analytics::intents,
        handlers::analytics::users,
        handlers::catalog::list_courses,
        handlers::catalog::get_course,
        handlers::catalog::contact,
        handlers::catalog::list_faqs,
        handlers::catalog::faqs_by_category,
        handlers::catalog::search_faqs,
        handlers::booking::book_appointment,
        handlers::booking::list_appointments,
        handlers::booking::availability,
        handlers::users::register,
        handlers::users::login,
        handlers::users::get_profile,
        handlers::notifications::list_notifications,
        handlers::notifications::mark_read,
        handlers::admin::system_health,
        handlers::admin::public_config,
        handlers::admin::connections,
        handlers::health::health_check,
    ),
    components(schemas(
        ChatRequest,
        ChatResponse,
        HistoryEntry,
        HistoryResponse,
        DeleteHistoryResponse,
        FeedbackRequest,
        MessageResponse,
        ConversationRecord,
        SatisfactionRecord,
        UserActivity,
        CourseRecord,
        FaqItem,
        FaqHit,
        ContactInfo,
        BookingRequest,
        BookingResponse,
        Booking,
        AvailabilityResponse,
        RegisterRequest,
        LoginRequest,
        TokenResponse,
        UserProfile,
        Notification,
        HealthResponse,
        SystemHealth,
        ConnectionInfo,
        ConnectionStats,
        handlers::admin::PublicConfig,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "chat", description = "Chat over HTTP"),
        (name = "analytics", description = "Conversation analytics"),
        (name = "catalog", description = "Courses, FAQs and contact details"),
        (name = "booking", description = "Consultation booking"),
        (name = "users", description = "Registration and login"),
        (name = "notifications", description = "Notification feed"),
        (name = "admin", description = "Operator endpoints"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
