use crate::api::handlers::{admin, analytics, booking, catalog, chat, notifications, users};
use crate::auth::{jwt::AuthService, middleware::auth_middleware};
use crate::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Routes mounted under `/api/v1`.
pub fn create_router(auth_service: Arc<AuthService>) -> Router<AppState> {
    let public_routes = Router::new()
        // Chat
        .route("/chat/message", post(chat::send_message))
        .route(
            "/chat/history/{sender_id}",
            get(chat::get_history).delete(chat::delete_history),
        )
        .route("/chat/feedback", post(chat::submit_feedback))
        // Analytics
        .route("/analytics/dashboard", get(analytics::dashboard))
        .route("/analytics/conversations", get(analytics::conversations))
        .route("/analytics/intents", get(analytics::intents))
        .route("/analytics/users", get(analytics::users))
        // Catalog
        .route("/courses", get(catalog::list_courses))
        .route("/courses/{id}", get(catalog::get_course))
        .route("/contact", get(catalog::contact))
        .route("/faq", get(catalog::list_faqs))
        .route("/faq/search", get(catalog::search_faqs))
        .route("/faq/category/{category}", get(catalog::faqs_by_category))
        // Booking
        .route("/booking/appointment", post(booking::book_appointment))
        .route(
            "/booking/appointments/{email}",
            get(booking::list_appointments),
        )
        .route("/booking/availability", get(booking::availability))
        // Users
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        // Notifications
        .route("/notifications", get(notifications::list_notifications))
        .route(
            "/notifications/mark-read/{id}",
            post(notifications::mark_read),
        );

    let protected_routes = Router::new()
        .route("/users/profile/{user_id}", get(users::get_profile))
        .route("/admin/health", get(admin::system_health))
        .route("/admin/config", get(admin::public_config))
        .route("/admin/connections", get(admin::connections))
        .layer(middleware::from_fn_with_state(auth_service, auth_middleware));

    public_routes.merge(protected_routes)
}
