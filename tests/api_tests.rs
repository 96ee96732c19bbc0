//! REST API integration tests.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use chatbotx::{create_app, ChatbotxConfig};
use common::{next_weekday, test_server, test_state};
use serde_json::{json, Value};

// ============= Health =============

#[tokio::test]
async fn test_health_check() {
    let server = test_server().await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["database"], true);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_index_page() {
    let server = test_server().await;

    let response = server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().contains("ChatBotX - AI Support Assistant"));
}

#[tokio::test]
async fn test_process_time_header() {
    let server = test_server().await;

    let response = server.get("/health").await;
    let value = response.header("x-process-time");
    let secs: f64 = value.to_str().unwrap().parse().unwrap();
    assert!(secs >= 0.0);
}

// ============= Chat =============

#[tokio::test]
async fn test_chat_message_greeting() {
    let server = test_server().await;

    let response = server
        .post("/api/v1/chat/message")
        .json(&json!({ "message": "hello", "sender_id": "alice" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["sender_id"], "alice");
    assert_eq!(body["recipient_id"], "chatbot");
    assert_eq!(body["intent"], "greeting");
    assert!(body["response"].as_str().unwrap().contains("Hello"));
    assert!(!body["quick_replies"].as_array().unwrap().is_empty());
    assert!(body["entities"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_message_generates_sender_id() {
    let server = test_server().await;

    let response = server
        .post("/api/v1/chat/message")
        .json(&json!({ "message": "/pricing" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["intent"], "pricing");
    let sender_id = body["sender_id"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(sender_id).is_ok());
}

#[tokio::test]
async fn test_chat_message_empty_is_rejected() {
    let server = test_server().await;

    let response = server
        .post("/api/v1/chat/message")
        .json(&json!({ "message": "   ", "sender_id": "alice" }))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"], "Empty message received");
}

#[tokio::test]
async fn test_chat_history_roundtrip() {
    let server = test_server().await;

    for message in ["hello", "/courses"] {
        server
            .post("/api/v1/chat/message")
            .json(&json!({ "message": message, "sender_id": "bob" }))
            .await
            .assert_status_ok();
    }

    let response = server.get("/api/v1/chat/history/bob").await;
    response.assert_status_ok();
    let body: Value = response.json();
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["user_message"], "hello");
    assert_eq!(history[1]["intent"], "course_info");

    let response = server.delete("/api/v1/chat/history/bob").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["deleted"], 2);

    let body: Value = server.get("/api/v1/chat/history/bob").await.json();
    assert!(body["history"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_feedback_feeds_dashboard() {
    let server = test_server().await;

    server
        .post("/api/v1/chat/message")
        .json(&json!({ "message": "hello", "sender_id": "carol" }))
        .await
        .assert_status_ok();

    server
        .post("/api/v1/chat/feedback")
        .json(&json!({ "sender_id": "carol", "message_id": "m1", "rating": 4 }))
        .await
        .assert_status_ok();

    server
        .post("/api/v1/chat/feedback")
        .json(&json!({ "sender_id": "carol", "message_id": "m1", "rating": 9 }))
        .await
        .assert_status_bad_request();

    let body: Value = server.get("/api/v1/analytics/dashboard").await.json();
    assert_eq!(body["total_messages"], 1);
    assert_eq!(body["total_conversations"], 1);
    assert_eq!(body["user_satisfaction"], 4.0);
    assert_eq!(body["daily_stats"].as_array().unwrap().len(), 7);
}

// ============= Analytics =============

#[tokio::test]
async fn test_dashboard_days_out_of_range() {
    let server = test_server().await;

    server
        .get("/api/v1/analytics/dashboard")
        .add_query_param("days", 91)
        .await
        .assert_status_bad_request();

    let response = server
        .get("/api/v1/analytics/dashboard")
        .add_query_param("days", 30)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["daily_stats"].as_array().unwrap().len(), 30);
}

#[tokio::test]
async fn test_intents_and_users() {
    let server = test_server().await;

    for (sender, message) in [("a", "hello"), ("a", "hi"), ("b", "/pricing")] {
        server
            .post("/api/v1/chat/message")
            .json(&json!({ "message": message, "sender_id": sender }))
            .await
            .assert_status_ok();
    }

    let intents: Value = server.get("/api/v1/analytics/intents").await.json();
    assert_eq!(intents[0]["intent"], "greeting");
    assert_eq!(intents[0]["count"], 2);

    let users: Value = server.get("/api/v1/analytics/users").await.json();
    assert_eq!(users[0]["sender_id"], "a");
    assert_eq!(users[0]["messages"], 2);

    let conversations: Value = server
        .get("/api/v1/analytics/conversations")
        .add_query_param("start_date", "2000-01-01T00:00:00Z")
        .await
        .json();
    assert_eq!(conversations.as_array().unwrap().len(), 3);

    server
        .get("/api/v1/analytics/conversations")
        .add_query_param("start_date", "last week")
        .await
        .assert_status_bad_request();
}

// ============= Catalog =============

#[tokio::test]
async fn test_courses() {
    let server = test_server().await;

    let courses: Value = server.get("/api/v1/courses").await.json();
    assert_eq!(courses.as_array().unwrap().len(), 3);

    let response = server.get("/api/v1/courses/CS101").await;
    response.assert_status_ok();
    let course: Value = response.json();
    assert_eq!(course["title"], "Introduction to Programming");

    server
        .get("/api/v1/courses/XX999")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_faq_endpoints() {
    let server = test_server().await;

    let faqs: Value = server.get("/api/v1/faq").await.json();
    assert_eq!(faqs.as_array().unwrap().len(), 4);

    let payment: Value = server.get("/api/v1/faq/category/payment").await.json();
    assert_eq!(payment[0]["id"], "3");

    let hits: Value = server
        .get("/api/v1/faq/search")
        .add_query_param("q", "payment options")
        .await
        .json();
    assert_eq!(hits[0]["item"]["id"], "3");

    server
        .get("/api/v1/faq/search")
        .add_query_param("q", " ")
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_contact() {
    let server = test_server().await;

    let contact: Value = server.get("/api/v1/contact").await.json();
    assert_eq!(contact["email"], "support@chatbotx.com");
}

// ============= Booking =============

#[tokio::test]
async fn test_booking_flow() {
    let server = test_server().await;
    let date = next_weekday().format("%Y-%m-%d").to_string();

    let slots: Value = server
        .get("/api/v1/booking/availability")
        .add_query_param("date", &date)
        .await
        .json();
    assert_eq!(slots["available_slots"].as_array().unwrap().len(), 8);

    let request = json!({
        "user_name": "Dana",
        "email": "dana@example.com",
        "course_name": "Web Development",
        "preferred_date": date,
        "preferred_time": "14:00"
    });
    let response = server.post("/api/v1/booking/appointment").json(&request).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["message"], "Appointment booked successfully");

    // Same slot again
    server
        .post("/api/v1/booking/appointment")
        .json(&request)
        .await
        .assert_status_bad_request();

    let slots: Value = server
        .get("/api/v1/booking/availability")
        .add_query_param("date", &date)
        .await
        .json();
    let slots = slots["available_slots"].as_array().unwrap();
    assert_eq!(slots.len(), 7);
    assert!(!slots.contains(&json!("14:00")));

    let mine: Value = server
        .get("/api/v1/booking/appointments/dana@example.com")
        .await
        .json();
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_availability_rejects_bad_date() {
    let server = test_server().await;

    server
        .get("/api/v1/booking/availability")
        .add_query_param("date", "tomorrow")
        .await
        .assert_status_bad_request();
}

// ============= Users =============

async fn register(server: &TestServer, email: &str) -> Value {
    let response = server
        .post("/api/v1/users/register")
        .json(&json!({ "email": email, "password": "password123", "name": "Eve" }))
        .await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
async fn test_register_and_login() {
    let server = test_server().await;

    let tokens = register(&server, "eve@example.com").await;
    assert!(tokens["access_token"].as_str().is_some());
    assert_eq!(tokens["expires_in"], 1800);

    server
        .post("/api/v1/users/register")
        .json(&json!({ "email": "eve@example.com", "password": "password123", "name": "Eve" }))
        .await
        .assert_status_bad_request();

    server
        .post("/api/v1/users/login")
        .json(&json!({ "email": "eve@example.com", "password": "password123" }))
        .await
        .assert_status_ok();

    server
        .post("/api/v1/users/login")
        .json(&json!({ "email": "eve@example.com", "password": "wrong-password" }))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn test_register_short_password() {
    let server = test_server().await;

    server
        .post("/api/v1/users/register")
        .json(&json!({ "email": "x@example.com", "password": "short", "name": "X" }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_profile_requires_own_token() {
    let server = test_server().await;

    let eve = register(&server, "eve@example.com").await;
    let frank = register(&server, "frank@example.com").await;
    let eve_id = eve["user_id"].as_str().unwrap();
    let eve_token = eve["access_token"].as_str().unwrap();
    let frank_token = frank["access_token"].as_str().unwrap();

    server
        .get(&format!("/api/v1/users/profile/{}", eve_id))
        .await
        .assert_status_unauthorized();

    let response = server
        .get(&format!("/api/v1/users/profile/{}", eve_id))
        .authorization_bearer(eve_token)
        .await;
    response.assert_status_ok();
    let profile: Value = response.json();
    assert_eq!(profile["email"], "eve@example.com");
    assert_eq!(profile["name"], "Eve");

    server
        .get(&format!("/api/v1/users/profile/{}", eve_id))
        .authorization_bearer(frank_token)
        .await
        .assert_status_unauthorized();
}

// ============= Notifications =============

#[tokio::test]
async fn test_notifications() {
    let server = test_server().await;

    let notifications: Value = server.get("/api/v1/notifications").await.json();
    assert_eq!(notifications[0]["type"], "info");
    assert_eq!(notifications[0]["read"], false);

    server
        .post("/api/v1/notifications/mark-read/1")
        .await
        .assert_status_ok();

    let notifications: Value = server.get("/api/v1/notifications").await.json();
    assert_eq!(notifications[0]["read"], true);

    server
        .post("/api/v1/notifications/mark-read/missing")
        .await
        .assert_status_not_found();
}

// ============= Admin =============

#[tokio::test]
async fn test_admin_requires_token() {
    let server = test_server().await;

    for path in ["/api/v1/admin/health", "/api/v1/admin/config", "/api/v1/admin/connections"] {
        server.get(path).await.assert_status_unauthorized();
    }

    let tokens = register(&server, "admin@example.com").await;
    let token = tokens["access_token"].as_str().unwrap();

    let health: Value = server
        .get("/api/v1/admin/health")
        .authorization_bearer(token)
        .await
        .json();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["active_connections"], 0);

    let config: Value = server
        .get("/api/v1/admin/config")
        .authorization_bearer(token)
        .await
        .json();
    assert_eq!(config["business_hours"], "09:00-17:00");
    assert!(config.get("jwt_secret_env").is_none());
    assert!(config.get("database").is_none());

    let connections: Value = server
        .get("/api/v1/admin/connections")
        .authorization_bearer(token)
        .await
        .json();
    assert_eq!(connections["total_connections"], 0);
}

#[tokio::test]
async fn test_refresh_token_is_rejected_on_protected_routes() {
    let server = test_server().await;
    let tokens = register(&server, "refresh@example.com").await;
    let refresh = tokens["refresh_token"].as_str().unwrap();
    let user_id = tokens["user_id"].as_str().unwrap();

    server
        .get("/api/v1/admin/config")
        .authorization_bearer(refresh)
        .await
        .assert_status_unauthorized();
    server
        .get(&format!("/api/v1/users/profile/{}", user_id))
        .authorization_bearer(refresh)
        .await
        .assert_status_unauthorized();
}

// ============= Rate limiting =============

#[tokio::test]
async fn test_rate_limit() {
    let mut config = ChatbotxConfig::default();
    config.rate_limit.requests = 2;
    let server = TestServer::new(create_app(test_state(config).await)).unwrap();

    server.get("/health").await.assert_status_ok();
    server.get("/health").await.assert_status_ok();

    let response = server.get("/health").await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Rate limit exceeded. Please try again later.");
}
