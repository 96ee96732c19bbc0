//! Chat over plain HTTP: one message in, one reply out.

use crate::{
    types::{
        AppError, ChatRequest, ChatResponse, DeleteHistoryResponse, FeedbackRequest,
        HistoryResponse, MessageResponse, Result,
    },
    AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

/// Recipient reported on every REST reply.
pub const BOT_RECIPIENT: &str = "chatbot";

/// Send a message to the assistant
#[utoipa::path(
    post,
    path = "/api/v1/chat/message",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Empty message")
    ),
    tag = "chat"
)]
pub async fn send_message(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let sender_id = payload
        .sender_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let reply = state
        .respond(&sender_id, &payload.message, &payload.metadata)
        .await;
    if reply.error {
        return Err(AppError::InvalidInput(reply.text));
    }

    Ok(Json(ChatResponse {
        response: reply.text,
        sender_id,
        recipient_id: BOT_RECIPIENT.to_string(),
        timestamp: Utc::now(),
        confidence: reply.confidence,
        intent: reply.intent.as_str().to_string(),
        entities: Vec::new(),
        quick_replies: reply.quick_replies,
        suggestions: reply.suggestions,
    }))
}

/// Stored exchanges for a sender, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/chat/history/{sender_id}",
    params(("sender_id" = String, Path, description = "Sender identifier")),
    responses((status = 200, description = "Chat history", body = HistoryResponse)),
    tag = "chat"
)]
pub async fn get_history(
    State(state): State<AppState>,
    Path(sender_id): Path<String>,
) -> Result<Json<HistoryResponse>> {
    let history = state.db.get_chat_history(&sender_id).await?;
    Ok(Json(HistoryResponse { sender_id, history }))
}

/// Delete a sender's history and conversation context
#[utoipa::path(
    delete,
    path = "/api/v1/chat/history/{sender_id}",
    params(("sender_id" = String, Path, description = "Sender identifier")),
    responses((status = 200, description = "History deleted", body = DeleteHistoryResponse)),
    tag = "chat"
)]
pub async fn delete_history(
    State(state): State<AppState>,
    Path(sender_id): Path<String>,
) -> Result<Json<DeleteHistoryResponse>> {
    let deleted = state.db.delete_chat_history(&sender_id).await?;
    state.responder.forget(&sender_id);
    info!(sender_id = %sender_id, deleted, "Chat history deleted");

    Ok(Json(DeleteHistoryResponse {
        message: "Chat history deleted".to_string(),
        deleted,
    }))
}

/// Rate a reply from 1 to 5
#[utoipa::path(
    post,
    path = "/api/v1/chat/feedback",
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Feedback stored", body = MessageResponse),
        (status = 400, description = "Rating outside 1..=5")
    ),
    tag = "chat"
)]
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<Json<MessageResponse>> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::InvalidInput(
            "rating must be between 1 and 5".to_string(),
        ));
    }

    state
        .db
        .store_feedback(
            &payload.sender_id,
            &payload.message_id,
            payload.rating,
            payload.feedback.as_deref(),
        )
        .await?;
    state.analytics.track_satisfaction(
        &payload.sender_id,
        payload.rating,
        payload.feedback.as_deref(),
    );

    Ok(Json(MessageResponse {
        message: "Feedback received successfully".to_string(),
    }))
}
