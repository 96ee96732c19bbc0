use crate::{
    types::{AppError, MessageResponse, Notification, Result},
    AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};

#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    responses((status = 200, description = "All notifications", body = [Notification])),
    tag = "notifications"
)]
pub async fn list_notifications(State(state): State<AppState>) -> Result<Json<Vec<Notification>>> {
    Ok(Json(state.db.list_notifications().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/notifications/mark-read/{id}",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Marked as read", body = MessageResponse),
        (status = 404, description = "Unknown notification")
    ),
    tag = "notifications"
)]
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    if !state.db.mark_notification_read(&id).await? {
        return Err(AppError::NotFound(format!("Notification '{}' not found", id)));
    }
    Ok(Json(MessageResponse {
        message: "Notification marked as read".to_string(),
    }))
}
