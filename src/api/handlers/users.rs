use crate::{
    auth::middleware::AuthUser,
    types::{AppError, LoginRequest, RegisterRequest, Result, TokenResponse, UserProfile},
    AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::DateTime;
use tracing::info;
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 8;

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered successfully", body = TokenResponse),
        (status = 400, description = "Invalid input or user already exists")
    ),
    tag = "users"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>> {
    let email = payload.email.trim().to_lowercase();
    if !email.contains('@') || payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "A valid email is required and the password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput("name is required".to_string()));
    }

    if state.db.get_user_by_email(&email).await?.is_some() {
        return Err(AppError::InvalidInput("User already exists".to_string()));
    }

    let password_hash = state.auth_service.hash_password(&payload.password)?;
    let user_id = Uuid::new_v4().to_string();
    state
        .db
        .create_user(&user_id, &email, &password_hash, payload.name.trim())
        .await?;
    info!(user_id = %user_id, "User registered");

    Ok(Json(state.auth_service.generate_tokens(&user_id, &email)?))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "users"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let user = state
        .db
        .get_user_by_email(&payload.email.trim().to_lowercase())
        .await?
        .ok_or_else(|| AppError::Auth("Invalid credentials".to_string()))?;

    if !state
        .auth_service
        .verify_password(&payload.password, &user.password_hash)?
    {
        return Err(AppError::Auth("Invalid credentials".to_string()));
    }

    Ok(Json(state.auth_service.generate_tokens(&user.id, &user.email)?))
}

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/api/v1/users/profile/{user_id}",
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User profile", body = UserProfile),
        (status = 401, description = "Missing token or another user's profile"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>> {
    if claims.sub != user_id {
        return Err(AppError::Auth(
            "Cannot access another user's profile".to_string(),
        ));
    }

    let user = state
        .db
        .get_user_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfile {
        id: user.id,
        email: user.email,
        name: user.name,
        created_at: DateTime::from_timestamp(user.created_at, 0).unwrap_or_default(),
    }))
}
