//! User authentication.
//!
//! - [`jwt`]: Argon2id password hashing and HS256 access/refresh tokens
//! - [`middleware`]: bearer-token layer and the [`middleware::AuthUser`] extractor
//!
//! Protected routes are wrapped with
//! `axum::middleware::from_fn_with_state(auth_service, auth_middleware)`;
//! handlers then take `AuthUser(claims)` to learn who is calling.
//!
//! The signing secret is read from the environment variable named by
//! `[auth].jwt_secret_env` in `chatbotx.toml` (default `JWT_SECRET`).

/// Password hashing and token issuing.
pub mod jwt;
/// Bearer-token middleware and claims extractor.
pub mod middleware;
