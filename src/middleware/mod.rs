//! HTTP middleware applied to the whole router.

/// Sliding-window limiter keyed by client IP.
pub mod rate_limit;
/// Access log line plus `X-Process-Time`.
pub mod timing;

pub use rate_limit::{rate_limit_middleware, Limit, RateLimiter};
pub use timing::timing_middleware;
