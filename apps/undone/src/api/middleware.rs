//! # Middleware Module
//!
//! Global rate limiting for the HTTP API.
//!
//! ## Configuration
//!
//! - `[server] rate_limit` / `UNDONE_RATE_LIMIT`: requests per second
//!   across all clients (default: 20, 0 disables)

use super::error::json_response;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde_json::json;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Global rate limiter type alias.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Create a limiter allowing `requests_per_second`.
///
/// Returns `None` for 0, which disables limiting.
pub fn create_rate_limiter(requests_per_second: u32) -> Option<GlobalRateLimiter> {
    let rps = NonZeroU32::new(requests_per_second)?;
    Some(Arc::new(RateLimiter::direct(Quota::per_second(rps))))
}

/// Rate limiting middleware.
///
/// Returns 429 Too Many Requests if the limit is exceeded.
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if limiter.check().is_ok() {
        next.run(request).await
    } else {
        tracing::warn!(event = "rate_limited", path = %request.uri().path(), "Rate limit exceeded");
        json_response(
            StatusCode::TOO_MANY_REQUESTS,
            &json!({ "error": "Too Many Requests" }),
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rate_limiter() {
        let limiter = create_rate_limiter(2).expect("enabled");
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }

    #[test]
    fn test_zero_disables() {
        assert!(create_rate_limiter(0).is_none());
    }
}
