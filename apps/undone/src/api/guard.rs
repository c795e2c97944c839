//! # Request Guards
//!
//! Middleware that decides whether a request reaches its handler.
//!
//! - `contact_origin_guard` - `Origin` (falling back to `Referer`) must be
//!   an allowed site origin
//! - `referer_guard` - `Referer` must be an allowed site origin
//! - `slack_signature_guard` - `X-Slack-Signature` must match the raw body
//!
//! Requests without the inspected header pass the origin guards; only
//! browsers send them, and browsers are what the guards defend against.
//! A header that is present but unreadable is rejected as malformed.

use super::{AppState, error::ApiError};
use axum::{
    body::{Body, to_bytes},
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::{SystemTime, UNIX_EPOCH};
use undone_core::{OriginError, OriginHeader};

/// Largest Slack payload buffered for signature checks (1 MiB).
const MAX_SLACK_BODY: usize = 1024 * 1024;

/// Slack request timestamp header.
pub const SLACK_TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Slack signature header.
pub const SLACK_SIGNATURE_HEADER: &str = "x-slack-signature";

fn header_str<'a>(headers: &'a HeaderMap, name: impl header::AsHeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

// =============================================================================
// ORIGIN GUARDS
// =============================================================================

/// Like `header_str`, but a present header that is not visible ASCII is
/// malformed rather than absent.
fn origin_header<'a>(
    headers: &'a HeaderMap,
    name: header::HeaderName,
    kind: OriginHeader,
) -> Result<Option<&'a str>, OriginError> {
    headers
        .get(name)
        .map(|v| v.to_str().map_err(|_| OriginError::Malformed(kind)))
        .transpose()
}

/// Guard for state-changing browser requests.
pub async fn contact_origin_guard(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let headers = request.headers();
    let origin = match origin_header(headers, header::ORIGIN, OriginHeader::Origin)? {
        Some(origin) => Some(origin),
        None => origin_header(headers, header::REFERER, OriginHeader::Origin)?,
    };
    state.origin_guard.check(origin, OriginHeader::Origin)?;
    Ok(next.run(request).await)
}

/// Guard for the thumbnail fetchers.
pub async fn referer_guard(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let referer = origin_header(request.headers(), header::REFERER, OriginHeader::Referer)?;
    state.origin_guard.check(referer, OriginHeader::Referer)?;
    Ok(next.run(request).await)
}

// =============================================================================
// SLACK SIGNATURE
// =============================================================================

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Verify Slack's HMAC signature over the raw body.
///
/// The body is buffered, checked and handed on unchanged. Without a
/// configured signing secret every request passes.
pub async fn slack_signature_guard(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let Some(verifier) = state.verifier.as_deref() else {
        return Ok(next.run(request).await);
    };

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_SLACK_BODY).await.map_err(|e| {
        ApiError::BadRequest(format!("Invalid request body: {e}")).into_response()
    })?;

    let timestamp = header_str(&parts.headers, SLACK_TIMESTAMP_HEADER);
    let signature = header_str(&parts.headers, SLACK_SIGNATURE_HEADER);
    if let Err(e) = verifier.verify(timestamp, signature, &bytes, unix_now()) {
        tracing::warn!(event = "auth_failure", reason = %e, "Slack signature check failed");
        return Err(ApiError::Unauthorized.into_response());
    }

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}
