//! # API Errors
//!
//! Every failure leaves the server as `{"error": "<message>"}` with a JSON
//! content type. Upstream details are logged, never returned.

use crate::upstream::UpstreamError;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use undone_core::{OriginError, UndoneError, ValidationError};

/// Content type of every JSON response.
pub const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Serialize `body` with the JSON content type.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8));
    response
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// Error returned by a handler or guard.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Cross-site request rejected by the Origin/Referer guard.
    #[error(transparent)]
    Origin(#[from] OriginError),

    /// Malformed or invalid request.
    #[error("{0}")]
    BadRequest(String),

    /// Slack signature missing or wrong.
    #[error("Unauthorized")]
    Unauthorized,

    /// A required secret is not set.
    #[error("{0}")]
    Configuration(&'static str),

    /// A third party failed; `message` is what the client sees.
    #[error("{message}")]
    Upstream {
        message: &'static str,
        #[source]
        source: UpstreamError,
    },
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Origin(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Configuration(_) | Self::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wrap an upstream failure with the message shown to the client.
    pub fn upstream(message: &'static str) -> impl FnOnce(UpstreamError) -> Self {
        move |source| Self::Upstream { message, source }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<UndoneError> for ApiError {
    fn from(e: UndoneError) -> Self {
        match e {
            UndoneError::Origin(e) => Self::Origin(e),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Origin(e) => {
                tracing::warn!(event = "origin_rejected", reason = %e, "Cross-site request rejected");
            }
            Self::Unauthorized => {
                tracing::warn!(event = "auth_failure", "Slack request rejected");
            }
            Self::Configuration(message) => {
                tracing::error!(%message, "missing configuration");
            }
            Self::Upstream { message, source } => {
                tracing::error!(error = %source, %message, "upstream failure");
            }
            Self::BadRequest(_) => {}
        }
        let message = self.to_string();
        json_response(self.status(), &ErrorBody { error: &message })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use undone_core::{ContactField, OriginHeader};

    #[test]
    fn statuses() {
        assert_eq!(
            ApiError::from(OriginError::Forbidden(OriginHeader::Referer)).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(ValidationError::MissingFields).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Configuration("Missing API key").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn messages() {
        assert_eq!(
            ApiError::from(ValidationError::InvalidFormat(ContactField::Email)).to_string(),
            "Invalid email format"
        );
        assert_eq!(
            ApiError::from(UndoneError::InvalidLimit).to_string(),
            "Invalid limit parameter. Must be between 1 and 100."
        );
        assert_eq!(
            ApiError::from(OriginError::Malformed(OriginHeader::Origin)).to_string(),
            "CSRF: Invalid origin format"
        );
    }

    #[test]
    fn response_is_json() {
        let response = ApiError::BadRequest("Invalid request body".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some(JSON_UTF8)
        );
    }
}
