//! # Core Type Definitions
//!
//! Error types for every decision the core makes:
//! - Origin/Referer allow-list rejections (`OriginError`)
//! - Contact form validation failures (`ValidationError`)
//! - Slack signature failures (`SignatureError`)
//! - Slash-command usage errors (`CommandError`)
//! - The umbrella `UndoneError`
//!
//! The `Display` output of the request-facing errors is exactly the message
//! returned to clients, so handlers can forward `to_string()` unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// REQUEST HEADERS
// =============================================================================

/// Which request header an origin check was performed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginHeader {
    /// The `Origin` header (falls back to `Referer` on POST endpoints).
    Origin,
    /// The `Referer` header (GET endpoints).
    Referer,
}

impl fmt::Display for OriginHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Origin => f.write_str("origin"),
            Self::Referer => f.write_str("referer"),
        }
    }
}

/// Origin/Referer allow-list rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OriginError {
    /// The header parsed but its origin is not allowed.
    #[error("CSRF: Invalid {0}")]
    Forbidden(OriginHeader),

    /// The header is not an absolute URL.
    #[error("CSRF: Invalid {0} format")]
    Malformed(OriginHeader),
}

// =============================================================================
// CONTACT FORM
// =============================================================================

/// A field of the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    Name,
    Company,
    Email,
    Category,
    Message,
}

impl ContactField {
    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Company => "company",
            Self::Email => "email",
            Self::Category => "category",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contact form validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `name`, `email` or `message` is missing or empty.
    #[error("Missing required fields")]
    MissingFields,

    /// A field is too long, contains control characters, or (for `email`)
    /// does not look like an address.
    #[error("Invalid {0} format")]
    InvalidFormat(ContactField),
}

// =============================================================================
// SLACK
// =============================================================================

/// Slack request signature failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// `X-Slack-Request-Timestamp` or `X-Slack-Signature` is absent.
    #[error("missing Slack signature headers")]
    MissingHeaders,

    /// The timestamp header is not an integer.
    #[error("malformed Slack request timestamp")]
    MalformedTimestamp,

    /// The timestamp is outside the replay window.
    #[error("stale Slack request timestamp")]
    Stale,

    /// The signature header is not `v0=<hex>`.
    #[error("malformed Slack signature")]
    MalformedSignature,

    /// The signature does not match the body.
    #[error("Slack signature mismatch")]
    Mismatch,
}

/// `/jisseki` usage error.
///
/// Rendered as the ephemeral reply shown to the invoking user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("❌ URLを指定してください\n例: `/jisseki https://youtu.be/xxxxx 撮影・編集 ドラマ`")]
    MissingUrl,

    #[error("❌ 担当業務を指定してください\n例: `/jisseki https://youtu.be/xxxxx 撮影・編集 ドラマ`")]
    MissingRole,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the undone core.
///
/// - No silent failures
/// - Use `Result<T, UndoneError>` for fallible operations
/// - The core never panics; all errors are recoverable
#[derive(Debug, Error)]
pub enum UndoneError {
    #[error(transparent)]
    Origin(#[from] OriginError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Command(#[from] CommandError),

    /// The CMS `limit` query parameter is out of range or not a number.
    #[error("Invalid limit parameter. Must be between 1 and 100.")]
    InvalidLimit,

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
