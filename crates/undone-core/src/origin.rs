//! # Origin Allow-List
//!
//! Cross-site request guard shared by the browser-facing endpoints.
//!
//! A request is rejected only when it *carries* an `Origin`/`Referer` header
//! whose origin is not on the list. Requests without the header (curl,
//! server-to-server) pass, matching how browsers attach these headers.

use crate::primitives::DEFAULT_ALLOWED_ORIGINS;
use crate::types::{OriginError, OriginHeader};
use url::Url;

/// Allow-list of `scheme://host[:port]` origins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginGuard {
    allowed: Vec<String>,
}

impl Default for OriginGuard {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_ORIGINS.iter().copied())
    }
}

impl OriginGuard {
    /// Build a guard from configured origins.
    ///
    /// Entries are trimmed and a trailing `/` is dropped so that
    /// `https://undone.jp/` and `https://undone.jp` are the same entry.
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = origins
            .into_iter()
            .map(|o| o.as_ref().trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();
        Self { allowed }
    }

    /// The configured origins.
    pub fn origins(&self) -> &[String] {
        &self.allowed
    }

    /// Check a header value against the allow-list.
    ///
    /// `header` is the raw value of whichever header the caller chose;
    /// `kind` only selects the wording of the error.
    pub fn check(&self, header: Option<&str>, kind: OriginHeader) -> Result<(), OriginError> {
        let Some(raw) = header else {
            return Ok(());
        };

        let origin = origin_of(raw).ok_or(OriginError::Malformed(kind))?;
        if self.allowed.iter().any(|a| *a == origin) {
            Ok(())
        } else {
            Err(OriginError::Forbidden(kind))
        }
    }
}

/// `scheme://host[:port]` of an absolute URL, default ports omitted.
///
/// Returns `None` when `raw` is not an absolute URL.
pub fn origin_of(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    Some(url.origin().ascii_serialization())
}

// =============================================================================
// TESTS
// =============================================================================
