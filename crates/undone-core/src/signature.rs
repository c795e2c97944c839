//! # Slack Request Signatures
//!
//! Slack signs every slash-command and interactivity request:
//!
//! ```text
//! base      = "v0:" + X-Slack-Request-Timestamp + ":" + raw body
//! signature = "v0=" + hex(HMAC-SHA256(signing_secret, base))
//! ```
//!
//! The verifier recomputes the digest over the raw body bytes and compares
//! it in constant time. The caller supplies the current Unix time so the
//! replay window can be tested without a clock.

use crate::primitives::{SLACK_REPLAY_WINDOW_SECS, SLACK_SIGNATURE_VERSION};
use crate::types::SignatureError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Verifies Slack request signatures for one signing secret.
#[derive(Clone)]
pub struct SlackVerifier {
    secret: Vec<u8>,
    max_age_secs: i64,
}

impl std::fmt::Debug for SlackVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackVerifier")
            .field("secret", &"<redacted>")
            .field("max_age_secs", &self.max_age_secs)
            .finish()
    }
}

impl SlackVerifier {
    /// Create a verifier with the default five-minute replay window.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            max_age_secs: SLACK_REPLAY_WINDOW_SECS,
        }
    }

    /// Override the replay window.
    #[must_use]
    pub fn with_max_age(mut self, secs: i64) -> Self {
        self.max_age_secs = secs;
        self
    }

    fn digest(&self, timestamp: &str, body: &[u8]) -> Result<Vec<u8>, SignatureError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| SignatureError::Mismatch)?;
        mac.update(SLACK_SIGNATURE_VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        mac.update(body);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Compute the `v0=<hex>` signature for a timestamp and body.
    pub fn sign(&self, timestamp: &str, body: &[u8]) -> Result<String, SignatureError> {
        let digest = self.digest(timestamp, body)?;
        Ok(format!("{}={}", SLACK_SIGNATURE_VERSION, hex::encode(digest)))
    }

    /// Verify a request.
    ///
    /// `now` is the current Unix time in seconds.
    pub fn verify(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
        now: i64,
    ) -> Result<(), SignatureError> {
        let (Some(timestamp), Some(signature)) = (timestamp, signature) else {
            return Err(SignatureError::MissingHeaders);
        };

        let ts: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| SignatureError::MalformedTimestamp)?;
        if now.saturating_sub(ts).saturating_abs() > self.max_age_secs {
            return Err(SignatureError::Stale);
        }

        let provided = signature
            .strip_prefix(SLACK_SIGNATURE_VERSION)
            .and_then(|s| s.strip_prefix('='))
            .and_then(|h| hex::decode(h).ok())
            .ok_or(SignatureError::MalformedSignature)?;

        let expected = self.digest(timestamp, body)?;
        if provided.len() != expected.len() {
            return Err(SignatureError::Mismatch);
        }

        if bool::from(expected.as_slice().ct_eq(provided.as_slice())) {
            Ok(())
        } else {
            Err(SignatureError::Mismatch)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
