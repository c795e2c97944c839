//! # Upstream Clients
//!
//! Outbound HTTP to the third parties the site depends on. One shared
//! `reqwest::Client` with the configured timeout; each service lives in its
//! own module as an `impl Upstream` block.
//!
//! - `resend` - transactional email
//! - `microcms` - production records (read, create, delete)
//! - `youtube` - Data API video details
//! - `tiktok` - oEmbed metadata
//! - `dmm` - page scraping for `og:image`
//! - `slack` - `response_url`, `views.open`, `chat.postMessage`

mod dmm;
mod microcms;
mod resend;
mod slack;
mod tiktok;
mod youtube;

pub use microcms::CmsResponse;
pub use resend::Email;
pub use tiktok::OEmbed;
pub use youtube::Snippet;

use crate::config::Config;
use std::sync::Arc;
use std::time::Duration;

/// Error talking to a third-party service.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Connection, TLS or timeout failure.
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("{service} returned {status}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("{service} response could not be parsed: {message}")]
    Parse {
        service: &'static str,
        message: String,
    },

    /// The credential for the service is not configured.
    #[error("{0} not configured")]
    NotConfigured(&'static str),
}

impl UpstreamError {
    /// Upstream HTTP status, if the service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Shared handle to the outbound clients.
#[derive(Clone)]
pub struct Upstream {
    http: reqwest::Client,
    config: Arc<Config>,
}

impl Upstream {
    /// Build the shared client.
    pub fn new(config: Arc<Config>) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream.timeout_secs))
            .build()
            .map_err(|source| UpstreamError::Transport {
                service: "http client",
                source,
            })?;
        Ok(Self { http, config })
    }

    /// The configuration the clients were built with.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Fail with `Status` unless the response is 2xx.
async fn ensure_success(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(UpstreamError::Status {
        service,
        status: status.as_u16(),
        body,
    })
}

fn transport(service: &'static str) -> impl FnOnce(reqwest::Error) -> UpstreamError {
    move |source| UpstreamError::Transport { service, source }
}

fn parse(service: &'static str) -> impl FnOnce(reqwest::Error) -> UpstreamError {
    move |e| UpstreamError::Parse {
        service,
        message: e.to_string(),
    }
}
