//! # Configuration
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. built-in defaults (production values for undone.jp)
//! 2. an optional TOML file (`--config undone.toml`)
//! 3. environment variables
//!
//! Secrets are environment-only; the TOML file cannot carry them.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8788
//!
//! [site]
//! allowed_origins = ["https://undone.jp", "https://www.undone.jp"]
//! cors_origin = "https://undone.jp"
//!
//! [upstream]
//! microcms_url = "https://example.microcms.io/api/v1"
//! timeout_secs = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use undone_core::primitives::DEFAULT_ALLOWED_ORIGINS;

/// Configuration loading failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {message}")]
    Read { path: String, message: String },

    #[error("invalid config file: {0}")]
    Parse(String),
}

// =============================================================================
// SECTIONS
// =============================================================================

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests per second across all clients; 0 disables the limiter.
    pub rate_limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8788,
            rate_limit: 20,
        }
    }
}

/// `[site]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Origins accepted by the Origin/Referer guard.
    pub allowed_origins: Vec<String>,
    /// `Access-Control-Allow-Origin` of the CMS proxy.
    pub cors_origin: String,
    /// Sender of contact-form mail.
    pub contact_from: String,
    /// Recipients of contact-form mail.
    pub contact_to: Vec<String>,
    /// Host name mentioned in mail footers and page titles.
    pub site_name: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|o| (*o).to_string())
                .collect(),
            cors_origin: "https://undone.jp".to_string(),
            contact_from: "Undone Contact <contact@undone.jp>".to_string(),
            contact_to: vec!["support@undone.jp".to_string()],
            site_name: "undone.jp".to_string(),
        }
    }
}

/// `[upstream]` section: third-party base URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub resend_url: String,
    pub microcms_url: String,
    pub youtube_url: String,
    pub tiktok_oembed_url: String,
    pub slack_api_url: String,
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            resend_url: "https://api.resend.com".to_string(),
            microcms_url: "https://7ektxje7is.microcms.io/api/v1".to_string(),
            youtube_url: "https://www.googleapis.com/youtube/v3".to_string(),
            tiktok_oembed_url: "https://www.tiktok.com/oembed".to_string(),
            slack_api_url: "https://slack.com/api".to_string(),
            timeout_secs: 10,
        }
    }
}

/// API keys and signing secrets. Environment only.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    pub resend_api_key: Option<String>,
    pub microcms_api_key: Option<String>,
    pub microcms_write_key: Option<String>,
    pub youtube_api_key: Option<String>,
    pub slack_signing_secret: Option<String>,
    pub slack_bot_token: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Secrets")
            .field("resend_api_key", &mask(&self.resend_api_key))
            .field("microcms_api_key", &mask(&self.microcms_api_key))
            .field("microcms_write_key", &mask(&self.microcms_write_key))
            .field("youtube_api_key", &mask(&self.youtube_api_key))
            .field("slack_signing_secret", &mask(&self.slack_signing_secret))
            .field("slack_bot_token", &mask(&self.slack_bot_token))
            .finish()
    }
}

impl Secrets {
    /// `(env var, is set)` pairs, for status output.
    pub fn summary(&self) -> [(&'static str, bool); 6] {
        [
            ("RESEND_API_KEY", self.resend_api_key.is_some()),
            ("MICROCMS_API_KEY", self.microcms_api_key.is_some()),
            ("MICROCMS_WRITE_KEY", self.microcms_write_key.is_some()),
            ("YOUTUBE_API_KEY", self.youtube_api_key.is_some()),
            ("SLACK_SIGNING_SECRET", self.slack_signing_secret.is_some()),
            ("SLACK_BOT_TOKEN", self.slack_bot_token.is_some()),
        ]
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub upstream: UpstreamConfig,
    #[serde(skip)]
    pub secrets: Secrets,
}

impl Config {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load defaults, the optional file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_env_from(|key| std::env::var(key).ok());

        tracing::info!(
            host = %config.server.host,
            port = config.server.port,
            origins = config.site.allowed_origins.len(),
            microcms_url = %config.upstream.microcms_url,
            secrets = ?config.secrets,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Overlay environment variables read through `lookup`.
    ///
    /// Empty values count as unset.
    ///
    /// - `RESEND_API_KEY`, `MICROCMS_API_KEY`, `MICROCMS_WRITE_KEY`,
    ///   `YOUTUBE_API_KEY`, `SLACK_SIGNING_SECRET`, `SLACK_BOT_TOKEN`
    /// - `UNDONE_ALLOWED_ORIGINS`: comma-separated origin list
    /// - `UNDONE_CORS_ORIGIN`
    /// - `UNDONE_RATE_LIMIT`: requests per second, 0 disables
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secrets = &mut self.secrets;
        for (key, slot) in [
            ("RESEND_API_KEY", &mut secrets.resend_api_key),
            ("MICROCMS_API_KEY", &mut secrets.microcms_api_key),
            ("MICROCMS_WRITE_KEY", &mut secrets.microcms_write_key),
            ("YOUTUBE_API_KEY", &mut secrets.youtube_api_key),
            ("SLACK_SIGNING_SECRET", &mut secrets.slack_signing_secret),
            ("SLACK_BOT_TOKEN", &mut secrets.slack_bot_token),
        ] {
            if let Some(value) = get(key) {
                *slot = Some(value);
            }
        }

        if let Some(origins) = get("UNDONE_ALLOWED_ORIGINS") {
            self.site.allowed_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(origin) = get("UNDONE_CORS_ORIGIN") {
            self.site.cors_origin = origin;
        }
        if let Some(rate) = get("UNDONE_RATE_LIMIT") {
            match rate.trim().parse() {
                Ok(rps) => self.server.rate_limit = rps,
                Err(_) => tracing::warn!(value = %rate, "ignoring invalid UNDONE_RATE_LIMIT"),
            }
        }
    }

    /// Rendered TOML of the non-secret settings.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
