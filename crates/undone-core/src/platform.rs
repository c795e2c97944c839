//! # Video Platforms
//!
//! Detection of the hosting platform from a production URL, and YouTube
//! video-id extraction.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use url::Url;

/// An 11-character YouTube video id.
static YOUTUBE_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("youtube id regex should compile")
});

/// Platform a production is published on.
///
/// Serialized with the labels stored in the CMS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
    YouTube,
    TikTok,
    DmmTv,
    #[default]
    Other,
}

impl Platform {
    /// Detect the platform from a URL by substring, as the CMS editors do.
    pub fn detect(url: &str) -> Self {
        if url.contains("youtube.com") || url.contains("youtu.be") {
            Self::YouTube
        } else if url.contains("tiktok.com") {
            Self::TikTok
        } else if url.contains("dmm.com") || url.contains("dmm.co.jp") {
            Self::DmmTv
        } else {
            Self::Other
        }
    }

    /// Label stored in the CMS and shown to users.
    pub const fn label(self) -> &'static str {
        match self {
            Self::YouTube => "YouTube",
            Self::TikTok => "TikTok",
            Self::DmmTv => "DMM TV",
            Self::Other => "その他",
        }
    }

    /// Parse a CMS label; unknown labels map to `Other`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "YouTube" => Self::YouTube,
            "TikTok" => Self::TikTok,
            "DMM TV" => Self::DmmTv,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Platform {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

/// Whether `id` has the shape of a YouTube video id.
pub fn is_valid_youtube_id(id: &str) -> bool {
    YOUTUBE_ID_REGEX.is_match(id)
}

/// Extract the video id from a YouTube watch, short-link or Shorts URL.
pub fn youtube_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;

    if host.contains("youtu.be") {
        let id = parsed.path().trim_start_matches('/');
        return Some(id.to_string()).filter(|id| !id.is_empty());
    }

    if host.contains("youtube.com") {
        if let Some((_, v)) = parsed.query_pairs().find(|(k, _)| k == "v") {
            return Some(v.into_owned()).filter(|id| !id.is_empty());
        }
        if let Some(rest) = parsed.path().strip_prefix("/shorts/") {
            let id = rest.split('/').next().unwrap_or_default();
            return Some(id.to_string()).filter(|id| !id.is_empty());
        }
    }

    None
}

/// Default-quality thumbnail for a YouTube video.
pub fn youtube_thumbnail(id: &str) -> String {
    format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg")
}

// =============================================================================
// TESTS
// =============================================================================
