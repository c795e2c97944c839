//! # Fixed Limits and Allow-Lists
//!
//! Compile-time constants shared by the validators and the HTTP layer.
//! Changing any of these changes what the public endpoints accept.

// =============================================================================
// ORIGINS
// =============================================================================

/// Origins allowed to call the browser-facing endpoints.
///
/// The last entry is the Cloudflare Pages preview domain.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://undone.jp",
    "https://www.undone.jp",
    "https://undonejp.pages.dev",
];

// =============================================================================
// CONTACT FORM LIMITS
// =============================================================================

/// Maximum length of the `name` field, in characters.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length of the `company` field, in characters.
pub const MAX_COMPANY_LENGTH: usize = 200;

/// Maximum length of the `email` field (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 320;

/// Maximum length of the `category` field, in characters.
pub const MAX_CATEGORY_LENGTH: usize = 100;

/// Maximum length of the `message` field, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 5000;

// =============================================================================
// THIRD-PARTY HOSTS
// =============================================================================

/// Hosts the TikTok oEmbed fetcher may be asked about.
pub const TIKTOK_HOSTS: &[&str] = &["www.tiktok.com", "tiktok.com", "m.tiktok.com", "vm.tiktok.com"];

/// Hosts the DMM TV page scraper may fetch.
pub const DMM_HOSTS: &[&str] = &["tv.dmm.com", "www.tv.dmm.com"];

/// Maximum number of video ids per YouTube Data API `videos.list` call.
pub const YOUTUBE_BATCH_SIZE: usize = 50;

// =============================================================================
// CMS
// =============================================================================

/// Default and maximum page size for CMS list reads.
pub const MAX_CMS_LIMIT: u32 = 100;

// =============================================================================
// SLACK
// =============================================================================

/// Maximum age, in seconds, of a signed Slack request.
///
/// Requests whose timestamp is further than this from the server clock are
/// rejected as possible replays.
pub const SLACK_REPLAY_WINDOW_SECS: i64 = 60 * 5;

/// Version prefix of the Slack signing scheme.
pub const SLACK_SIGNATURE_VERSION: &str = "v0";
