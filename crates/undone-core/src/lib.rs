//! # undone-core
//!
//! Pure decision logic for the undone.jp backend - THE LOGIC.
//!
//! Every endpoint of the site backend is "check the request, call a third
//! party, relay the answer". This crate owns the *check* half and the
//! content shaping, so the HTTP layer stays a thin shell:
//!
//! - `origin` - Origin/Referer allow-list (cross-site request guard)
//! - `validate` - contact form field rules
//! - `signature` - Slack HMAC request verification
//! - `command` - `/jisseki` argument parsing
//! - `platform` - platform detection, YouTube ids
//! - `allowlist` - outbound host allow-lists, URL/id list parsing
//! - `og` - `og:image` extraction
//! - `portfolio` - CMS records, grid cards, filters
//!
//! ## Architectural Constraints
//!
//! - NO async, NO network, NO clocks, NO environment access
//! - Errors are values; nothing here panics on user input

// =============================================================================
// MODULES
// =============================================================================

pub mod allowlist;
pub mod command;
pub mod og;
pub mod origin;
pub mod platform;
pub mod portfolio;
pub mod primitives;
pub mod signature;
pub mod types;
pub mod validate;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{
    CommandError, ContactField, OriginError, OriginHeader, SignatureError, UndoneError,
    ValidationError,
};

// =============================================================================
// RE-EXPORTS: Request Guards
// =============================================================================

pub use allowlist::{HostPolicy, parse_id_list, parse_url_list, youtube_batches};
pub use origin::OriginGuard;
pub use signature::SlackVerifier;
pub use validate::{ContactForm, ContactSubmission};

// =============================================================================
// RE-EXPORTS: Content
// =============================================================================

pub use command::CommandArgs;
pub use og::extract_og_image;
pub use platform::{Platform, is_valid_youtube_id, youtube_id};
pub use portfolio::{
    Card, Facets, Filter, Production, ProductionDraft, ProductionList, ThumbnailIndex,
    VideoDetails, build_cards, facets,
};
