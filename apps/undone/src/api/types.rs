//! # API Request/Response Types
//!
//! This module defines the JSON and form structures for the HTTP API.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use undone_core::{Filter, Platform};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// CONTACT
// =============================================================================

/// Answer to a relayed contact form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
}

// =============================================================================
// CMS PROXY
// =============================================================================

/// `GET /api/microcms` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CmsQuery {
    pub limit: Option<String>,
}

/// Relayed CMS failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmsErrorResponse {
    pub error: String,
    pub status: u16,
}

// =============================================================================
// THUMBNAIL FETCHERS
// =============================================================================

/// `GET /api/youtube` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdsQuery {
    pub ids: Option<String>,
}

/// Keyed results of a fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsResponse<T> {
    pub items: BTreeMap<String, T>,
}

impl<T> Default for ItemsResponse<T> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }
}

// =============================================================================
// PORTFOLIO
// =============================================================================

/// `GET /portfolio` query. Empty values mean "no filter".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioQuery {
    pub platform: Option<String>,
    pub tag: Option<String>,
    pub featured: Option<String>,
}

impl PortfolioQuery {
    /// Convert to a grid filter.
    pub fn into_filter(self) -> Filter {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Filter {
            platform: non_empty(self.platform).map(|p| Platform::from_label(p.trim())),
            tag: non_empty(self.tag),
            featured: non_empty(self.featured).map(|f| matches!(f.as_str(), "true" | "1" | "on")),
        }
    }
}

// =============================================================================
// SLACK
// =============================================================================

/// Slash command form fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlashCommand {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub response_url: String,
    #[serde(default)]
    pub trigger_id: String,
    #[serde(default)]
    pub channel_id: String,
}

/// Interactivity form: one JSON-encoded `payload` field.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionForm {
    pub payload: String,
}

/// The interaction payloads the bot handles.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Interaction {
    ViewSubmission {
        view: View,
    },
    BlockActions {
        #[serde(default)]
        actions: Vec<BlockAction>,
        #[serde(default)]
        response_url: Option<String>,
    },
    #[serde(other)]
    Unsupported,
}

/// A submitted modal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct View {
    #[serde(default)]
    pub callback_id: String,
    #[serde(default)]
    pub private_metadata: String,
    #[serde(default)]
    pub state: ViewState,
}

/// Input values of a modal: block id → action id → value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub values: HashMap<String, HashMap<String, InputValue>>,
}

/// One input element's state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputValue {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
}

/// A ticked checkbox or selected menu entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectedOption {
    #[serde(default)]
    pub value: String,
}

/// A pressed button.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockAction {
    #[serde(default)]
    pub action_id: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl ViewState {
    fn input(&self, block: &str, action: &str) -> Option<&InputValue> {
        self.values.get(block).and_then(|b| b.get(action))
    }

    /// Trimmed text of an input; empty when unset.
    pub fn text(&self, block: &str, action: &str) -> String {
        self.input(block, action)
            .and_then(|i| i.value.as_deref())
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    /// Whether a checkbox group has `option` ticked.
    pub fn is_checked(&self, block: &str, action: &str, option: &str) -> bool {
        self.input(block, action)
            .is_some_and(|i| i.selected_options.iter().any(|o| o.value == option))
    }
}
