//! # `/jisseki` Command Arguments
//!
//! ```text
//! /jisseki <url> <role> [tag] [--featured]
//! ```
//!
//! Tokens are whitespace separated. `--featured` may appear anywhere.

use crate::types::CommandError;
use serde::{Deserialize, Serialize};

/// Flag that marks a production as featured.
pub const FEATURED_FLAG: &str = "--featured";

/// Parsed `/jisseki` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandArgs {
    pub url: String,
    pub role: String,
    pub tag: String,
    pub featured: bool,
}

impl CommandArgs {
    /// Split command text into arguments without validating them.
    pub fn parse(text: &str) -> Self {
        let mut featured = false;
        let mut positional = text.split_whitespace().filter(|token| {
            if *token == FEATURED_FLAG {
                featured = true;
                false
            } else {
                true
            }
        });

        let url = positional.next().unwrap_or_default().to_string();
        let role = positional.next().unwrap_or_default().to_string();
        let tag = positional.next().unwrap_or_default().to_string();
        // Drain so a trailing flag is still seen.
        positional.for_each(drop);

        Self {
            url,
            role,
            tag,
            featured,
        }
    }

    /// Reject arguments that cannot produce a registration.
    pub fn validate(self) -> Result<Self, CommandError> {
        if self.url.is_empty() {
            return Err(CommandError::MissingUrl);
        }
        if self.role.is_empty() {
            return Err(CommandError::MissingRole);
        }
        Ok(self)
    }

    /// The tag, if one was given.
    pub fn tag(&self) -> Option<&str> {
        Some(self.tag.as_str()).filter(|t| !t.is_empty())
    }
}

// =============================================================================
// TESTS
// =============================================================================
