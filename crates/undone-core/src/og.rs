//! # Preview Image Extraction
//!
//! Pulls the share image out of a page's `<head>`: `og:image` first, then
//! `twitter:image`. Attribute order matters (`property`/`name` before
//! `content`), which matches how the scraped pages are generated.

use regex::Regex;
use std::sync::LazyLock;

static OG_IMAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+property=["']og:image["'][^>]+content=["']([^"']+)["']"#)
        .expect("og:image regex should compile")
});

static TWITTER_IMAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+name=["']twitter:image["'][^>]+content=["']([^"']+)["']"#)
        .expect("twitter:image regex should compile")
});

/// Extract the preview image URL from an HTML document.
pub fn extract_og_image(html: &str) -> Option<String> {
    [&*OG_IMAGE_REGEX, &*TWITTER_IMAGE_REGEX]
        .into_iter()
        .find_map(|re| re.captures(html))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn og_image_preferred() {
        let html = r#"<head>
            <meta name="twitter:image" content="https://cdn.test/tw.jpg">
            <meta property="og:image" content="https://cdn.test/og.jpg" />
        </head>"#;
        assert_eq!(extract_og_image(html).as_deref(), Some("https://cdn.test/og.jpg"));
    }

    #[test]
    fn twitter_fallback() {
        let html = r#"<META NAME='twitter:image' CONTENT='https://cdn.test/tw.jpg'>"#;
        assert_eq!(extract_og_image(html).as_deref(), Some("https://cdn.test/tw.jpg"));
    }

    #[test]
    fn extra_attributes_between() {
        let html = r#"<meta data-rh="true" property="og:image" data-x="1" content="https://cdn.test/a.png">"#;
        assert_eq!(extract_og_image(html).as_deref(), Some("https://cdn.test/a.png"));
    }

    #[test]
    fn nothing_found() {
        assert_eq!(extract_og_image("<html><head><title>x</title></head></html>"), None);
        assert_eq!(extract_og_image(""), None);
        // content before property is not recognised
        assert_eq!(
            extract_og_image(r#"<meta content="https://cdn.test/a.png" property="og:image">"#),
            None
        );
    }
}
