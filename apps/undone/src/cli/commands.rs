//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use crate::api::PortfolioQuery;
use crate::config::Config;
use crate::render::portfolio_page;
use std::path::Path;
use undone_core::{Production, ProductionList, ThumbnailIndex, UndoneError, build_cards, facets};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of a CMS export accepted by `render` (50 MB).
const MAX_EXPORT_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), UndoneError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| UndoneError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(UndoneError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Load the configuration file (if any) and the environment.
pub fn load_config(path: Option<&Path>) -> Result<Config, UndoneError> {
    Config::load(path).map_err(|e| UndoneError::IoError(e.to_string()))
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), UndoneError> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    println!("undone server starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", config.server.host);
    println!("  Port:     {}", config.server.port);
    println!("  CMS:      {}", config.upstream.microcms_url);
    println!();
    println!("Endpoints:");
    println!("  POST /api/contact           - Contact form relay");
    println!("  GET  /api/microcms          - CMS proxy");
    println!("  GET  /api/youtube           - YouTube details");
    println!("  GET  /api/tiktok            - TikTok thumbnails");
    println!("  GET  /api/dmm-thumbnail     - DMM TV thumbnails");
    println!("  POST /api/slack-jisseki     - Slack /jisseki");
    println!("  POST /api/slack-interactions - Slack modal and buttons");
    println!("  GET  /portfolio             - Portfolio grid");
    println!("  GET  /health                - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", config.server.host, config.server.port);
    api::run_server(&addr, config)
        .await
        .map_err(|e| UndoneError::IoError(format!("Server error: {}", e)))
}

// =============================================================================
// CONFIG COMMAND
// =============================================================================

/// Print the effective configuration. Secrets are shown as set/unset only.
pub fn cmd_config(config: &Config, json_mode: bool) -> Result<(), UndoneError> {
    let secrets = config.secrets.summary();

    if json_mode {
        let secrets: serde_json::Map<String, serde_json::Value> = secrets
            .iter()
            .map(|(name, set)| ((*name).to_string(), serde_json::Value::Bool(*set)))
            .collect();
        let output = serde_json::json!({
            "server": config.server,
            "site": config.site,
            "upstream": config.upstream,
            "secrets": secrets,
        });
        let text = serde_json::to_string_pretty(&output)
            .map_err(|e| UndoneError::SerializationError(e.to_string()))?;
        println!("{}", text);
        return Ok(());
    }

    let toml = config
        .to_toml()
        .map_err(|e| UndoneError::SerializationError(e.to_string()))?;
    println!("{}", toml);
    println!("[secrets]");
    for (name, set) in secrets {
        println!("{:<22} {}", name, if set { "set" } else { "unset" });
    }
    Ok(())
}

// =============================================================================
// RENDER COMMAND
// =============================================================================

/// Parse a CMS export: a list response or a bare array of records.
pub fn parse_export(text: &str) -> Result<Vec<Production>, UndoneError> {
    let parsed = if text.trim_start().starts_with('[') {
        serde_json::from_str::<Vec<Production>>(text)
    } else {
        serde_json::from_str::<ProductionList>(text).map(|list| list.contents)
    };
    parsed.map_err(|e| UndoneError::SerializationError(format!("Invalid CMS export: {}", e)))
}

/// Render the portfolio grid to a file.
///
/// Offline: YouTube thumbnails are derived from video ids, other platforms
/// render without thumbnails.
pub fn cmd_render(
    config: &Config,
    input: &Path,
    output: &Path,
    platform: Option<String>,
    tag: Option<String>,
    featured: bool,
) -> Result<(), UndoneError> {
    validate_file_size(input, MAX_EXPORT_FILE_SIZE)?;
    let text = std::fs::read_to_string(input)
        .map_err(|e| UndoneError::IoError(format!("Cannot read '{}': {}", input.display(), e)))?;
    let productions = parse_export(&text)?;

    let filter = PortfolioQuery {
        platform,
        tag,
        featured: featured.then(|| "true".to_string()),
    }
    .into_filter();
    let cards = build_cards(&productions, &filter, &ThumbnailIndex::default());
    let page = portfolio_page(&cards, &facets(&productions), &filter, &config.site.site_name);

    std::fs::write(output, page.into_string())
        .map_err(|e| UndoneError::IoError(format!("Cannot write '{}': {}", output.display(), e)))?;

    println!(
        "Rendered {} of {} productions to {}",
        cards.len(),
        productions.len(),
        output.display()
    );
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"{
        "contents": [
            {"id": "a", "title": "MV One", "url": "https://youtu.be/dQw4w9WgXcQ", "platform": "YouTube", "role": "撮影", "tag": "MV", "featured": true},
            {"id": "b", "title": "Short", "url": "https://www.tiktok.com/@u/video/1", "platform": "TikTok", "role": "編集", "tag": "SNS", "featured": false}
        ],
        "totalCount": 2, "offset": 0, "limit": 100
    }"#;

    #[test]
    fn parses_list_and_array() {
        assert_eq!(parse_export(EXPORT).expect("list").len(), 2);
        let array = r#"[{"id": "x", "title": "t", "url": "https://vimeo.com/1"}]"#;
        assert_eq!(parse_export(array).expect("array").len(), 1);
        assert_eq!(parse_export(r#"{"contents": []}"#).expect("empty").len(), 0);
        assert!(parse_export("not json").is_err());
    }

    #[test]
    fn renders_filtered_grid() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("productions.json");
        let output = dir.path().join("portfolio.html");
        std::fs::write(&input, EXPORT).expect("write");

        cmd_render(
            &Config::default(),
            &input,
            &output,
            Some("YouTube".to_string()),
            None,
            false,
        )
        .expect("render");

        let html = std::fs::read_to_string(&output).expect("read");
        assert!(html.contains("MV One"));
        assert!(!html.contains("Short"));
        assert!(html.contains("https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg"));
    }

    #[test]
    fn render_rejects_missing_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = cmd_render(
            &Config::default(),
            &dir.path().join("missing.json"),
            &dir.path().join("out.html"),
            None,
            None,
            false,
        );
        assert!(matches!(result, Err(UndoneError::IoError(_))));
    }
}
