//! # undone - undone.jp backend
//!
//! The main binary for the undone.jp site backend.
//!
//! This application provides:
//! - HTTP server (axum-based): contact relay, CMS proxy, thumbnail
//!   fetchers, Slack registration bot, portfolio grid
//! - CLI interface for configuration and offline rendering
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    apps/undone (THE BINARY)                  │
//! │                                                              │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────────┐  │
//! │  │   CLI       │    │   HTTP API  │    │  Upstream       │  │
//! │  │  (clap)     │    │   (axum)    │    │  (reqwest)      │  │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬────────┘  │
//! │         │                  │                    │           │
//! │         └──────────────────┼────────────────────┘           │
//! │                            ▼                                │
//! │                    ┌───────────────┐                        │
//! │                    │  undone-core  │                        │
//! │                    │ (THE LOGIC)   │                        │
//! │                    └───────────────┘                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! undone server --host 0.0.0.0 --port 8788
//!
//! # Show the effective configuration
//! undone --config undone.toml config
//!
//! # Render the grid from a CMS export
//! undone render -i productions.json -o portfolio.html --platform YouTube
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use undone::cli;

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // UNDONE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("UNDONE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "undone=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  ██╗   ██╗███╗   ██╗██████╗  ██████╗ ███╗   ██╗███████╗
  ██║   ██║████╗  ██║██╔══██╗██╔═══██╗████╗  ██║██╔════╝
  ██║   ██║██╔██╗ ██║██║  ██║██║   ██║██╔██╗ ██║█████╗
  ██║   ██║██║╚██╗██║██║  ██║██║   ██║██║╚██╗██║██╔══╝
  ╚██████╔╝██║ ╚████║██████╔╝╚██████╔╝██║ ╚████║███████╗
   ╚═════╝ ╚═╝  ╚═══╝╚═════╝  ╚═════╝ ╚═╝  ╚═══╝╚══════╝

  undone.jp backend v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
