//! # undone CLI Module
//!
//! This module implements the CLI interface for undone.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `config` - Show the effective configuration (secrets masked)
//! - `render` - Render the portfolio grid from a CMS export

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use undone_core::UndoneError;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// undone - backend for the undone.jp site
///
/// Contact relay, CMS proxy, thumbnail fetchers and the Slack
/// registration bot.
#[derive(Parser, Debug)]
#[command(name = "undone")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides the config file)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show the effective configuration
    Config,

    /// Render the portfolio grid from a CMS export
    Render {
        /// CMS list response or array of production records (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output HTML file
        #[arg(short, long)]
        output: PathBuf,

        /// Only this platform (YouTube, TikTok, DMM TV, その他)
        #[arg(long)]
        platform: Option<String>,

        /// Only this tag
        #[arg(long)]
        tag: Option<String>,

        /// Only featured productions
        #[arg(long)]
        featured: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), UndoneError> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(config, host, port).await,
        Some(Commands::Config) | None => cmd_config(&config, cli.json_mode),
        Some(Commands::Render {
            input,
            output,
            platform,
            tag,
            featured,
        }) => cmd_render(&config, &input, &output, platform, tag, featured),
    }
}
