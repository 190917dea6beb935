//! # Levelcrawl CLI Module
//!
//! ## Available Commands
//!
//! - `crawl` - Crawl the neighbor service level by level
//! - `neighbors` - Look up the neighbors of a single vertex
//! - `config` - Show the effective settings

mod commands;

use crate::config::{Settings, SettingsOverrides};
use clap::{Parser, Subcommand};
use levelcrawl_core::CrawlError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Levelcrawl - level-by-level crawler
///
/// Discovers a graph one hop at a time through a remote neighbor-lookup
/// service and prints every vertex grouped by its distance from the start.
#[derive(Parser, Debug)]
#[command(name = "levelcrawl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML config file (default: ./levelcrawl.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the neighbor service
    #[arg(short = 'u', long, global = true)]
    pub service_url: Option<String>,

    /// Expansions in flight per depth (0 = unbounded)
    #[arg(short = 'j', long, global = true)]
    pub max_concurrency: Option<usize>,

    /// Outbound requests per second (0 = unlimited)
    #[arg(long, global = true)]
    pub rate_limit: Option<u32>,

    /// Per-request timeout in milliseconds (0 = none)
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Extra attempts after a transport failure
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// Stop when every lookup of a depth fails
    #[arg(long, global = true, overrides_with = "no_abort_on_dead_depth")]
    pub abort_on_dead_depth: bool,

    /// Keep crawling past a depth where every lookup failed
    #[arg(long, global = true, overrides_with = "abort_on_dead_depth")]
    pub no_abort_on_dead_depth: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl from a start vertex down to a depth bound
    Crawl {
        /// Name of the start vertex
        start: String,

        /// Number of hops to explore
        depth: usize,
    },

    /// Look up the neighbors of one vertex
    Neighbors {
        /// Vertex name
        vertex: String,
    },

    /// Show the effective settings
    Config,
}

impl Cli {
    /// Command-line layer of the settings.
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            service_url: self.service_url.clone(),
            max_concurrency: self.max_concurrency,
            rate_limit: self.rate_limit,
            timeout_ms: self.timeout_ms,
            retries: self.retries,
            abort_on_dead_depth: match (self.abort_on_dead_depth, self.no_abort_on_dead_depth) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            },
        }
    }

    /// Resolve settings through every layer.
    pub fn settings(&self) -> Result<Settings, CrawlError> {
        Ok(Settings::load(self.config.as_deref())?
            .with_env()?
            .with_overrides(&self.overrides()))
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), CrawlError> {
    let settings = cli.settings()?;
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Crawl { start, depth } => cmd_crawl(&settings, json_mode, &start, depth).await,
        Commands::Neighbors { vertex } => cmd_neighbors(&settings, json_mode, &vertex).await,
        Commands::Config => cmd_config(&settings),
    }
}

// =============================================================================
// TESTS
// =============================================================================
