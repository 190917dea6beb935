//! # Levelcrawl
//!
//! Level-by-level crawler for remote neighbor-lookup services.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                apps/levelcrawl (THE BINARY)           │
//! │                                                       │
//! │  ┌─────────────┐    ┌──────────────────────────────┐  │
//! │  │    CLI      │    │  HttpNeighborSource          │  │
//! │  │   (clap)    │    │  (reqwest + governor)        │  │
//! │  └──────┬──────┘    └──────────────┬───────────────┘  │
//! │         └──────────────┬───────────┘                  │
//! │                        ▼                              │
//! │               ┌──────────────────┐                    │
//! │               │  levelcrawl-core │                    │
//! │               │   (THE LOGIC)    │                    │
//! │               └──────────────────┘                    │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! levelcrawl crawl "Tom Hanks" 2
//! levelcrawl --json-mode -j 16 crawl "Tom Hanks" 3
//! levelcrawl neighbors "Tom Hanks"
//! ```

use clap::Parser;
use levelcrawl::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Logs always go to stderr; stdout carries crawl results only.
/// LEVELCRAWL_LOG_FORMAT=json enables machine-parseable output.
fn init_tracing(verbose: bool) {
    let log_format = std::env::var("LEVELCRAWL_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if verbose {
        "levelcrawl=debug,levelcrawl_core=debug"
    } else {
        "levelcrawl=info,levelcrawl_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
