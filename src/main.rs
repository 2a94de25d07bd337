//! CLI entry point for the lectern tool.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use lectern_core::fetch::RetryPolicy;
use lectern_core::run::{RunConfig, Runner};
use lectern_core::sources::SourceUrls;
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let defaults = SourceUrls::default();
    let urls = SourceUrls {
        catalog: args.catalog_url.unwrap_or(defaults.catalog),
        scrape: args.scrape_url.unwrap_or(defaults.scrape),
        rest: args.rest_url.unwrap_or(defaults.rest),
    };

    let config = RunConfig {
        materials_dir: args.materials_dir,
        urls,
        retry: RetryPolicy::with_max_attempts(u32::from(args.max_retries)),
        rate_limit_override: args.rate_limit.map(Duration::from_millis),
    };

    let stats = Runner::new(config).execute().await;

    info!(
        downloaded = stats.downloaded(),
        skipped = stats.skipped(),
        errors = stats.errored(),
        "mirror finished"
    );

    // Per-file failures are already accounted for in the report; only an
    // error escaping the coordinator exits non-zero.
    Ok(())
}
