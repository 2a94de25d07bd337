//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use lectern_core::fetch::DEFAULT_MAX_ATTEMPTS;

/// Mirror educational materials from multiple remote catalogs into one
/// local library.
///
/// Lectern walks three remote catalogs in sequence and lays their files out
/// under one branch/semester/subject/folder tree. Reruns are cheap: files
/// already present are skipped, so an interrupted or partially-failed run
/// is simply run again.
#[derive(Parser, Debug)]
#[command(name = "lectern")]
#[command(author, version, about)]
pub struct Args {
    /// Root directory of the materials tree
    #[arg(short = 'd', long, default_value = "./material")]
    pub materials_dir: PathBuf,

    /// Maximum attempts for metadata fetches (1-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_ATTEMPTS as u8, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub max_retries: u8,

    /// Fixed delay between requests to the same host in milliseconds,
    /// replacing the per-source defaults (0 disables pacing)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub rate_limit: Option<u64>,

    /// Override the folder-catalog base URL
    #[arg(long, value_name = "URL")]
    pub catalog_url: Option<String>,

    /// Override the link-list site base URL
    #[arg(long, value_name = "URL")]
    pub scrape_url: Option<String>,

    /// Override the REST catalog base URL
    #[arg(long, value_name = "URL")]
    pub rest_url: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
