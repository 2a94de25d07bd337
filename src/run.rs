//! Run coordinator: sequences the three sources and reports.
//!
//! Ordering is fixed and load-bearing: the catalog source establishes the
//! COMMON bucket that the link-scrape and REST sources later add to. There
//! is no concurrency between sources; rerun-after-rerun idempotence comes
//! from the engine's skip-if-viable check, not from locking.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::download::{Engine, RateLimiter};
use crate::fetch::{Fetcher, RetryPolicy};
use crate::sources::{
    CatalogAdapter, LinkScrapeAdapter, RestCatalogAdapter, RunContext, SourceAdapter, SourceUrls,
};
use crate::stats::RunStatistics;

/// Expected file count of the primary source. A hardcoded estimate used
/// only for progress percentages; variable-size sources raise it as their
/// link counts become known.
const EXPECTED_CATALOG_FILES: u64 = 2131;

/// Everything a run needs to know before it starts.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Root of the unified materials tree.
    pub materials_dir: PathBuf,
    /// Remote base URLs, overridable for tests and mirrors.
    pub urls: SourceUrls,
    /// Retry policy for metadata fetches.
    pub retry: RetryPolicy,
    /// Forces one pacing interval for every host; `Some(0ms)` effectively
    /// disables pacing.
    pub rate_limit_override: Option<Duration>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            materials_dir: PathBuf::from("./material"),
            urls: SourceUrls::default(),
            retry: RetryPolicy::default(),
            rate_limit_override: None,
        }
    }
}

/// One-shot batch runner.
pub struct Runner {
    ctx: RunContext,
}

impl Runner {
    /// Builds the shared fetcher, engine, and rate limiter from the config.
    #[must_use]
    pub fn new(config: RunConfig) -> Self {
        let limiter = Arc::new(match config.rate_limit_override {
            Some(interval) if interval.is_zero() => RateLimiter::disabled(),
            Some(interval) => RateLimiter::with_fixed_interval(interval),
            None => RateLimiter::new(),
        });
        let ctx = RunContext {
            fetcher: Fetcher::new(config.retry),
            engine: Engine::new(limiter),
            materials_dir: config.materials_dir,
            urls: config.urls,
        };
        Self { ctx }
    }

    /// Runs all three sources in their fixed order and returns the final
    /// statistics. A source whose entry fetch fails is logged and the
    /// remaining sources still run; per-file failures are already absorbed
    /// further down.
    pub async fn execute(&self) -> RunStatistics {
        let mut stats = RunStatistics::new(EXPECTED_CATALOG_FILES);

        let adapters: [Box<dyn SourceAdapter>; 3] = [
            Box::new(CatalogAdapter),
            Box::new(LinkScrapeAdapter),
            Box::new(RestCatalogAdapter),
        ];

        info!(
            materials_dir = %self.ctx.materials_dir.display(),
            "mirror run starting"
        );

        for adapter in &adapters {
            let source = adapter.source();
            info!(source = %source, "source starting");
            match adapter.run(&self.ctx, &mut stats).await {
                Ok(()) => info!(source = %source, "source finished"),
                Err(e) => {
                    error!(source = %source, error = %e, "source failed; continuing with remaining sources");
                }
            }
        }

        stats.log_report();
        stats
    }
}
