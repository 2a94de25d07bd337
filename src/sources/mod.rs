//! Source adapters: one per remote catalog.
//!
//! Each adapter walks its source's native hierarchy depth-first, normalizes
//! what it finds into canonical destination paths, and hands download tasks
//! to the engine one at a time. All three share the same failure policy: a
//! fetch failure inside a traversal unit (branch, semester, subject, folder)
//! skips that unit and continues with its siblings; only a failure of the
//! adapter's single entry fetch propagates, and the coordinator catches even
//! that.

mod catalog;
mod linkscrape;
mod restcatalog;

use std::path::PathBuf;

use async_trait::async_trait;

pub use catalog::CatalogAdapter;
pub use linkscrape::LinkScrapeAdapter;
pub use restcatalog::RestCatalogAdapter;

use crate::download::Engine;
use crate::fetch::{FetchError, Fetcher};
use crate::stats::{RunStatistics, Source};

/// Base URLs of the three remote catalogs.
///
/// Overridable so tests (and mirrors) can point the run at other hosts.
#[derive(Debug, Clone)]
pub struct SourceUrls {
    /// Hierarchical folder-API catalog.
    pub catalog: String,
    /// HTML link-list site.
    pub scrape: String,
    /// Semester/branch REST catalog.
    pub rest: String,
}

impl Default for SourceUrls {
    fn default() -> Self {
        Self {
            catalog: "https://api.dotnotes.in".to_string(),
            scrape: "https://fifteenforteen.vercel.app".to_string(),
            rest: "https://server.syllabusx.live".to_string(),
        }
    }
}

/// Shared collaborators handed to every adapter.
#[derive(Debug)]
pub struct RunContext {
    /// Retrying metadata client.
    pub fetcher: Fetcher,
    /// Streaming download engine.
    pub engine: Engine,
    /// Root of the unified materials tree.
    pub materials_dir: PathBuf,
    /// Remote base URLs.
    pub urls: SourceUrls,
}

/// One remote catalog's traversal, yielding download tasks in canonical
/// form.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Which source this adapter mirrors.
    fn source(&self) -> Source;

    /// Walks the source and downloads everything it offers.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] only when the adapter's entry fetch fails;
    /// interior failures are logged and skipped.
    async fn run(&self, ctx: &RunContext, stats: &mut RunStatistics) -> Result<(), FetchError>;
}
