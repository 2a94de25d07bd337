//! Run accounting: per-source outcome counters, error records, final report.
//!
//! A single [`RunStatistics`] value is owned by the coordinator and threaded
//! mutably through the source adapters; outcomes are recorded explicitly
//! rather than through shared global state, so the counters stay trivially
//! correct in the sequential run model.

use std::fmt;
use std::time::Instant;

use tracing::{info, warn};

/// Progress is logged every this many processed (downloaded + skipped) files.
const PROGRESS_LOG_INTERVAL: u64 = 10;

/// Identifies which remote catalog a task or outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Hierarchical folder-API catalog, the primary source.
    Catalog,
    /// HTML-scraped first-year link list.
    LinkScrape,
    /// Semester/branch REST catalog.
    RestCatalog,
}

impl Source {
    /// Filename prefix disambiguating a file's origin inside the shared tree.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Catalog => "DN_",
            Self::LinkScrape => "FFT_",
            Self::RestCatalog => "SX_",
        }
    }

    /// Short name used in logs and the final report.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::LinkScrape => "link-scrape",
            Self::RestCatalog => "rest-catalog",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Catalog => 0,
            Self::LinkScrape => 1,
            Self::RestCatalog => 2,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of handing one task to the download engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// File was fetched and written to its destination.
    Downloaded {
        /// Bytes written.
        bytes: u64,
    },
    /// Destination already held a viable copy; nothing was fetched.
    Skipped,
    /// The fetch or write failed; the run continues.
    Failed {
        /// Human-readable failure description.
        message: String,
    },
}

/// One recorded failure, with enough context for a manual retry.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    /// Source the failing task came from.
    pub source: Source,
    /// Prefixed display name of the file.
    pub display_name: String,
    /// Failure description.
    pub message: String,
}

/// Mutable aggregate for one run.
#[derive(Debug)]
pub struct RunStatistics {
    expected_total: u64,
    downloaded: u64,
    skipped: u64,
    errored: u64,
    downloaded_by_source: [u64; 3],
    errors: Vec<ErrorRecord>,
    started: Instant,
}

impl RunStatistics {
    /// Creates statistics seeded with the primary source's expected file
    /// count. The estimate only drives progress percentages; it is refined
    /// upward as variable-size sources discover their link counts and is
    /// never treated as a completion oracle.
    #[must_use]
    pub fn new(expected_total: u64) -> Self {
        Self {
            expected_total,
            downloaded: 0,
            skipped: 0,
            errored: 0,
            downloaded_by_source: [0; 3],
            errors: Vec::new(),
            started: Instant::now(),
        }
    }

    /// Raises the expected total once a variable-size source learns how many
    /// links it will attempt.
    pub fn add_expected(&mut self, count: u64) {
        self.expected_total += count;
    }

    /// Records the outcome of one task.
    pub fn record(&mut self, source: Source, display_name: &str, outcome: &Outcome) {
        match outcome {
            Outcome::Downloaded { .. } => {
                self.downloaded += 1;
                self.downloaded_by_source[source.index()] += 1;
                self.log_progress();
            }
            Outcome::Skipped => {
                self.skipped += 1;
                self.log_progress();
            }
            Outcome::Failed { message } => {
                self.record_error(source, display_name, message);
            }
        }
    }

    /// Records a failure that never became a download attempt, such as a
    /// malformed storage locator.
    pub fn record_error(&mut self, source: Source, display_name: &str, message: &str) {
        warn!(source = %source, file = display_name, error = message, "task failed");
        self.errored += 1;
        self.errors.push(ErrorRecord {
            source,
            display_name: display_name.to_string(),
            message: message.to_string(),
        });
    }

    /// Files downloaded this run.
    #[must_use]
    pub fn downloaded(&self) -> u64 {
        self.downloaded
    }

    /// Files skipped because a viable copy already existed.
    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Tasks that ended in failure.
    #[must_use]
    pub fn errored(&self) -> u64 {
        self.errored
    }

    /// Downloads attributed to one source.
    #[must_use]
    pub fn downloaded_for(&self, source: Source) -> u64 {
        self.downloaded_by_source[source.index()]
    }

    /// Failure records accumulated so far.
    #[must_use]
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// Downloaded plus skipped, the numerator of the progress percentage.
    #[must_use]
    pub fn processed(&self) -> u64 {
        self.downloaded + self.skipped
    }

    /// Progress percentage against the (estimated) expected total.
    ///
    /// Cosmetic: the estimate may be low, so this can exceed 100.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent_processed(&self) -> f64 {
        if self.expected_total == 0 {
            return 0.0;
        }
        self.processed() as f64 / self.expected_total as f64 * 100.0
    }

    fn errors_for(&self, source: Source) -> usize {
        self.errors.iter().filter(|e| e.source == source).count()
    }

    fn log_progress(&self) {
        let processed = self.processed();
        if processed > 0 && processed % PROGRESS_LOG_INTERVAL == 0 {
            info!(
                processed,
                expected = self.expected_total,
                percent = %format!("{:.1}", self.percent_processed()),
                catalog = self.downloaded_by_source[0],
                link_scrape = self.downloaded_by_source[1],
                rest_catalog = self.downloaded_by_source[2],
                skipped = self.skipped,
                "progress"
            );
        }
    }

    /// Emits the final report.
    pub fn log_report(&self) {
        info!(
            downloaded = self.downloaded,
            skipped = self.skipped,
            errors = self.errored,
            processed = self.processed(),
            expected = self.expected_total,
            percent = %format!("{:.1}", self.percent_processed()),
            elapsed_secs = self.started.elapsed().as_secs(),
            "run complete"
        );
        info!(
            catalog = self.downloaded_by_source[0],
            link_scrape = self.downloaded_by_source[1],
            rest_catalog = self.downloaded_by_source[2],
            "downloads by source"
        );
        if self.errored > 0 {
            warn!(
                catalog = self.errors_for(Source::Catalog),
                link_scrape = self.errors_for(Source::LinkScrape),
                rest_catalog = self.errors_for(Source::RestCatalog),
                "errors by source; rerun is safe - existing files are skipped"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_record_downloaded_counts_per_source() {
        let mut stats = RunStatistics::new(10);
        stats.record(Source::Catalog, "DN_a.pdf", &Outcome::Downloaded { bytes: 5 });
        stats.record(Source::Catalog, "DN_b.pdf", &Outcome::Downloaded { bytes: 5 });
        stats.record(
            Source::RestCatalog,
            "SX_c.pdf",
            &Outcome::Downloaded { bytes: 5 },
        );

        assert_eq!(stats.downloaded(), 3);
        assert_eq!(stats.downloaded_for(Source::Catalog), 2);
        assert_eq!(stats.downloaded_for(Source::RestCatalog), 1);
        assert_eq!(stats.downloaded_for(Source::LinkScrape), 0);
    }

    #[test]
    fn test_record_skipped_counts_toward_processed_not_source() {
        let mut stats = RunStatistics::new(10);
        stats.record(Source::Catalog, "DN_a.pdf", &Outcome::Skipped);
        assert_eq!(stats.skipped(), 1);
        assert_eq!(stats.downloaded(), 0);
        assert_eq!(stats.processed(), 1);
        assert_eq!(stats.downloaded_for(Source::Catalog), 0);
    }

    #[test]
    fn test_record_failed_keeps_error_context() {
        let mut stats = RunStatistics::new(10);
        stats.record(
            Source::LinkScrape,
            "FFT_notes.pdf",
            &Outcome::Failed {
                message: "HTTP 500".to_string(),
            },
        );

        assert_eq!(stats.errored(), 1);
        let record = &stats.errors()[0];
        assert_eq!(record.source, Source::LinkScrape);
        assert_eq!(record.display_name, "FFT_notes.pdf");
        assert_eq!(record.message, "HTTP 500");
    }

    #[test]
    fn test_percent_processed_uses_refined_expected_total() {
        let mut stats = RunStatistics::new(10);
        for i in 0..5 {
            stats.record(
                Source::Catalog,
                &format!("DN_{i}"),
                &Outcome::Downloaded { bytes: 1 },
            );
        }
        assert!((stats.percent_processed() - 50.0).abs() < f64::EPSILON);

        stats.add_expected(10);
        assert!((stats.percent_processed() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percent_processed_zero_expected_is_zero() {
        let stats = RunStatistics::new(0);
        assert!((stats.percent_processed() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_source_prefixes() {
        assert_eq!(Source::Catalog.prefix(), "DN_");
        assert_eq!(Source::LinkScrape.prefix(), "FFT_");
        assert_eq!(Source::RestCatalog.prefix(), "SX_");
    }
}
