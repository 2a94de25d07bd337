//! The download engine: skip check, streamed GET, outcome accounting.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};

use super::error::DownloadError;
use super::rate_limiter::RateLimiter;
use super::task::DownloadTask;
use crate::fetch::USER_AGENT;
use crate::stats::{Outcome, Source};

/// Files at or below this size are treated as failed earlier writes and
/// re-fetched; anything larger is a viable copy and is skipped.
pub const MIN_VIABLE_SIZE: u64 = 100;

/// Whole-request timeout for a download stream. Single attempt, no retry:
/// a partial stream failure leaves the rerun to pick the file up again.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Minimum interval between successive downloads against one host, chosen
/// per source to match the observed tolerance of its backend.
fn pace_for(source: Source) -> Duration {
    match source {
        Source::Catalog => Duration::from_millis(9),
        Source::LinkScrape => Duration::from_millis(125),
        Source::RestCatalog => Duration::from_millis(50),
    }
}

/// Streams task bytes to their destinations.
///
/// All failure modes (network, non-2xx, filesystem) are captured in the
/// returned [`Outcome`]; the engine never propagates an error to the
/// calling adapter.
#[derive(Debug, Clone)]
pub struct Engine {
    client: reqwest::Client,
    limiter: Arc<RateLimiter>,
}

impl Engine {
    /// Creates an engine sharing the given rate limiter.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration, which does not happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client, limiter }
    }

    /// Downloads one task, or skips it when the destination already holds a
    /// viable copy. Reruns are therefore cheap and idempotent.
    #[instrument(level = "debug", skip(self, task), fields(name = %task.display_name))]
    pub async fn download(&self, task: &DownloadTask) -> Outcome {
        if let Ok(meta) = tokio::fs::metadata(&task.dest).await
            && meta.len() > MIN_VIABLE_SIZE
        {
            debug!(path = %task.dest.display(), size = meta.len(), "already present; skipping");
            return Outcome::Skipped;
        }

        let url = task.locator.download_url();
        self.limiter.acquire(&url, pace_for(task.source)).await;

        match self.fetch_to_file(&url, &task.dest).await {
            Ok(bytes) => {
                info!(
                    source = %task.source,
                    name = %task.display_name,
                    size = %format_size(bytes),
                    "downloaded"
                );
                Outcome::Downloaded { bytes }
            }
            Err(error) => {
                // Drop any partial write so the rerun retries this file
                // instead of skipping a truncated copy.
                let _ = tokio::fs::remove_file(&task.dest).await;
                Outcome::Failed {
                    message: error.to_string(),
                }
            }
        }
    }

    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        let response = self
            .client
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DownloadError::timeout(url)
                } else {
                    DownloadError::network(url, e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::io(parent, e))?;
        }

        let file = File::create(dest)
            .await
            .map_err(|e| DownloadError::io(dest, e))?;
        let mut writer = BufWriter::new(file);
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                if e.is_timeout() {
                    DownloadError::timeout(url)
                } else {
                    DownloadError::network(url, e)
                }
            })?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| DownloadError::io(dest, e))?;
            written += chunk.len() as u64;
        }

        // Success is only reported once the writer has flushed; the HTTP
        // response completing is not enough on slow disks.
        writer.flush().await.map_err(|e| DownloadError::io(dest, e))?;
        Ok(written)
    }
}

/// Renders a byte count as a human-readable size for log lines.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let exponent = (bytes.ilog2() / 10).min(3) as usize;
    let value = bytes as f64 / f64::from(1u32 << (10 * exponent as u32));
    if exponent == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{value:.2} {}", UNITS[exponent])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::download::task::Locator;

    fn test_engine() -> Engine {
        Engine::new(Arc::new(RateLimiter::disabled()))
    }

    fn task_for(url: &str, dest: &Path) -> DownloadTask {
        DownloadTask {
            locator: Locator::DirectUrl(url.to_string()),
            dest: dest.to_path_buf(),
            display_name: "DN_test.pdf".to_string(),
            source: Source::Catalog,
        }
    }

    #[tokio::test]
    async fn test_download_streams_body_to_destination() {
        let server = MockServer::start().await;
        let content = vec![b'x'; 4096];
        Mock::given(method("GET"))
            .and(path("/file.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(content.clone()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("CSE").join("SEM3").join("DN_file.pdf");
        let task = task_for(&format!("{}/file.pdf", server.uri()), &dest);

        let outcome = test_engine().download(&task).await;
        assert_eq!(outcome, Outcome::Downloaded { bytes: 4096 });
        assert_eq!(std::fs::read(&dest).unwrap(), content);
    }

    #[tokio::test]
    async fn test_download_skips_existing_viable_file() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("DN_present.pdf");
        std::fs::write(&dest, vec![b'y'; 500]).unwrap();

        // URL is never hit; an unroutable locator proves the skip is local.
        let task = task_for("http://127.0.0.1:1/never", &dest);
        let outcome = test_engine().download(&task).await;
        assert_eq!(outcome, Outcome::Skipped);
    }

    #[tokio::test]
    async fn test_download_refetches_below_viability_threshold() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/file.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'z'; 300]))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("DN_stub.pdf");
        // 100 bytes exactly is NOT viable; the threshold is strict.
        std::fs::write(&dest, vec![0u8; 100]).unwrap();

        let task = task_for(&format!("{}/file.pdf", server.uri()), &dest);
        let outcome = test_engine().download(&task).await;
        assert_eq!(outcome, Outcome::Downloaded { bytes: 300 });
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), 300);
    }

    #[tokio::test]
    async fn test_download_non_200_is_failed_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.pdf"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("DN_gone.pdf");
        let task = task_for(&format!("{}/gone.pdf", server.uri()), &dest);

        let outcome = test_engine().download(&task).await;
        match outcome {
            Outcome::Failed { message } => assert!(message.contains("404"), "got {message}"),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(!dest.exists(), "failed download must not leave a file");
    }

    #[tokio::test]
    async fn test_download_unreachable_host_is_failed_outcome() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("DN_unreachable.pdf");
        let task = task_for("http://127.0.0.1:1/file.pdf", &dest);

        let outcome = test_engine().download(&task).await;
        assert!(matches!(outcome, Outcome::Failed { .. }));
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }
}
