//! The retrying metadata fetcher shared by all source adapters.

use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::error::FetchError;
use super::retry::RetryPolicy;

/// Browser-like User-Agent sent on every request; some of the hosting
/// backends refuse requests without one.
pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Pause after each successful metadata fetch, bounding the request rate
/// against shared-hosting backends.
const INTER_REQUEST_PAUSE: Duration = Duration::from_millis(10);

/// Retrying HTTP client for JSON and HTML metadata endpoints.
///
/// Create once per run and reuse; the underlying client pools connections.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl Fetcher {
    /// Creates a fetcher with the given retry policy.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration, which does not happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(policy: RetryPolicy) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client, policy }
    }

    /// Fetches a URL and decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] after retries are exhausted, or
    /// [`FetchError::Decode`] when the body is not the expected shape.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::decode(url, e))
    }

    /// Fetches a URL as text, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns the last [`FetchError`] once `max_attempts` is exhausted.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.try_get(url).await {
                Ok(body) => {
                    tokio::time::sleep(INTER_REQUEST_PAUSE).await;
                    return Ok(body);
                }
                Err(error) if attempt < self.policy.max_attempts() => {
                    let delay = self.policy.delay_for(attempt);
                    debug!(
                        url,
                        attempt,
                        max_attempts = self.policy.max_attempts(),
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "metadata fetch failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn try_get(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(self.policy.attempt_timeout())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::timeout(url)
                } else {
                    FetchError::network(url, e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url, status.as_u16()));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::timeout(url)
            } else {
                FetchError::network(url, e)
            }
        })
    }
}
