//! Retrying HTTP client for metadata endpoints.
//!
//! Every source adapter walks its remote hierarchy through this module. The
//! client retries transient failures with a linear backoff, enforces a fixed
//! per-attempt timeout, and pauses briefly after each successful fetch so the
//! aggregate metadata request rate stays polite toward small hosting
//! backends. Download-stream fetches deliberately do NOT go through this
//! client; they are single-attempt with a longer timeout (see the download
//! engine).

mod client;
mod error;
mod retry;

pub use client::Fetcher;
pub(crate) use client::USER_AGENT;
pub use error::FetchError;
pub use retry::{DEFAULT_MAX_ATTEMPTS, RetryPolicy};
