//! Streaming download engine with idempotent skip behavior.
//!
//! The engine consumes [`DownloadTask`]s produced by the source adapters.
//! For each task it checks the destination for an already-viable copy,
//! paces the request through a per-host rate limiter, streams the response
//! body to disk, and reports an [`crate::stats::Outcome`] - it never lets a
//! failure escape to the calling adapter.

mod engine;
mod error;
pub mod rate_limiter;
mod task;

pub use engine::{Engine, MIN_VIABLE_SIZE, format_size};
pub use error::DownloadError;
pub use rate_limiter::RateLimiter;
pub use task::{DownloadTask, Locator};
