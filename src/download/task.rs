//! Download task representation.

use std::path::PathBuf;

use crate::drive;
use crate::stats::Source;

/// How a task's bytes are addressed remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// A URL that serves file bytes directly.
    DirectUrl(String),
    /// A cloud-storage file id, resolved to a direct-export URL on demand.
    StorageFileId(String),
}

impl Locator {
    /// Resolves the locator to the URL the engine will GET.
    #[must_use]
    pub fn download_url(&self) -> String {
        match self {
            Self::DirectUrl(url) => url.clone(),
            Self::StorageFileId(id) => drive::direct_download_url(id),
        }
    }
}

/// One unit of download work, created by an adapter and consumed exactly
/// once by the engine. Immutable after creation.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    /// Remote address of the bytes.
    pub locator: Locator,
    /// Fully-resolved destination path, sanitized segment by segment.
    pub dest: PathBuf,
    /// Prefixed name used in logs and error records.
    pub display_name: String,
    /// Originating source, for accounting and pacing.
    pub source: Source,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_url_locator_passes_through() {
        let locator = Locator::DirectUrl("https://example.com/a.pdf".to_string());
        assert_eq!(locator.download_url(), "https://example.com/a.pdf");
    }

    #[test]
    fn test_storage_id_locator_synthesizes_export_url() {
        let locator = Locator::StorageFileId("ABC123".to_string());
        assert_eq!(
            locator.download_url(),
            "https://drive.google.com/uc?export=download&id=ABC123"
        );
    }
}
