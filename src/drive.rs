//! Cloud-storage link handling.
//!
//! Both supplementary sources hand out share/view links rather than direct
//! byte URLs. The file identifier is pulled out of the link with an ordered
//! set of patterns, then rewritten into the storage service's direct-export
//! download URL.

use std::sync::LazyLock;

use regex::Regex;

/// Ordered extraction patterns: `/file/d/ID` path form first, then the
/// `id=ID` query form, then the short `/d/ID` path form.
static FILE_ID_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        compile_static(r"/file/d/([a-zA-Z0-9_-]+)"),
        compile_static(r"id=([a-zA-Z0-9_-]+)"),
        compile_static(r"/d/([a-zA-Z0-9_-]+)"),
    ]
});

#[allow(clippy::expect_used)]
fn compile_static(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static storage-link pattern must compile")
}

/// Extracts the file identifier from a share/view link.
///
/// Returns `None` when no pattern matches; the owning task is then dropped
/// as a malformed locator and counted as an error by the caller.
#[must_use]
pub fn extract_file_id(link: &str) -> Option<String> {
    FILE_ID_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(link)
            .and_then(|captures| captures.get(1))
            .map(|id| id.as_str().to_string())
    })
}

/// Synthesizes the direct-export download URL for an extracted file id.
#[must_use]
pub fn direct_download_url(file_id: &str) -> String {
    format!("https://drive.google.com/uc?export=download&id={file_id}")
}
