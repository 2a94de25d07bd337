//! Adapter for the HTML link-list site, a first-year-only supplement.
//!
//! One index page links to per-subject pages; each subject page carries
//! cloud-storage share links. Link text containing "note" (any case) files
//! under `Notes/`, everything else is treated as past-year-question
//! material under `PYQs/`, both beneath `COMMON/SEM1/{subject}`. The link
//! count per subject is unknown until the page is parsed, so the run's
//! expected total is raised as each subject is discovered to keep the
//! progress percentage meaningful.

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use super::{RunContext, SourceAdapter};
use crate::download::{DownloadTask, Locator};
use crate::drive::extract_file_id;
use crate::fetch::FetchError;
use crate::stats::{RunStatistics, Source};
use crate::taxonomy::{COMMON_BRANCH, sanitize_name, semester_folder};

/// All supplementary first-year content lands in this semester.
const TARGET_SEMESTER: u8 = 1;

/// A subject page discovered on the index.
#[derive(Debug, PartialEq, Eq)]
struct SubjectPage {
    name: String,
    url: String,
}

/// An anchor pairing link text with a storage share link.
#[derive(Debug, PartialEq, Eq)]
struct ScrapedLink {
    text: String,
    href: String,
}

/// The link-scrape adapter.
#[derive(Debug, Default)]
pub struct LinkScrapeAdapter;

#[async_trait]
impl SourceAdapter for LinkScrapeAdapter {
    fn source(&self) -> Source {
        Source::LinkScrape
    }

    async fn run(&self, ctx: &RunContext, stats: &mut RunStatistics) -> Result<(), FetchError> {
        let index_url = format!("{}/html/content.html", ctx.urls.scrape);
        let html = ctx.fetcher.get_text(&index_url).await?;
        let subjects = parse_subject_links(&html, &ctx.urls.scrape);
        info!(subjects = subjects.len(), "subject pages discovered");

        for subject in &subjects {
            let html = match ctx.fetcher.get_text(&subject.url).await {
                Ok(html) => html,
                Err(error) => {
                    warn!(subject = %subject.name, error = %error, "subject page fetch failed; skipping");
                    continue;
                }
            };

            let links = parse_storage_links(&html);
            debug!(subject = %subject.name, links = links.len(), "storage links found");
            if links.is_empty() {
                continue;
            }
            stats.add_expected(links.len() as u64);

            let subject_dir = ctx
                .materials_dir
                .join(COMMON_BRANCH)
                .join(semester_folder(TARGET_SEMESTER))
                .join(sanitize_name(&subject.name));

            for link in links {
                let display_name = format!("{}{}", Source::LinkScrape.prefix(), link.text);

                let Some(file_id) = extract_file_id(&link.href) else {
                    stats.record_error(
                        Source::LinkScrape,
                        &display_name,
                        &format!("unrecognized storage link: {}", link.href),
                    );
                    continue;
                };

                let bucket = if link.text.to_lowercase().contains("note") {
                    "Notes"
                } else {
                    "PYQs"
                };
                let file_name = format!(
                    "{}{}.pdf",
                    Source::LinkScrape.prefix(),
                    sanitize_name(&link.text)
                );
                let task = DownloadTask {
                    locator: Locator::StorageFileId(file_id),
                    dest: subject_dir.join(bucket).join(file_name),
                    display_name,
                    source: Source::LinkScrape,
                };

                let outcome = ctx.engine.download(&task).await;
                stats.record(task.source, &task.display_name, &outcome);
            }
        }

        Ok(())
    }
}

#[allow(clippy::expect_used)]
fn anchor_selector(fragment: &str) -> Selector {
    Selector::parse(fragment).expect("static anchor selector must parse")
}

/// Extracts subject pages from the index: anchors whose href mentions
/// `contents`, ends in `.html`, and is not the index itself.
fn parse_subject_links(html: &str, base: &str) -> Vec<SubjectPage> {
    let document = Html::parse_document(html);
    let selector = anchor_selector(r#"a[href*="contents"]"#);

    document
        .select(&selector)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let name = anchor.text().collect::<String>().trim().to_string();
            if name.is_empty() || !href.contains(".html") || href.contains("content.html") {
                return None;
            }
            let url = if href.starts_with("http") {
                href.to_string()
            } else {
                format!("{base}/html/{href}")
            };
            Some(SubjectPage { name, url })
        })
        .collect()
}

/// Extracts (text, href) pairs for every storage-domain anchor on a subject
/// page.
fn parse_storage_links(html: &str) -> Vec<ScrapedLink> {
    let document = Html::parse_document(html);
    let selector = anchor_selector(r#"a[href*="drive.google.com"]"#);

    document
        .select(&selector)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?.to_string();
            let text = anchor.text().collect::<String>().trim().to_string();
            (!text.is_empty() && !href.is_empty()).then_some(ScrapedLink { text, href })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const INDEX_HTML: &str = r#"
        <html><body>
          <a href="contents-physics.html">Applied Physics</a>
          <a href="contents-maths.html">Applied Maths</a>
          <a href="content.html">Home</a>
          <a href="contents-broken">No Extension</a>
          <a href="https://elsewhere.example/contents-chem.html">Chemistry</a>
          <a href="unrelated.html">Unrelated</a>
        </body></html>
    "#;

    #[test]
    fn test_parse_subject_links_filters_and_resolves() {
        let subjects = parse_subject_links(INDEX_HTML, "https://site.example");
        assert_eq!(
            subjects,
            vec![
                SubjectPage {
                    name: "Applied Physics".to_string(),
                    url: "https://site.example/html/contents-physics.html".to_string(),
                },
                SubjectPage {
                    name: "Applied Maths".to_string(),
                    url: "https://site.example/html/contents-maths.html".to_string(),
                },
                SubjectPage {
                    name: "Chemistry".to_string(),
                    url: "https://elsewhere.example/contents-chem.html".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_subject_links_excludes_index_itself() {
        let subjects = parse_subject_links(INDEX_HTML, "https://site.example");
        assert!(subjects.iter().all(|s| s.name != "Home"));
        assert!(subjects.iter().all(|s| !s.url.ends_with("/content.html")));
    }

    #[test]
    fn test_parse_storage_links_pairs_text_with_href() {
        let html = r#"
            <html><body>
              <a href="https://drive.google.com/file/d/AAA/view">Unit 1 Notes</a>
              <a href="https://drive.google.com/file/d/BBB/view">2022 Paper</a>
              <a href="https://other.example/file">Not storage</a>
              <a href="https://drive.google.com/file/d/CCC/view">   </a>
            </body></html>
        "#;
        let links = parse_storage_links(html);
        assert_eq!(
            links,
            vec![
                ScrapedLink {
                    text: "Unit 1 Notes".to_string(),
                    href: "https://drive.google.com/file/d/AAA/view".to_string(),
                },
                ScrapedLink {
                    text: "2022 Paper".to_string(),
                    href: "https://drive.google.com/file/d/BBB/view".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_note_classification_is_case_insensitive() {
        // Mirrors the adapter's bucket choice.
        for text in ["Unit 1 NOTES", "notes bundle", "Handwritten Note"] {
            assert!(text.to_lowercase().contains("note"), "{text}");
        }
        assert!(!"2022 End Term Paper".to_lowercase().contains("note"));
    }
}
