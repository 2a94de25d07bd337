//! Adapter for the semester/branch REST catalog, an all-semester supplement.
//!
//! Semesters 1-2 are queried once under a default branch code and land in
//! COMMON; semesters 3+ iterate every known branch code through the static
//! branch mapping, skipping unmapped codes. Each subject's detail record
//! exposes identifiers for up to four material types; the `book` field backs
//! both the notes and books types, a quirk of the source that is preserved
//! rather than corrected.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{RunContext, SourceAdapter};
use crate::download::{DownloadTask, Locator};
use crate::drive::extract_file_id;
use crate::fetch::FetchError;
use crate::stats::{RunStatistics, Source};
use crate::taxonomy::{
    COMMON_BRANCH, format_subject_for_query, is_common_semester, map_rest_branch_code,
    sanitize_name, semester_folder,
};

/// Semester slugs understood by the REST API, with their numeric labels.
const SEMESTERS: &[(&str, u8)] = &[
    ("firstsemesters", 1),
    ("secondsemesters", 2),
    ("thirdsemesters", 3),
    ("fourthsemesters", 4),
    ("fifthsemesters", 5),
    ("sixthsemesters", 6),
    ("seventhsemesters", 7),
];

/// Branch codes the REST API accepts.
const BRANCH_CODES: &[&str] = &[
    "CSE", "IT", "CST", "ITE", "ECE", "EE", "EEE", "ICE", "ME", "CE", "MAE",
];

/// Material types the API serves per subject.
const MATERIAL_TYPES: &[&str] = &["notes", "pyq", "books", "practicalfile"];

/// Branch code used for the shared first-year queries.
const DEFAULT_BRANCH_CODE: &str = "CSE";

/// Subject list responses are either a JSON array of slugs or one
/// newline-delimited string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SubjectList {
    Slugs(Vec<String>),
    Text(String),
}

impl SubjectList {
    fn into_slugs(self) -> Vec<String> {
        match self {
            Self::Slugs(slugs) => slugs,
            Self::Text(text) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// A subject's detail record. Absent material-type fields simply mean that
/// type has nothing to offer.
#[derive(Debug, Default, Deserialize)]
struct SubjectDetail {
    #[serde(default)]
    book: Option<String>,
    #[serde(default, rename = "pYq")]
    pyq: Option<String>,
    #[serde(default)]
    practical: Option<String>,
}

impl SubjectDetail {
    /// Identifier backing one material type. Notes and books intentionally
    /// share the `book` field, matching the remote record.
    fn material_id(&self, material_type: &str) -> Option<&str> {
        match material_type {
            "notes" | "books" => self.book.as_deref(),
            "pyq" => self.pyq.as_deref(),
            "practicalfile" => self.practical.as_deref(),
            _ => None,
        }
    }
}

/// Detail responses arrive as a single record or a one-element array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DetailResponse {
    Many(Vec<SubjectDetail>),
    One(SubjectDetail),
}

impl DetailResponse {
    fn into_first(self) -> Option<SubjectDetail> {
        match self {
            Self::Many(mut details) => {
                if details.is_empty() {
                    None
                } else {
                    Some(details.swap_remove(0))
                }
            }
            Self::One(detail) => Some(detail),
        }
    }
}

/// One item in a material listing, carrying a storage view link.
#[derive(Debug, Deserialize)]
struct MaterialItem {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default, rename = "webViewLink")]
    web_view_link: Option<String>,
}

/// The REST-catalog adapter.
#[derive(Debug, Default)]
pub struct RestCatalogAdapter;

#[async_trait]
impl SourceAdapter for RestCatalogAdapter {
    fn source(&self) -> Source {
        Source::RestCatalog
    }

    async fn run(&self, ctx: &RunContext, stats: &mut RunStatistics) -> Result<(), FetchError> {
        for (slug, label) in SEMESTERS {
            info!(semester = label, "processing semester");

            if is_common_semester(*label) {
                self.process_semester(ctx, stats, slug, *label, DEFAULT_BRANCH_CODE, COMMON_BRANCH)
                    .await;
                continue;
            }

            for code in BRANCH_CODES {
                let Some(branch) = map_rest_branch_code(code) else {
                    debug!(code, "branch code unmapped; excluded");
                    continue;
                };
                self.process_semester(ctx, stats, slug, *label, code, branch)
                    .await;
            }
        }

        Ok(())
    }
}

impl RestCatalogAdapter {
    async fn process_semester(
        &self,
        ctx: &RunContext,
        stats: &mut RunStatistics,
        semester_slug: &str,
        label: u8,
        branch_code: &str,
        branch_folder: &str,
    ) {
        let url = format!("{}/btech/{semester_slug}/{branch_code}", ctx.urls.rest);
        let subjects = match ctx.fetcher.get_json::<SubjectList>(&url).await {
            Ok(list) => list.into_slugs(),
            Err(error) => {
                warn!(
                    branch = branch_code,
                    semester = label,
                    error = %error,
                    "subject listing failed; skipping"
                );
                return;
            }
        };
        debug!(branch = branch_code, semester = label, subjects = subjects.len(), "subjects listed");

        for subject in &subjects {
            let formatted = format_subject_for_query(subject);
            let url = format!(
                "{}/btech/{semester_slug}/{branch_code}/{}",
                ctx.urls.rest,
                urlencoding::encode(&formatted)
            );
            let detail = match ctx.fetcher.get_json::<DetailResponse>(&url).await {
                Ok(response) => response.into_first(),
                Err(error) => {
                    warn!(subject = %subject, error = %error, "subject detail failed; skipping");
                    continue;
                }
            };
            let Some(detail) = detail else {
                debug!(subject = %subject, "no detail record");
                continue;
            };

            let subject_dir = ctx
                .materials_dir
                .join(branch_folder)
                .join(semester_folder(label))
                .join(sanitize_name(subject));

            for material_type in MATERIAL_TYPES {
                let Some(material_id) = detail.material_id(material_type) else {
                    continue;
                };
                self.process_material_type(ctx, stats, material_type, material_id, &subject_dir)
                    .await;
            }
        }
    }

    async fn process_material_type(
        &self,
        ctx: &RunContext,
        stats: &mut RunStatistics,
        material_type: &str,
        material_id: &str,
        subject_dir: &std::path::Path,
    ) {
        let url = format!("{}/drive/{material_type}/{material_id}", ctx.urls.rest);
        let items: Vec<MaterialItem> = match ctx.fetcher.get_json(&url).await {
            Ok(items) => items,
            Err(error) => {
                warn!(material_type, error = %error, "material listing failed; skipping");
                return;
            }
        };
        if items.is_empty() {
            debug!(material_type, "no materials");
            return;
        }

        let dir = subject_dir.join(material_type.to_uppercase());

        for item in items {
            let Some(link) = item.web_view_link.as_deref() else {
                continue;
            };
            let display_name = format!("{}{}", Source::RestCatalog.prefix(), item.name);

            let file_id = item
                .id
                .clone()
                .or_else(|| extract_file_id(link));
            let Some(file_id) = file_id else {
                stats.record_error(
                    Source::RestCatalog,
                    &display_name,
                    &format!("unrecognized storage link: {link}"),
                );
                continue;
            };

            let file_name = format!(
                "{}{}",
                Source::RestCatalog.prefix(),
                sanitize_name(&item.name)
            );
            let task = DownloadTask {
                locator: Locator::StorageFileId(file_id),
                dest: dir.join(file_name),
                display_name,
                source: Source::RestCatalog,
            };

            let outcome = ctx.engine.download(&task).await;
            stats.record(task.source, &task.display_name, &outcome);
        }
    }
}
