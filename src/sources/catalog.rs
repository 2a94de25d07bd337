//! Adapter for the hierarchical folder-API catalog, the primary source.
//!
//! The remote hierarchy is branch -> semester -> subject -> folder -> file,
//! discovered through a generic `getChild`/`getFiles` endpoint pair rooted
//! at a fixed per-branch node id. First-year semesters collapse into the
//! COMMON bucket exactly once per run: the first branch to list its
//! semesters establishes COMMON, later branches' SEM1/SEM2 nodes are
//! recognized and skipped so the shared material is not downloaded again
//! under every branch.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{RunContext, SourceAdapter};
use crate::download::{DownloadTask, Locator};
use crate::fetch::FetchError;
use crate::stats::{RunStatistics, Source};
use crate::taxonomy::{COMMON_BRANCH, CanonicalPath, is_common_semester, parse_semester_label, sanitize_name};

/// Root node id for each branch. The ids are stable catalog identifiers,
/// not secrets.
const BRANCH_ROOTS: &[(&str, &str)] = &[
    ("AIDS", "1fH0uvhnXRsshqiDzHlR3WF2LVC7PfnQ7"),
    ("AIML", "13moTd7MZzBiAl-0xdUHEtF-xlV_OwlLz"),
    ("CIVIL", "1_OLVAfJQldM4F1F0QU9PBLL0gWXhnv66"),
    ("CSE", "12fczfGql33ZZH9LSFgxcrrOuIAKEzjdh"),
    ("ECE", "1Yo-MxG6locQ4lMKl07CN8lwqvnu-cWt3"),
    ("EEE", "1N-0kK34Qqme71MlznsslSE-RhiAaWRM1"),
    ("IT", "1u0nTa0WLf58jZ42zuLS7anUb7d_Nj99p"),
    ("MECH", "1XLxDgD7iJCbWZx7JbcuRDAfg2NPitVGV"),
];

/// A folder node returned by `getChild`.
#[derive(Debug, Deserialize)]
struct CatalogNode {
    id: String,
    name: String,
}

/// A file entry returned by `getFiles`. Only entries with a non-empty
/// direct-download URL are eligible.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    name: String,
    #[serde(default)]
    url_download: Option<String>,
}

/// The primary-source adapter.
#[derive(Debug, Default)]
pub struct CatalogAdapter;

#[async_trait]
impl SourceAdapter for CatalogAdapter {
    fn source(&self) -> Source {
        Source::Catalog
    }

    async fn run(&self, ctx: &RunContext, stats: &mut RunStatistics) -> Result<(), FetchError> {
        let mut common_established = false;

        for (branch, root_id) in BRANCH_ROOTS {
            info!(branch, "processing branch");

            let url = format!("{}/getChild?id={root_id}", ctx.urls.catalog);
            let semesters: Vec<CatalogNode> = match ctx.fetcher.get_json(&url).await {
                Ok(semesters) => semesters,
                Err(error) => {
                    warn!(branch, error = %error, "branch listing failed; skipping branch");
                    continue;
                }
            };
            if semesters.is_empty() {
                warn!(branch, "branch has no semesters");
            }

            for semester in &semesters {
                let Some(label) = parse_semester_label(&semester.name) else {
                    warn!(branch, node = %semester.name, "unrecognized semester node; skipping");
                    continue;
                };

                let target_branch = if is_common_semester(label) {
                    if common_established {
                        debug!(branch, semester = label, "already mirrored under COMMON; skipping");
                        continue;
                    }
                    COMMON_BRANCH
                } else {
                    branch
                };

                self.walk_semester(ctx, stats, semester, target_branch, label)
                    .await;
            }

            // The first branch whose semesters were listed owns the COMMON
            // bucket; later branches only confirm-and-skip their first-year
            // nodes.
            if !common_established {
                common_established = true;
            }
        }

        Ok(())
    }
}

impl CatalogAdapter {
    async fn walk_semester(
        &self,
        ctx: &RunContext,
        stats: &mut RunStatistics,
        semester: &CatalogNode,
        branch_folder: &str,
        label: u8,
    ) {
        let url = format!("{}/getChild?id={}", ctx.urls.catalog, semester.id);
        let subjects: Vec<CatalogNode> = match ctx.fetcher.get_json(&url).await {
            Ok(subjects) => subjects,
            Err(error) => {
                warn!(semester = %semester.name, error = %error, "semester listing failed; skipping");
                return;
            }
        };

        for subject in &subjects {
            debug!(subject = %subject.name, "processing subject");

            let url = format!("{}/getChild?id={}", ctx.urls.catalog, subject.id);
            let folders: Vec<CatalogNode> = match ctx.fetcher.get_json(&url).await {
                Ok(folders) => folders,
                Err(error) => {
                    warn!(subject = %subject.name, error = %error, "subject listing failed; skipping");
                    continue;
                }
            };

            for folder in &folders {
                let url = format!("{}/getFiles?id={}", ctx.urls.catalog, folder.id);
                let files: Vec<CatalogFile> = match ctx.fetcher.get_json(&url).await {
                    Ok(files) => files,
                    Err(error) => {
                        warn!(folder = %folder.name, error = %error, "file listing failed; skipping");
                        continue;
                    }
                };
                if files.is_empty() {
                    debug!(folder = %folder.name, "folder has no files");
                    continue;
                }

                let dir = CanonicalPath::new(branch_folder, label, &subject.name, &folder.name)
                    .dir(&ctx.materials_dir);

                for file in files {
                    let Some(download_url) =
                        file.url_download.as_deref().filter(|u| !u.is_empty())
                    else {
                        continue;
                    };

                    let display_name = format!("{}{}", Source::Catalog.prefix(), file.name);
                    let file_name =
                        format!("{}{}", Source::Catalog.prefix(), sanitize_name(&file.name));
                    let task = DownloadTask {
                        locator: Locator::DirectUrl(download_url.to_string()),
                        dest: dir.join(file_name),
                        display_name,
                        source: Source::Catalog,
                    };

                    let outcome = ctx.engine.download(&task).await;
                    stats.record(task.source, &task.display_name, &outcome);
                }
            }
        }
    }
}
