//! Canonical path taxonomy shared by all three sources.
//!
//! Every source addresses its content differently (folder node ids, scraped
//! anchor text, REST branch codes). This module holds the pure functions that
//! normalize those schemes into the one on-disk layout
//! `{branch}/SEM{n}/{subject}/{folder}` so the sources never invent paths of
//! their own.

use std::path::{Path, PathBuf};

/// Synthetic branch folder for first-year content shared by every branch.
pub const COMMON_BRANCH: &str = "COMMON";

/// Maximum length of a sanitized path segment, in characters.
const MAX_SEGMENT_LEN: usize = 200;

/// A fully-normalized destination inside the materials tree.
///
/// Subject and folder segments are sanitized on construction; branch and
/// semester come from static tables and are trusted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPath {
    branch: String,
    semester: u8,
    subject: String,
    folder: String,
}

impl CanonicalPath {
    /// Builds a canonical path, sanitizing the remote-derived segments.
    #[must_use]
    pub fn new(branch: &str, semester: u8, subject: &str, folder: &str) -> Self {
        Self {
            branch: branch.to_string(),
            semester,
            subject: sanitize_name(subject),
            folder: sanitize_name(folder),
        }
    }

    /// Resolves the destination directory under `materials_dir`.
    #[must_use]
    pub fn dir(&self, materials_dir: &Path) -> PathBuf {
        materials_dir
            .join(&self.branch)
            .join(semester_folder(self.semester))
            .join(&self.subject)
            .join(&self.folder)
    }
}

/// True for the first-year semesters that collapse into [`COMMON_BRANCH`].
#[must_use]
pub fn is_common_semester(label: u8) -> bool {
    matches!(label, 1 | 2)
}

/// Renders a semester label as its on-disk folder name.
#[must_use]
pub fn semester_folder(label: u8) -> String {
    format!("SEM{label}")
}

/// Parses a semester label out of a catalog node name such as `SEM3` or `sem3`.
///
/// Returns `None` for names outside the `SEM1`..`SEM8` shape; callers treat
/// that as a structural oddity and skip the node.
#[must_use]
pub fn parse_semester_label(name: &str) -> Option<u8> {
    let rest = name
        .strip_prefix("SEM")
        .or_else(|| name.strip_prefix("sem"))
        .or_else(|| name.strip_prefix("Sem"))?;
    let label: u8 = rest.trim().parse().ok()?;
    (1..=8).contains(&label).then_some(label)
}

/// Maps a REST-source branch code onto its canonical branch folder.
///
/// Codes with no entry are excluded from REST traversal entirely, never
/// defaulted.
#[must_use]
pub fn map_rest_branch_code(code: &str) -> Option<&'static str> {
    match code {
        "CSE" => Some("CSE"),
        "IT" => Some("IT"),
        "CST" => Some("CSE"),
        "ITE" => Some("IT"),
        "ECE" => Some("ECE"),
        "EE" | "EEE" => Some("EEE"),
        "ICE" => Some("ECE"),
        "ME" | "MAE" => Some("MECH"),
        "CE" => Some("CIVIL"),
        _ => None,
    }
}

/// Sanitizes remote, untrusted text into a single safe path segment.
///
/// Filesystem-illegal characters (`<>:"/\|?*`) become underscores, whitespace
/// runs collapse to one underscore, and the result is truncated to 200
/// characters. Idempotent: sanitizing twice yields the same string.
#[must_use]
pub fn sanitize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_whitespace = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        match ch {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => out.push('_'),
            c => out.push(c),
        }
    }
    if out.chars().count() > MAX_SEGMENT_LEN {
        out.chars().take(MAX_SEGMENT_LEN).collect()
    } else {
        out
    }
}

/// Rewrites a REST subject slug into the title-cased form the detail endpoint
/// expects: hyphens become spaces, each word is title-cased.
#[must_use]
pub fn format_subject_for_query(slug: &str) -> String {
    slug.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use super::*;

    // ==================== sanitize_name Tests ====================

    #[test]
    fn test_sanitize_name_replaces_illegal_chars() {
        assert_eq!(sanitize_name("a<b>c:d\"e/f\\g|h?i*j"), "a_b_c_d_e_f_g_h_i_j");
    }

    #[test]
    fn test_sanitize_name_collapses_whitespace_runs() {
        assert_eq!(sanitize_name("Unit  1   Notes"), "Unit_1_Notes");
        assert_eq!(sanitize_name("tab\tand\nnewline"), "tab_and_newline");
    }

    #[test]
    fn test_sanitize_name_truncates_to_200_chars() {
        let long = "x".repeat(300);
        assert_eq!(sanitize_name(&long).chars().count(), 200);
    }

    #[test]
    fn test_sanitize_name_is_idempotent() {
        for raw in [
            "Applied Maths - I",
            "a<b>c:d\"e/f\\g|h?i*j",
            "  spaced   out  ",
            &"y".repeat(250),
        ] {
            let once = sanitize_name(raw);
            assert_eq!(sanitize_name(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_sanitize_name_output_has_no_illegal_chars() {
        let out = sanitize_name("so<me>:na\"me/wi\\th|every?bad*char");
        assert!(!out.contains(|c| "<>:\"/\\|?*".contains(c)), "got {out}");
    }

    // ==================== format_subject_for_query Tests ====================

    #[test]
    fn test_format_subject_for_query_title_cases_words() {
        assert_eq!(
            format_subject_for_query("data-structures-and-algo"),
            "Data Structures And Algo"
        );
    }

    #[test]
    fn test_format_subject_for_query_lowercases_word_tails() {
        assert_eq!(format_subject_for_query("APPLIED-MATHS"), "Applied Maths");
    }

    #[test]
    fn test_format_subject_for_query_single_word() {
        assert_eq!(format_subject_for_query("physics"), "Physics");
    }

    // ==================== Semester Tests ====================

    #[test]
    fn test_is_common_semester_first_year_only() {
        assert!(is_common_semester(1));
        assert!(is_common_semester(2));
        for label in 3..=8 {
            assert!(!is_common_semester(label));
        }
    }

    #[test]
    fn test_parse_semester_label_accepts_sem_prefix() {
        assert_eq!(parse_semester_label("SEM3"), Some(3));
        assert_eq!(parse_semester_label("sem1"), Some(1));
        assert_eq!(parse_semester_label("Sem8"), Some(8));
    }

    #[test]
    fn test_parse_semester_label_rejects_out_of_range_and_noise() {
        assert_eq!(parse_semester_label("SEM0"), None);
        assert_eq!(parse_semester_label("SEM9"), None);
        assert_eq!(parse_semester_label("Syllabus"), None);
        assert_eq!(parse_semester_label(""), None);
    }

    // ==================== Branch Mapping Tests ====================

    #[test]
    fn test_map_rest_branch_code_known_codes() {
        assert_eq!(map_rest_branch_code("CST"), Some("CSE"));
        assert_eq!(map_rest_branch_code("EE"), Some("EEE"));
        assert_eq!(map_rest_branch_code("ICE"), Some("ECE"));
        assert_eq!(map_rest_branch_code("MAE"), Some("MECH"));
        assert_eq!(map_rest_branch_code("CE"), Some("CIVIL"));
    }

    #[test]
    fn test_map_rest_branch_code_unknown_is_absent() {
        assert_eq!(map_rest_branch_code("BT"), None);
        assert_eq!(map_rest_branch_code(""), None);
    }

    // ==================== CanonicalPath Tests ====================

    #[test]
    fn test_canonical_path_sanitizes_remote_segments() {
        let path = CanonicalPath::new("CSE", 3, "Data Structures", "Unit 1 / Intro");
        let dir = path.dir(Path::new("/materials"));
        assert_eq!(
            dir,
            Path::new("/materials/CSE/SEM3/Data_Structures/Unit_1___Intro")
        );
    }

    #[test]
    fn test_canonical_path_common_branch() {
        let path = CanonicalPath::new(COMMON_BRANCH, 1, "Physics", "Notes");
        let dir = path.dir(Path::new("./material"));
        assert_eq!(dir, Path::new("./material/COMMON/SEM1/Physics/Notes"));
    }
}
