//! Per-commit diff normalization.
//!
//! Drops files that never carry reviewable code and caps each remaining
//! patch at a fixed size, appending an explicit marker when it does.

use std::collections::BTreeSet;

use crate::config::DigestConfig;
use crate::data::FileChange;

/// Appended to a patch cut at the per-file size cap.
pub const TRUNCATED_DIFF_MARKER: &str = "\n\n[TRUNCATED: File diff exceeds size limit. The content above represents only the beginning of the changes. Analyze based on the visible portion.]";

/// Returns the lower-cased extension of `filename` with a leading dot.
///
/// The extension is the text after the final `.` anywhere in the name;
/// names without a dot have none.
fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| format!(".{}", ext.to_lowercase()))
}

/// Checks whether `filename` belongs to the non-code extension set.
pub fn is_non_code_file(filename: &str, non_code_extensions: &BTreeSet<String>) -> bool {
    extension(filename).is_some_and(|ext| non_code_extensions.contains(&ext))
}

/// Caps `patch` at `max_chars` characters, appending the truncation marker
/// when anything was cut.
fn cap_patch(patch: String, max_chars: usize) -> String {
    match patch.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut capped = patch[..cut].to_string();
            capped.push_str(TRUNCATED_DIFF_MARKER);
            capped
        }
        None => patch,
    }
}

/// Filters and caps one commit's file changes.
///
/// Order is preserved. Never fails; oversized patches degrade to a
/// truncated prefix plus [`TRUNCATED_DIFF_MARKER`].
pub fn normalize_files(files: Vec<FileChange>, config: &DigestConfig) -> Vec<FileChange> {
    files
        .into_iter()
        .filter(|file| !is_non_code_file(&file.filename, &config.non_code_extensions))
        .map(|mut file| {
            let before = file.patch.len();
            file.patch = cap_patch(std::mem::take(&mut file.patch), config.max_file_diff_chars);
            if file.patch.len() != before {
                tracing::debug!(
                    filename = %file.filename,
                    original_bytes = before,
                    "Truncated oversized file diff"
                );
            }
            file
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::data::FileStatus;

    fn file(name: &str, patch: &str) -> FileChange {
        FileChange {
            filename: name.to_string(),
            status: FileStatus::Modified,
            additions: 1,
            deletions: 1,
            patch: patch.to_string(),
        }
    }

    #[test]
    fn drops_non_code_extensions_case_insensitively() {
        let config = DigestConfig::default();
        let files = vec![
            file("assets/logo.PNG", ""),
            file("Cargo.lock", "+dep"),
            file("src/main.rs", "+fn main() {}"),
            file("fonts/Inter.woff2", ""),
            file("docs/guide.PDF", ""),
        ];

        let kept = normalize_files(files, &config);
        let names: Vec<_> = kept.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["src/main.rs"]);
    }

    #[test]
    fn keeps_files_without_extension() {
        let config = DigestConfig::default();
        let kept = normalize_files(vec![file("Makefile", "+all:"), file("LICENSE", "")], &config);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn only_final_dot_counts() {
        let set = DigestConfig::default().non_code_extensions;
        assert!(is_non_code_file("archive.tar.gz", &set));
        assert!(!is_non_code_file("image.png.rs", &set));
        assert!(!is_non_code_file("README", &set));
    }

    #[test]
    fn oversized_patch_capped_with_marker() {
        let config = DigestConfig::default();
        let patch = "x".repeat(95_000);
        let kept = normalize_files(vec![file("big.rs", &patch)], &config);

        let expected = format!("{}{TRUNCATED_DIFF_MARKER}", "x".repeat(90_000));
        assert_eq!(kept[0].patch, expected);
    }

    #[test]
    fn patch_at_cap_untouched() {
        let config = DigestConfig::default();
        let patch = "y".repeat(90_000);
        let kept = normalize_files(vec![file("edge.rs", &patch)], &config);
        assert_eq!(kept[0].patch, patch);
    }

    #[test]
    fn cap_respects_char_boundaries() {
        let config = DigestConfig {
            max_file_diff_chars: 2,
            ..DigestConfig::default()
        };
        let kept = normalize_files(vec![file("u.rs", "äöü")], &config);
        assert_eq!(kept[0].patch, format!("äö{TRUNCATED_DIFF_MARKER}"));
    }

    #[test]
    fn metadata_preserved() {
        let config = DigestConfig::default();
        let mut f = file("src/lib.rs", "+x");
        f.status = FileStatus::Added;
        f.additions = 42;
        let kept = normalize_files(vec![f.clone()], &config);
        assert_eq!(kept, vec![f]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn filename() -> impl Strategy<Value = String> {
            (
                "[a-z]{1,8}",
                prop::option::of(prop::sample::select(vec![
                    "rs", "py", "PNG", "lock", "mp4", "Zip", "md", "toml", "woff",
                ])),
            )
                .prop_map(|(stem, ext)| match ext {
                    Some(ext) => format!("{stem}.{ext}"),
                    None => stem,
                })
        }

        proptest! {
            #[test]
            fn never_returns_non_code_and_keeps_everything_else(
                names in prop::collection::vec(filename(), 0..20)
            ) {
                let config = DigestConfig::default();
                let files: Vec<_> = names.iter().map(|n| file(n, "+x")).collect();
                let kept = normalize_files(files, &config);

                let expected: Vec<_> = names
                    .iter()
                    .filter(|n| !is_non_code_file(n, &config.non_code_extensions))
                    .cloned()
                    .collect();
                let actual: Vec<_> = kept.iter().map(|f| f.filename.clone()).collect();
                prop_assert_eq!(actual, expected);
            }
        }
    }
}
