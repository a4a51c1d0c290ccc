//! Inclusion and exclusion policy for walked entries.
//!
//! [`Filters`] holds the user-facing filtering knobs and answers two pure
//! questions for the walker: may this file contribute a fingerprint, and
//! should this directory be descended into. Extension matching is
//! case-insensitive and tolerates a leading dot in the configured lists,
//! so `"MKV"`, `"mkv"` and `".mkv"` all describe the same filter.
//!
//! Precedence: when `ext_include` is non-empty, `ext_exclude` is ignored.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Filtering policy applied during directory traversal.
///
/// Embedded in [`Config`](crate::Config) and read-only for the duration
/// of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    /// File extensions to include. When non-empty, only files with one of
    /// these extensions are fingerprinted and `ext_exclude` is ignored.
    pub ext_include: Vec<String>,
    /// File extensions to exclude. Consulted only when `ext_include` is empty.
    pub ext_exclude: Vec<String>,
    /// Directory basenames to exclude (the whole subtree is skipped).
    pub dirs_exclude: Vec<String>,
    /// Restrict each root to its top-level entries.
    pub skip_subdirs: bool,
    /// Include hidden files and directories (names starting with `.`).
    pub include_hidden: bool,
}

impl Filters {
    /// Decide whether a directory should be skipped, subtree included.
    ///
    /// Callers only invoke this for non-root directories; the roots
    /// themselves are always entered.
    #[must_use]
    pub fn should_skip_dir(&self, path: &Path) -> bool {
        if self.skip_subdirs {
            return true;
        }

        let name = basename(path);
        if is_hidden(&name) && !self.include_hidden {
            return true;
        }

        self.dirs_exclude.iter().any(|d| d.as_str() == name)
    }

    /// Decide whether a file should be skipped.
    ///
    /// Zero-byte files are not handled here: their size is only known
    /// after `stat`, so the walker filters them separately.
    #[must_use]
    pub fn should_skip_file(&self, path: &Path) -> bool {
        let name = basename(path);
        if is_hidden(&name) && !self.include_hidden {
            return true;
        }

        let ext = normalize_ext(extension(path));

        if !self.ext_include.is_empty() {
            // Include overrides exclude.
            return !self.ext_include.iter().any(|e| normalize_ext(e) == ext);
        }

        self.ext_exclude.iter().any(|e| normalize_ext(e) == ext)
    }
}

impl fmt::Display for Filters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ skip_subdirs: {}, include_hidden: {}, ext_include: {:?}, ext_exclude: {:?}, dirs_exclude: {:?} }}",
            self.skip_subdirs,
            self.include_hidden,
            self.ext_include,
            self.ext_exclude,
            self.dirs_exclude,
        )
    }
}

/// Split a comma- or space-separated list into its items.
///
/// Convenience for front-ends feeding [`Filters`] from flag values, e.g.
/// `parse_list(".mkv, .mp4")` or `parse_list("node_modules target")`.
#[must_use]
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}

/// Lower-case and strip the optional leading dot from an extension.
fn normalize_ext(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_hidden_files_by_default() {
        let filters = Filters::default();
        assert!(filters.should_skip_file(Path::new("/tree/.env")));
        assert!(!filters.should_skip_file(Path::new("/tree/notes.txt")));
    }

    #[test]
    fn test_include_hidden() {
        let filters = Filters {
            include_hidden: true,
            ..Default::default()
        };
        assert!(!filters.should_skip_file(Path::new("/tree/.env")));
        assert!(!filters.should_skip_dir(Path::new("/tree/.git")));
    }

    #[test]
    fn test_ext_include_only_admits_members() {
        let filters = Filters {
            ext_include: vec![".mkv".into(), "mp4".into()],
            ..Default::default()
        };
        assert!(!filters.should_skip_file(Path::new("movie.mkv")));
        assert!(!filters.should_skip_file(Path::new("movie.MP4")));
        assert!(filters.should_skip_file(Path::new("movie.avi")));
        assert!(filters.should_skip_file(Path::new("README")));
    }

    #[test]
    fn test_ext_exclude() {
        let filters = Filters {
            ext_exclude: vec!["log".into()],
            ..Default::default()
        };
        assert!(filters.should_skip_file(Path::new("debug.log")));
        assert!(filters.should_skip_file(Path::new("debug.LOG")));
        assert!(!filters.should_skip_file(Path::new("debug.txt")));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let filters = Filters {
            ext_include: vec!["txt".into()],
            ext_exclude: vec!["txt".into()],
            ..Default::default()
        };
        // The exclude list is ignored while the include list is non-empty.
        assert!(!filters.should_skip_file(Path::new("a.txt")));
        assert!(filters.should_skip_file(Path::new("a.md")));
    }

    #[test]
    fn test_skip_subdirs_skips_every_dir() {
        let filters = Filters {
            skip_subdirs: true,
            ..Default::default()
        };
        assert!(filters.should_skip_dir(Path::new("/tree/sub")));
        assert!(filters.should_skip_dir(Path::new("/tree/visible")));
    }

    #[test]
    fn test_dirs_exclude_matches_basename() {
        let filters = Filters {
            dirs_exclude: vec!["node_modules".into(), "target".into()],
            ..Default::default()
        };
        assert!(filters.should_skip_dir(Path::new("/a/b/node_modules")));
        assert!(filters.should_skip_dir(Path::new("/a/target")));
        assert!(!filters.should_skip_dir(Path::new("/a/src")));
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list(".mkv, .mp4"), vec![".mkv", ".mp4"]);
        assert_eq!(parse_list("a b  c"), vec!["a", "b", "c"]);
        assert_eq!(parse_list(""), Vec::<String>::new());
    }

    #[test]
    fn test_filters_roundtrip_serde() {
        let filters = Filters {
            ext_include: vec!["mkv".into()],
            skip_subdirs: true,
            ..Default::default()
        };
        let json = serde_json::to_string(&filters).unwrap();
        let back: Filters = serde_json::from_str(&json).unwrap();
        assert_eq!(filters, back);
    }
}
