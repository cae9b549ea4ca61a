//! File discovery for the content and data directories.
//!
//! [`find_files`] walks a directory tree and returns every readable regular
//! file carrying at least one accepted suffix. A file name can carry several
//! suffixes, and any of them may match:
//!
//! ```text
//! accepted = [".json", ".yaml"]
//!
//! data/menu.json          ✓  (.json)
//! content/about.json.md   ✓  (.json, .md)
//! content/about.md        ✗  (.md only)
//! data/.json              ✗  (dot-file, no suffix)
//! ```
//!
//! The optional `extra_suffix` narrows the walk to one file family first:
//! with `extra_suffix = ".md"` only files ending in `.md` are considered,
//! and the accepted set is then checked against all of their suffixes.
//!
//! Unreadable files and walk errors are skipped silently; they are rare and
//! should not stop a build.

use crate::keys;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Find files under `root` matching the suffix filters.
///
/// Returned paths are canonical (absolute, symlinks resolved), unique, and in
/// walk order. Callers that need a stable order must sort.
pub fn find_files<S: AsRef<str>>(
    root: &Path,
    accepted: &[S],
    extra_suffix: Option<&str>,
) -> Vec<PathBuf> {
    let extra_suffix = extra_suffix.filter(|s| s.starts_with('.'));
    let mut seen = HashSet::new();

    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            let suffixes = keys::suffixes(&name);
            let family_ok = extra_suffix
                .is_none_or(|extra| suffixes.last().is_some_and(|last| last == extra));
            family_ok
                && suffixes
                    .iter()
                    .any(|s| accepted.iter().any(|a| a.as_ref() == s))
        })
        .filter(|e| is_readable(e.path()))
        .filter_map(|e| e.path().canonicalize().ok())
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

fn is_readable(path: &Path) -> bool {
    File::open(path).is_ok()
}
