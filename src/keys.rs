//! Path-to-key mapping for the nested content and data trees.
//!
//! A file's position in a tree is its path relative to the tree's root
//! directory. Directory segments become keys verbatim; the file name loses its
//! suffixes:
//!
//! ```text
//! content/blog/2024/hello.md       → ["blog", "2024", "hello"]
//! content/blog/about.yaml.md       → ["blog", "about"]      (double suffix)
//! data/nav/menu.json               → ["nav", "menu"]
//! ```
//!
//! At most two suffixes are removed: the last one always (stem semantics),
//! and a second one only when it is one of the handler suffixes passed in.
//! `notes.v2.md` therefore maps to `notes.v2`.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("{} is not beneath {}", .path.display(), .base.display())]
    NotBeneath { path: PathBuf, base: PathBuf },
    #[error("{} has no file name to derive a key from", .0.display())]
    NoFileName(PathBuf),
}

/// Derive the key sequence addressing `filepath` inside a tree rooted at `base_path`.
///
/// Pure: no filesystem access. Callers pass both paths in the same form
/// (both canonical, as discovery returns them).
pub fn derive_keys<S: AsRef<str>>(
    filepath: &Path,
    base_path: &Path,
    strip_suffixes: &[S],
) -> Result<Vec<String>, PathError> {
    let relative = filepath
        .strip_prefix(base_path)
        .map_err(|_| PathError::NotBeneath {
            path: filepath.to_path_buf(),
            base: base_path.to_path_buf(),
        })?;

    let mut segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let file_name = segments
        .pop()
        .ok_or_else(|| PathError::NoFileName(filepath.to_path_buf()))?;

    segments.push(strip_known_suffix(file_stem(&file_name), strip_suffixes).to_string());
    Ok(segments)
}

/// The file name without its last suffix, following path-stem rules:
/// `page.json.md` → `page.json`, `.hidden` → `.hidden`, `README` → `README`.
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(pos) => &name[..pos],
    }
}

/// Strip one trailing suffix from `name` if it is in `suffixes`.
///
/// The name is returned untouched when stripping would leave it empty.
pub fn strip_known_suffix<'a, S: AsRef<str>>(name: &'a str, suffixes: &[S]) -> &'a str {
    suffixes
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| !s.is_empty())
        .find_map(|s| name.strip_suffix(s).filter(|rest| !rest.is_empty()))
        .unwrap_or(name)
}

/// All dot-separated suffixes of a file name, outermost last.
///
/// `page.json.md` → `[".json", ".md"]`. Leading dots are not suffix
/// separators (`.hidden` has none), and a name ending in `.` has none.
pub fn suffixes(name: &str) -> Vec<String> {
    if name.ends_with('.') {
        return Vec::new();
    }
    name.trim_start_matches('.')
        .split('.')
        .skip(1)
        .map(|s| format!(".{s}"))
        .collect()
}

/// The outermost suffix of a file name, if any (`page.json.md` → `.md`).
pub fn final_suffix(name: &str) -> Option<String> {
    suffixes(name).pop()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_path_maps_to_keys() {
        let keys = derive_keys(
            Path::new("/base/a/b/c.json"),
            Path::new("/base"),
            &[".json"],
        )
        .unwrap();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn double_suffix_is_stripped_twice() {
        let keys = derive_keys(
            Path::new("/base/x/page.json.md"),
            Path::new("/base"),
            &[".json"],
        )
        .unwrap();
        assert_eq!(keys, vec!["x", "page"]);
    }

    #[test]
    fn unlisted_inner_suffix_is_kept() {
        let keys = derive_keys(
            Path::new("/base/notes.v2.md"),
            Path::new("/base"),
            &[".json", ".yaml"],
        )
        .unwrap();
        assert_eq!(keys, vec!["notes.v2"]);
    }

    #[test]
    fn file_at_root_is_single_key() {
        let keys = derive_keys(Path::new("/base/a.md"), Path::new("/base"), &[".json"]).unwrap();
        assert_eq!(keys, vec!["a"]);
    }

    #[test]
    fn derivation_is_deterministic() {
        let path = Path::new("/base/one/two.yaml.md");
        let first = derive_keys(path, Path::new("/base"), &[".yaml"]).unwrap();
        let second = derive_keys(path, Path::new("/base"), &[".yaml"]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn path_outside_base_is_error() {
        let err = derive_keys(Path::new("/other/a.md"), Path::new("/base"), &[".json"]).unwrap_err();
        assert!(matches!(err, PathError::NotBeneath { .. }));
    }

    #[test]
    fn base_itself_has_no_file_name() {
        let err = derive_keys(Path::new("/base"), Path::new("/base"), &[".json"]).unwrap_err();
        assert!(matches!(err, PathError::NoFileName(_)));
    }

    #[test]
    fn stripping_never_empties_a_key() {
        assert_eq!(strip_known_suffix(".json", &[".json"]), ".json");
        assert_eq!(strip_known_suffix("a.json", &[".json"]), "a");
    }

    #[test]
    fn stem_follows_path_rules() {
        assert_eq!(file_stem("page.json.md"), "page.json");
        assert_eq!(file_stem(".hidden"), ".hidden");
        assert_eq!(file_stem("README"), "README");
    }

    #[test]
    fn suffix_components() {
        assert_eq!(suffixes("page.json.md"), vec![".json", ".md"]);
        assert_eq!(suffixes("a.md"), vec![".md"]);
        assert!(suffixes(".hidden").is_empty());
        assert!(suffixes("trailing.").is_empty());
        assert!(suffixes("plain").is_empty());
        assert_eq!(final_suffix("page.json.md").as_deref(), Some(".md"));
    }
}
