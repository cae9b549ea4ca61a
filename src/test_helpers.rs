//! Shared test utilities.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let site = Site::new(project_config(tmp.path())).unwrap();
//!
//! let page = write_file(tmp.path(), "content/extra.md", "---\ntitle: X\n---\n");
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::assets::copy_dir_recursive;
use crate::config::SiteConfig;

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

/// Default config with every path resolved against `project_dir`.
pub fn project_config(project_dir: &Path) -> SiteConfig {
    let mut config = SiteConfig::default();
    config.resolve_paths(project_dir);
    config
}

/// Write `content` to `root/rel`, creating parent directories.
///
/// Returns the canonical path, as discovery would report it.
pub fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path.canonicalize().unwrap()
}

/// Read a file under `root` to a string.
pub fn read(root: &Path, rel: &str) -> String {
    std::fs::read_to_string(root.join(rel))
        .unwrap_or_else(|e| panic!("reading {rel}: {e}"))
}
