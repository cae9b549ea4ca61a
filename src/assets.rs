//! Static files: directory copies and SCSS compilation.
//!
//! ```text
//! assets/          →  build/assets/
//! js/              →  build/js/
//! scss/site.scss   →  build/css/site.css     (scss active)
//! scss/_vars.scss  →  (partial, only imported)
//! css/             →  build/css/             (scss inactive)
//! data/            →  build/__data/          (data_in_build)
//! ```
//!
//! SCSS is compiled with [grass](https://docs.rs/grass), a pure-Rust Sass
//! implementation. A stylesheet that fails to compile is reported and skipped;
//! the other stylesheets are still written.

use crate::config::OutputStyle;
use crate::discover;
use crate::report::ItemError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("could not copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    #[error("could not write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Copy `src` into `dst`, merging with whatever `dst` already holds.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Copy a source directory into the build tree.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<(), AssetError> {
    copy_dir_recursive(src, dst).map_err(|source| AssetError::Copy {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source,
    })
}

fn grass_style(style: OutputStyle) -> grass::OutputStyle {
    match style {
        OutputStyle::Compressed => grass::OutputStyle::Compressed,
        OutputStyle::Nested | OutputStyle::Expanded => grass::OutputStyle::Expanded,
    }
}

fn is_partial(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('_'))
}

/// Compile every non-partial `*.scss` under `src_dir` into `out_dir`, keeping
/// the relative layout.
///
/// Returns the stylesheets that failed to compile. Failing to write an output
/// file is an error.
pub fn compile_scss(
    src_dir: &Path,
    out_dir: &Path,
    style: OutputStyle,
) -> Result<Vec<ItemError>, AssetError> {
    let root = src_dir
        .canonicalize()
        .unwrap_or_else(|_| src_dir.to_path_buf());
    let options = grass::Options::default().style(grass_style(style));

    let mut sources = discover::find_files(&root, &[".scss"], None);
    sources.sort();

    let mut errors = Vec::new();
    for source in sources.iter().filter(|p| !is_partial(p)) {
        let css = match grass::from_path(source, &options) {
            Ok(css) => css,
            Err(e) => {
                errors.push(ItemError::Stylesheet {
                    path: source.clone(),
                    message: e.to_string(),
                });
                continue;
            }
        };

        let relative = source.strip_prefix(&root).unwrap_or(source);
        let target = out_dir.join(relative).with_extension("css");
        write_output(&target, &css)?;
        tracing::debug!(source = %source.display(), target = %target.display(), "Compiled stylesheet");
    }
    Ok(errors)
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_output(path: &Path, contents: &str) -> Result<(), AssetError> {
    let result = match path.parent() {
        Some(parent) => fs::create_dir_all(parent).and_then(|_| fs::write(path, contents)),
        None => fs::write(path, contents),
    };
    result.map_err(|source| AssetError::Write {
        path: path.to_path_buf(),
        source,
    })
}
