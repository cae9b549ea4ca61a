//! Recoverable per-item errors, the session error log, and the build report.
//!
//! Anything that goes wrong with a single file (bad front matter, bad data,
//! a key collision, a template that fails to render) is an [`ItemError`]. The
//! code handling that file returns it; the loop driving the files collects
//! it; the session turns it into exactly one timestamped [`LogEntry`] and moves
//! on to the next file. Nothing is retried.

use crate::frontmatter::FrontMatterError;
use crate::handlers::{Format, HandlerError};
use crate::keys::PathError;
use crate::render::RenderError;
use crate::tree::DuplicateKeyError;
use chrono::{DateTime, Local, TimeDelta};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ItemError {
    #[error("{} could not be read: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{} has invalid frontmatter data: {source}", .path.display())]
    FrontMatter {
        path: PathBuf,
        source: FrontMatterError,
    },
    #[error("{} has invalid frontmatter data ({}).", .path.display(), describe_format(.format))]
    UnacceptedFormat {
        path: PathBuf,
        format: Option<Format>,
    },
    #[error("{} has invalid metadata: {source}", .path.display())]
    Metadata {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{} does not contain valid data: {source}", .path.display())]
    Data {
        path: PathBuf,
        source: HandlerError,
    },
    #[error("Unknown suffix {suffix} for {}.", .path.display())]
    UnknownSuffix { path: PathBuf, suffix: String },
    #[error("{}: {source}", .path.display())]
    Key { path: PathBuf, source: PathError },
    #[error("{}: {source}", .path.display())]
    Duplicate {
        path: PathBuf,
        source: DuplicateKeyError,
    },
    #[error("{} was skipped: no front matter metadata.", .path.display())]
    EmptyMetadata { path: PathBuf },
    #[error("{} could not be rendered: {source}", .path.display())]
    Render { path: PathBuf, source: RenderError },
    #[error("{} could not be compiled: {message}", .path.display())]
    Stylesheet { path: PathBuf, message: String },
}

fn describe_format(format: &Option<Format>) -> String {
    match format {
        Some(f) => format!("{f} is not an accepted handler"),
        None => "no front matter block".to_string(),
    }
}

impl ItemError {
    /// The file this error is about.
    pub fn path(&self) -> &Path {
        match self {
            ItemError::Io { path, .. }
            | ItemError::FrontMatter { path, .. }
            | ItemError::UnacceptedFormat { path, .. }
            | ItemError::Metadata { path, .. }
            | ItemError::Data { path, .. }
            | ItemError::UnknownSuffix { path, .. }
            | ItemError::Key { path, .. }
            | ItemError::Duplicate { path, .. }
            | ItemError::EmptyMetadata { path }
            | ItemError::Render { path, .. }
            | ItemError::Stylesheet { path, .. } => path,
        }
    }
}

/// One recorded recoverable error.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub path: PathBuf,
    pub message: String,
}

/// Session-scoped error log.
#[derive(Debug, Clone, Default)]
pub struct BuildLog {
    entries: Vec<LogEntry>,
}

impl BuildLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one recoverable error.
    pub fn record(&mut self, error: &ItemError) -> &LogEntry {
        tracing::warn!(path = %error.path().display(), "{error}");
        self.entries.push(LogEntry {
            timestamp: Local::now(),
            path: error.path().to_path_buf(),
            message: error.to_string(),
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Record `error` unless the log already holds the same condition for
    /// the same file. Returns whether an entry was added.
    ///
    /// A page parsed twice, or a site built twice in one session, reports
    /// the same failure each time; only the first one is kept.
    pub fn record_once(&mut self, error: &ItemError) -> bool {
        let message = error.to_string();
        let seen = self
            .entries
            .iter()
            .any(|e| e.path == error.path() && e.message == message);
        if !seen {
            self.record(error);
        }
        !seen
    }

    pub fn record_all(&mut self, errors: impl IntoIterator<Item = ItemError>) {
        for error in errors {
            self.record(&error);
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Statistics for one `build()` call.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub build_start: DateTime<Local>,
    pub build_end: DateTime<Local>,
    pub pages_built: usize,
    pub pages_skipped: usize,
    pub errors: Vec<LogEntry>,
}

impl BuildReport {
    pub fn build_time(&self) -> TimeDelta {
        self.build_end - self.build_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keeps_path_and_message() {
        let mut log = BuildLog::new();
        let err = ItemError::UnknownSuffix {
            path: PathBuf::from("/data/notes.json.txt"),
            suffix: ".txt".to_string(),
        };
        let entry = log.record(&err).clone();

        assert_eq!(entry.path, PathBuf::from("/data/notes.json.txt"));
        assert_eq!(entry.message, "Unknown suffix .txt for /data/notes.json.txt.");
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn record_once_skips_the_same_condition_only() {
        let mut log = BuildLog::new();
        let path = PathBuf::from("/c/x/index.md");
        let duplicate = ItemError::Duplicate {
            path: path.clone(),
            source: DuplicateKeyError {
                keys: vec!["x".into(), "index".into()],
            },
        };
        let empty = ItemError::EmptyMetadata { path: path.clone() };

        assert!(log.record_once(&duplicate));
        assert!(!log.record_once(&duplicate));
        assert!(log.record_once(&empty));
        assert!(!log.record_once(&empty));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn duplicate_message_names_colliding_keys() {
        let err = ItemError::Duplicate {
            path: PathBuf::from("/c/x/index.md"),
            source: DuplicateKeyError {
                keys: vec!["x".into(), "index".into()],
            },
        };
        let message = err.to_string();
        assert!(message.contains("/c/x/index.md"));
        assert!(message.contains("x/index conflicts with another item."));
    }

    #[test]
    fn missing_front_matter_message() {
        let err = ItemError::UnacceptedFormat {
            path: PathBuf::from("/c/a.md"),
            format: None,
        };
        assert_eq!(
            err.to_string(),
            "/c/a.md has invalid frontmatter data (no front matter block)."
        );
    }

    #[test]
    fn build_time_is_end_minus_start() {
        let start = Local::now();
        let report = BuildReport {
            build_start: start,
            build_end: start + TimeDelta::milliseconds(250),
            pages_built: 1,
            pages_skipped: 0,
            errors: vec![],
        };
        assert_eq!(report.build_time(), TimeDelta::milliseconds(250));
    }
}
