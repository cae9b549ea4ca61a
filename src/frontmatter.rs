//! Front-matter parsing for content files.
//!
//! A content file may start with a metadata block in one of three formats,
//! recognised by its opening line:
//!
//! ```text
//! ---                 +++                 {
//! title: Hello        title = "Hello"       "title": "Hello"
//! ---                 +++                 }
//! Body text...        Body text...        Body text...
//! ```
//!
//! The closing delimiter must sit on a line of its own. For JSON the braces
//! belong to the document. A file without any recognised block parses fine:
//! it has no format, empty metadata, and the whole text as body. Whether that
//! is acceptable is the caller's call, based on the configured handlers.

use crate::handlers::{Format, HandlerError};
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unterminated {0} front matter")]
    Unterminated(Format),
    #[error("{format} front matter: {source}")]
    Malformed {
        format: Format,
        #[source]
        source: HandlerError,
    },
    #[error("{0} front matter is not a mapping")]
    NotAMapping(Format),
}

/// A parsed content file.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    /// Format of the metadata block, `None` when the file has none.
    pub format: Option<Format>,
    pub metadata: Map<String, Value>,
    pub body: String,
}

pub fn parse_file(path: &Path) -> Result<FrontMatter, FrontMatterError> {
    let text = std::fs::read_to_string(path)?;
    parse_str(&text)
}

pub fn parse_str(text: &str) -> Result<FrontMatter, FrontMatterError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(no_front_matter(text));
    };

    let (format, closing) = match first.trim_end() {
        "---" => (Format::Yaml, "---"),
        "+++" => (Format::Toml, "+++"),
        "{" => (Format::Json, "}"),
        _ => return Ok(no_front_matter(text)),
    };

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        if line.trim_end() == closing {
            let block = match format {
                Format::Json => &text[..offset + line.len()],
                _ => &text[block_start..offset],
            };
            let body = &text[offset + line.len()..];
            let metadata = parse_block(format, block)?;
            return Ok(FrontMatter {
                format: Some(format),
                metadata,
                body: body.to_string(),
            });
        }
        offset += line.len();
    }

    Err(FrontMatterError::Unterminated(format))
}

fn parse_block(format: Format, block: &str) -> Result<Map<String, Value>, FrontMatterError> {
    if block.trim().is_empty() {
        return Ok(Map::new());
    }
    let value = format
        .parse(block.as_bytes())
        .map_err(|source| FrontMatterError::Malformed { format, source })?;
    match value {
        Value::Object(map) => Ok(map),
        // `---\n~\n---` and friends
        Value::Null => Ok(Map::new()),
        _ => Err(FrontMatterError::NotAMapping(format)),
    }
}

fn no_front_matter(text: &str) -> FrontMatter {
    FrontMatter {
        format: None,
        metadata: Map::new(),
        body: text.to_string(),
    }
}
