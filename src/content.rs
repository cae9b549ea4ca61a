//! Content loading: markdown files → sitemap + flat page list.
//!
//! Every `*.md` file under the content root is a page. Its front matter
//! becomes a [`ContentMetadata`] leaf in the sitemap, addressed by its path:
//!
//! ```text
//! content/                           sitemap
//! ├── a.md           title: A        a:   { title: "A", tags: [], ... }
//! └── sub/                           sub:
//!     └── b.json.md  {"title": "B"}    b: { title: "B", tags: [], ... }
//! ```
//!
//! The flat list keeps every discovered page path in discovery order, even
//! the ones whose metadata could not be indexed. The render loop walks that
//! list and parses each page again on its own.

use crate::discover;
use crate::frontmatter;
use crate::handlers::HandlerRegistry;
use crate::keys;
use crate::report::ItemError;
use crate::tree::NestedTree;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub type SiteMap = NestedTree<ContentMetadata>;
pub type FlatSiteList = Vec<PathBuf>;

/// Page metadata: fixed fields with defaults, plus whatever else the front
/// matter declares.
///
/// The fixed fields never reject a page. A blank value (`title:` in YAML)
/// keeps the default, and scalars of another type are turned into text, so
/// `title: 2024` gives the title `"2024"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentMetadata {
    /// Real source path. A `filepath` key in the front matter is ignored.
    pub filepath: String,
    #[serde(default, deserialize_with = "text_or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "optional_text")]
    pub template: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "tag_list")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentMetadata {
    /// Overlay parsed front matter on the defaults.
    pub fn from_front_matter(
        filepath: &Path,
        mut metadata: Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        metadata.insert(
            "filepath".to_string(),
            Value::String(filepath.display().to_string()),
        );
        serde_json::from_value(Value::Object(metadata))
    }
}

/// Strings as they are, null as empty, anything else as its JSON text.
fn as_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn text_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Value::deserialize(deserializer).map(as_text)
}

fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        value => Some(as_text(value)),
    })
}

/// A list keeps its non-null items; a single value becomes a one-item list.
fn tag_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .into_iter()
            .filter(|item| !item.is_null())
            .map(as_text)
            .collect(),
        value => vec![as_text(value)],
    })
}

/// A page parsed from disk.
#[derive(Debug, Clone)]
pub struct Page {
    pub metadata: ContentMetadata,
    /// Raw markdown after the front matter block.
    pub body: String,
    /// Whether the front matter declared any key at all.
    pub has_metadata: bool,
}

/// Read a content file and check its front matter against the registry.
pub fn parse_page(path: &Path, registry: &HandlerRegistry) -> Result<Page, ItemError> {
    let parsed = frontmatter::parse_file(path).map_err(|source| ItemError::FrontMatter {
        path: path.to_path_buf(),
        source,
    })?;

    match parsed.format {
        Some(format) if registry.accepts_format(format) => {}
        format => {
            return Err(ItemError::UnacceptedFormat {
                path: path.to_path_buf(),
                format,
            });
        }
    }

    let has_metadata = !parsed.metadata.is_empty();
    let metadata = ContentMetadata::from_front_matter(path, parsed.metadata).map_err(|source| {
        ItemError::Metadata {
            path: path.to_path_buf(),
            source,
        }
    })?;

    Ok(Page {
        metadata,
        body: parsed.body,
        has_metadata,
    })
}

/// Result of one content load.
#[derive(Debug, Default)]
pub struct ContentIndex {
    pub sitemap: SiteMap,
    pub flat: FlatSiteList,
    pub errors: Vec<ItemError>,
}

/// Load every page under `content_root`.
///
/// Plain `name.md` files are picked up only when `plain_markdown` is set;
/// otherwise a page needs a handler suffix before `.md` (`name.yaml.md`).
pub fn load(content_root: &Path, registry: &HandlerRegistry, plain_markdown: bool) -> ContentIndex {
    let root = content_root
        .canonicalize()
        .unwrap_or_else(|_| content_root.to_path_buf());
    let handler_suffixes = registry.suffixes();

    let mut accepted = handler_suffixes.clone();
    if plain_markdown {
        accepted.push(".md".to_string());
    }

    let mut index = ContentIndex::default();
    for path in discover::find_files(&root, &accepted, Some(".md")) {
        index.flat.push(path.clone());
        if let Err(e) = index_page(&mut index.sitemap, &path, &root, registry, &handler_suffixes) {
            index.errors.push(e);
        }
    }

    tracing::debug!(
        pages = index.flat.len(),
        indexed = index.sitemap.leaf_count(),
        errors = index.errors.len(),
        "Content loaded"
    );
    index
}

fn index_page(
    sitemap: &mut SiteMap,
    path: &Path,
    root: &Path,
    registry: &HandlerRegistry,
    handler_suffixes: &[String],
) -> Result<(), ItemError> {
    let page = parse_page(path, registry)?;
    let keys = keys::derive_keys(path, root, handler_suffixes).map_err(|source| ItemError::Key {
        path: path.to_path_buf(),
        source,
    })?;
    sitemap
        .set(&keys, page.metadata)
        .map_err(|source| ItemError::Duplicate {
            path: path.to_path_buf(),
            source,
        })
}
