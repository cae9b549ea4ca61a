//! Shared data loading: data files → one nested value tree.
//!
//! Every file under the data root with a registered handler suffix is
//! decoded and stored at the key path of its location:
//!
//! ```text
//! data/
//! ├── site.yaml              → data.site
//! └── nav/
//!     ├── main.json          → data.nav.main
//!     └── footer.toml        → data.nav.footer
//! ```
//!
//! The tree is handed to every template as `data`.

use crate::discover;
use crate::handlers::HandlerRegistry;
use crate::keys;
use crate::report::ItemError;
use crate::tree::NestedTree;
use serde_json::Value;
use std::path::Path;

pub type SharedData = NestedTree<Value>;

/// Result of one data load.
#[derive(Debug, Default)]
pub struct DataIndex {
    pub data: SharedData,
    pub errors: Vec<ItemError>,
}

/// Load every data file under `data_root`.
pub fn load(data_root: &Path, registry: &HandlerRegistry) -> DataIndex {
    let root = data_root
        .canonicalize()
        .unwrap_or_else(|_| data_root.to_path_buf());

    let mut index = DataIndex::default();
    for path in discover::find_files(&root, &registry.suffixes(), None) {
        if let Err(e) = load_file(&mut index.data, &path, &root, registry) {
            index.errors.push(e);
        }
    }

    tracing::debug!(
        entries = index.data.leaf_count(),
        errors = index.errors.len(),
        "Data loaded"
    );
    index
}

fn load_file(
    data: &mut SharedData,
    path: &Path,
    root: &Path,
    registry: &HandlerRegistry,
) -> Result<(), ItemError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = keys::final_suffix(&name).unwrap_or_default();

    // Discovery matches on any suffix, so `notes.json.txt` gets here.
    let format = registry
        .get(&suffix)
        .ok_or_else(|| ItemError::UnknownSuffix {
            path: path.to_path_buf(),
            suffix: suffix.clone(),
        })?;

    let bytes = std::fs::read(path).map_err(|source| ItemError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = format.parse(&bytes).map_err(|source| ItemError::Data {
        path: path.to_path_buf(),
        source,
    })?;

    let keys = keys::derive_keys(path, root, &[suffix.as_str()]).map_err(|source| {
        ItemError::Key {
            path: path.to_path_buf(),
            source,
        }
    })?;
    data.set(&keys, value).map_err(|source| ItemError::Duplicate {
        path: path.to_path_buf(),
        source,
    })
}
