//! Site configuration module.
//!
//! Handles loading, merging, and validating `site.toml`. The file lives at the
//! project root next to the source directories:
//!
//! ```text
//! my-site/
//! ├── site.toml        # optional, overrides stock defaults
//! ├── content/
//! ├── data/
//! ├── templates/
//! ├── scss/
//! ├── assets/
//! └── js/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! build_path = "build"
//! content_path = "content"
//! data_path = "data"
//! templates_path = "templates"
//! js_path = "js"
//! assets_path = "assets"
//! css_path = "css"          # copied as-is when scss is inactive
//! data_in_build = false     # also copy data/ to build/__data
//! handlers = [".json", ".yaml", ".yml", ".toml"]
//! plain_markdown = true     # accept plain `name.md` pages
//!
//! [scss]
//! active = true
//! path = "scss"
//! output_style = "compressed"   # compressed | nested | expanded
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! build_path = "public"
//!
//! [scss]
//! active = false
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::handlers::{HandlerError, HandlerRegistry};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "site.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid path for {key}: {value:?} must be non-empty and must not end with a separator")]
    InvalidPath { key: &'static str, value: String },
    #[error("Invalid handler: {0}")]
    Handler(#[from] HandlerError),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Output directory, created on demand.
    pub build_path: String,
    /// Page sources. Must exist.
    pub content_path: String,
    /// Shared data files.
    pub data_path: String,
    /// Templates directory. Must contain `index.html`.
    pub templates_path: String,
    pub js_path: String,
    pub assets_path: String,
    /// Plain stylesheets, used only when SCSS is inactive.
    pub css_path: String,
    /// Copy the data directory into `build/__data`.
    pub data_in_build: bool,
    /// Handler suffixes for data files and front matter.
    pub handlers: Vec<String>,
    /// Accept `name.md` pages without a handler suffix.
    pub plain_markdown: bool,
    pub scss: ScssConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            build_path: "build".to_string(),
            content_path: "content".to_string(),
            data_path: "data".to_string(),
            templates_path: "templates".to_string(),
            js_path: "js".to_string(),
            assets_path: "assets".to_string(),
            css_path: "css".to_string(),
            data_in_build: false,
            handlers: [".json", ".yaml", ".yml", ".toml"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            plain_markdown: true,
            scss: ScssConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate paths and handlers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in self.paths() {
            if !is_valid_path(value) {
                return Err(ConfigError::InvalidPath {
                    key,
                    value: value.to_string(),
                });
            }
        }
        if self.handlers.is_empty() {
            return Err(ConfigError::Validation(
                "handlers must not be empty".into(),
            ));
        }
        self.registry()?;
        Ok(())
    }

    /// Build the handler registry from the configured suffixes.
    pub fn registry(&self) -> Result<HandlerRegistry, ConfigError> {
        Ok(HandlerRegistry::from_suffixes(&self.handlers)?)
    }

    /// Make every relative path absolute against `project_dir`.
    pub fn resolve_paths(&mut self, project_dir: &Path) {
        for value in self.paths_mut() {
            let path = Path::new(value.as_str());
            if path.is_relative() {
                *value = project_dir.join(path).display().to_string();
            }
        }
    }

    pub fn build_dir(&self) -> PathBuf {
        PathBuf::from(&self.build_path)
    }

    pub fn content_dir(&self) -> PathBuf {
        PathBuf::from(&self.content_path)
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_path)
    }

    pub fn templates_dir(&self) -> PathBuf {
        PathBuf::from(&self.templates_path)
    }

    pub fn js_dir(&self) -> PathBuf {
        PathBuf::from(&self.js_path)
    }

    pub fn assets_dir(&self) -> PathBuf {
        PathBuf::from(&self.assets_path)
    }

    pub fn css_dir(&self) -> PathBuf {
        PathBuf::from(&self.css_path)
    }

    pub fn scss_dir(&self) -> PathBuf {
        PathBuf::from(&self.scss.path)
    }

    fn paths(&self) -> [(&'static str, &str); 8] {
        [
            ("build_path", self.build_path.as_str()),
            ("content_path", self.content_path.as_str()),
            ("data_path", self.data_path.as_str()),
            ("templates_path", self.templates_path.as_str()),
            ("js_path", self.js_path.as_str()),
            ("assets_path", self.assets_path.as_str()),
            ("css_path", self.css_path.as_str()),
            ("scss.path", self.scss.path.as_str()),
        ]
    }

    fn paths_mut(&mut self) -> [&mut String; 8] {
        [
            &mut self.build_path,
            &mut self.content_path,
            &mut self.data_path,
            &mut self.templates_path,
            &mut self.js_path,
            &mut self.assets_path,
            &mut self.css_path,
            &mut self.scss.path,
        ]
    }
}

fn is_valid_path(value: &str) -> bool {
    !value.is_empty() && !value.ends_with('/') && !value.ends_with(std::path::MAIN_SEPARATOR)
}

/// SCSS compilation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScssConfig {
    /// Compile SCSS instead of copying the css directory.
    pub active: bool,
    pub path: String,
    pub output_style: OutputStyle,
}

impl Default for ScssConfig {
    fn default() -> Self {
        Self {
            active: true,
            path: "scss".to_string(),
            output_style: OutputStyle::Compressed,
        }
    }
}

/// CSS output style. `nested` is accepted and rendered like `expanded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    Compressed,
    Nested,
    Expanded,
}

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config does not serialize: {e}")))
}

/// Lay a user's `site.toml` over the stock defaults.
///
/// Sections such as `[scss]` merge key by key, so setting `scss.active`
/// keeps the stock `scss.path`. Any other value, arrays like `handlers`
/// included, replaces the default outright.
pub fn merge_toml(defaults: toml::Value, user: toml::Value) -> toml::Value {
    match (defaults, user) {
        (toml::Value::Table(mut defaults), toml::Value::Table(user)) => {
            for (key, value) in user {
                let merged = match defaults.remove(&key) {
                    Some(default) => merge_toml(default, value),
                    None => value,
                };
                defaults.insert(key, merged);
            }
            toml::Value::Table(defaults)
        }
        (_, user) => user,
    }
}

/// Parse `site.toml` without applying defaults. A project without one is
/// `Ok(None)`; an unreadable or malformed file is an error.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    Ok(Some(toml::from_str(&text)?))
}

/// Turn the defaults plus the user's settings into a checked [`SiteConfig`].
/// Unknown keys and invalid paths or handlers are rejected here.
pub fn resolve_config(
    defaults: toml::Value,
    user: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match user {
        Some(user) => merge_toml(defaults, user),
        None => defaults,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`, falling back to defaults when it is absent.
///
/// Paths are returned as written; see [`SiteConfig::resolve_paths`].
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Load `config_file` (relative to `project_dir` unless absolute) and resolve
/// every configured path against `project_dir`.
pub fn load_project(project_dir: &Path, config_file: &Path) -> Result<SiteConfig, ConfigError> {
    let mut config = load_config(&project_dir.join(config_file))?;
    config.resolve_paths(project_dir);
    Ok(config)
}

/// Returns a fully-commented stock `site.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Site configuration
# ==================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Relative paths are resolved against
# the project directory. Unknown keys will cause an error.

# Output directory. Created if missing.
build_path = "build"

# Pages. Every `*.md` file below this directory becomes an HTML page.
content_path = "content"

# Shared data files, exposed to templates as `data`.
data_path = "data"

# Templates. `index.html` is the default and must exist.
templates_path = "templates"

# Copied verbatim to build/js and build/assets.
js_path = "js"
assets_path = "assets"

# Copied verbatim to build/css when [scss] is inactive.
css_path = "css"

# Also copy the data directory to build/__data.
data_in_build = false

# File suffixes that carry data. Also decides which front matter
# formats are accepted: .json, .yaml/.yml, .toml.
handlers = [".json", ".yaml", ".yml", ".toml"]

# Accept `name.md` pages. When false, pages need a handler suffix
# before .md (`name.yaml.md`).
plain_markdown = true

# ---------------------------------------------------------------------------
# SCSS
# ---------------------------------------------------------------------------
[scss]
# Compile scss/ into build/css. Files starting with `_` are partials.
active = true
path = "scss"

# compressed | nested | expanded
output_style = "compressed"
"##
}
