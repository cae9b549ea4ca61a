//! Suffix-to-format registry for data files and front matter.
//!
//! The registry is built once from the configured suffix list and handed by
//! reference to both loaders. Every suffix maps to one [`Format`]:
//!
//! | Suffix | Format |
//! |--------|--------|
//! | `.json` | JSON (serde_json) |
//! | `.yaml`, `.yml` | YAML (serde_yaml) |
//! | `.toml` | TOML (toml) |
//!
//! All formats decode into `serde_json::Value`, the one value type the trees
//! and the templates work with.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unknown handler suffix {0}")]
    UnknownSuffix(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    /// Format for a known handler suffix.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            ".json" => Some(Format::Json),
            ".yaml" | ".yml" => Some(Format::Yaml),
            ".toml" => Some(Format::Toml),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Toml => "toml",
        }
    }

    /// Decode raw bytes into a structured value.
    pub fn parse(self, bytes: &[u8]) -> Result<Value, HandlerError> {
        match self {
            Format::Json => Ok(serde_json::from_slice(bytes)?),
            Format::Yaml => Ok(serde_yaml::from_slice(bytes)?),
            Format::Toml => {
                let text = std::str::from_utf8(bytes)?;
                let value: toml::Value = toml::from_str(text)?;
                Ok(toml_to_json(value))
            }
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Convert a TOML value to JSON. Datetimes become RFC 3339 strings.
pub fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// The accepted handler suffixes and their formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Format>,
}

impl HandlerRegistry {
    /// Build a registry from suffix strings such as `".json"`.
    pub fn from_suffixes<S: AsRef<str>>(suffixes: &[S]) -> Result<Self, HandlerError> {
        let handlers = suffixes
            .iter()
            .map(|s| {
                let s = s.as_ref();
                Format::from_suffix(s)
                    .map(|format| (s.to_string(), format))
                    .ok_or_else(|| HandlerError::UnknownSuffix(s.to_string()))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { handlers })
    }

    pub fn get(&self, suffix: &str) -> Option<Format> {
        self.handlers.get(suffix).copied()
    }

    /// All registered suffixes, sorted.
    pub fn suffixes(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    /// Whether front matter written in `format` is accepted.
    pub fn accepts_format(&self, format: Format) -> bool {
        self.handlers.values().any(|f| *f == format)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::from_suffixes(&[".json", ".yaml", ".yml", ".toml"])
            .expect("stock suffixes must all be known")
    }
}
