//! Markdown and template rendering.
//!
//! Pages are rendered in two steps: the markdown body becomes HTML with
//! [pulldown-cmark](https://docs.rs/pulldown-cmark), then a template from the
//! project's templates directory wraps it. Templates are
//! [MiniJinja](https://docs.rs/minijinja) files loaded by name relative to
//! that directory, so `{% extends "base.html" %}` and `{% include %}` work
//! across files.
//!
//! ## Template selection
//!
//! `index.html` at the root of the templates directory is the default and
//! must exist. A page picks another one with `template: alternate.html` in its
//! front matter; a name that does not point at an existing file falls back to
//! the default.
//!
//! ## Variables
//!
//! | Name | Value |
//! |------|-------|
//! | `metadata` | the page's front matter, with defaults filled in |
//! | `content` | the rendered markdown body (not escaped again) |
//! | `data` | the shared data tree |
//! | `sitemap` | the whole sitemap |
//! | `config` | the site configuration |

use crate::config::SiteConfig;
use crate::content::{ContentMetadata, SiteMap};
use crate::data::SharedData;
use crate::discover;
use minijinja::{Environment, Value, context};
use pulldown_cmark::{Parser, html as md_html};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_TEMPLATE: &str = "index.html";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

#[derive(Error, Debug)]
#[error("No default template found: {} does not exist.", .0.display())]
pub struct NoDefaultTemplate(pub PathBuf);

/// Convert markdown to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut html = String::new();
    md_html::push_html(&mut html, parser);
    html
}

/// Everything a template sees for one page.
pub struct Bindings<'a> {
    pub data: &'a SharedData,
    pub sitemap: &'a SiteMap,
    pub config: &'a SiteConfig,
    pub metadata: &'a ContentMetadata,
    pub content: &'a str,
}

/// The project's templates.
pub struct TemplateSet {
    root: PathBuf,
    templates: Vec<PathBuf>,
    env: Environment<'static>,
}

impl TemplateSet {
    /// Index the templates directory. Fails when the default template is missing.
    pub fn load(root: &Path) -> Result<Self, NoDefaultTemplate> {
        let default = root.join(DEFAULT_TEMPLATE);
        if !default.is_file() {
            return Err(NoDefaultTemplate(default));
        }

        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let mut templates = discover::find_files(&root, &[".html"], None);
        templates.sort();

        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(root.clone()));

        Ok(Self {
            root,
            templates,
            env,
        })
    }

    /// All `*.html` files under the templates directory, sorted.
    pub fn templates(&self) -> &[PathBuf] {
        &self.templates
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Name of the template to use for a page asking for `requested`.
    pub fn resolve<'a>(&self, requested: Option<&'a str>) -> &'a str {
        match requested {
            Some(name) if !name.is_empty() && self.exists(name) => name,
            _ => DEFAULT_TEMPLATE,
        }
    }

    fn exists(&self, name: &str) -> bool {
        let relative = Path::new(name);
        relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
            && self.root.join(relative).is_file()
    }

    /// Render template `name` with the page bindings.
    pub fn render(&self, name: &str, bindings: &Bindings<'_>) -> Result<String, RenderError> {
        let template = self.env.get_template(name)?;
        let ctx = context! {
            data => Value::from_serialize(bindings.data),
            sitemap => Value::from_serialize(bindings.sitemap),
            config => Value::from_serialize(bindings.config),
            metadata => Value::from_serialize(bindings.metadata),
            content => Value::from_safe_string(bindings.content.to_string()),
        };
        Ok(template.render(ctx)?)
    }
}
