//! Build session: load everything once, then render the site.
//!
//! ```text
//! Site::new(config)
//!   ├── create build/                  (fatal on failure)
//!   ├── check content/ exists          (fatal)
//!   ├── load templates, need index.html (fatal)
//!   ├── data::load(data/)      → data tree      ┐ recoverable errors
//!   └── content::load(content/) → sitemap + flat ┘ go to the log
//!
//! Site::build()
//!   ├── assets/ → build/assets, js/ → build/js
//!   ├── scss/ → build/css (compiled) or css/ → build/css (copied)
//!   ├── every flat page → build/**/*.html
//!   └── data/ → build/__data (data_in_build)
//! ```
//!
//! Pages are parsed twice: once while loading (for the sitemap) and once more
//! while rendering. A page that fails either time is skipped. The log keeps
//! one entry per file and condition, however often the site is built.

use crate::assets::{self, AssetError};
use crate::config::{ConfigError, SiteConfig};
use crate::content::{self, FlatSiteList, SiteMap};
use crate::data::{self, SharedData};
use crate::handlers::HandlerRegistry;
use crate::keys::{self, PathError};
use crate::render::{self, Bindings, NoDefaultTemplate, TemplateSet};
use crate::report::{BuildLog, BuildReport, ItemError};
use chrono::Local;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Could not create build folder {}: {source}", .path.display())]
    BuildFolder {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Missing {what} directory: {} does not exist.", .path.display())]
    MissingDirectory { what: &'static str, path: PathBuf },
    #[error(transparent)]
    NoDefaultTemplate(#[from] NoDefaultTemplate),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// One build session over a project.
pub struct Site {
    config: SiteConfig,
    registry: HandlerRegistry,
    content_root: PathBuf,
    build_root: PathBuf,
    templates: TemplateSet,
    data: SharedData,
    sitemap: SiteMap,
    flat: FlatSiteList,
    log: BuildLog,
}

impl Site {
    /// Open a session. Only unusable configurations fail here; problems with
    /// individual files end up in [`Site::log`].
    pub fn new(config: SiteConfig) -> Result<Self, SiteError> {
        config.validate()?;
        let registry = config.registry()?;

        let build_dir = config.build_dir();
        std::fs::create_dir_all(&build_dir).map_err(|source| SiteError::BuildFolder {
            path: build_dir.clone(),
            source,
        })?;
        let build_root = build_dir
            .canonicalize()
            .map_err(|source| SiteError::BuildFolder {
                path: build_dir.clone(),
                source,
            })?;

        let content_dir = config.content_dir();
        let content_root = content_dir
            .canonicalize()
            .ok()
            .filter(|p| p.is_dir())
            .ok_or(SiteError::MissingDirectory {
                what: "content",
                path: content_dir,
            })?;

        let templates = TemplateSet::load(&config.templates_dir())?;

        let mut site = Self {
            config,
            registry,
            content_root,
            build_root,
            templates,
            data: SharedData::new(),
            sitemap: SiteMap::new(),
            flat: FlatSiteList::new(),
            log: BuildLog::new(),
        };
        site.reload();
        Ok(site)
    }

    /// Load data and content again from disk, replacing the current trees
    /// and the log.
    pub fn reload(&mut self) {
        self.log.clear();

        let data_index = data::load(&self.config.data_dir(), &self.registry);
        self.data = data_index.data;
        self.log.record_all(data_index.errors);

        let content_index =
            content::load(&self.content_root, &self.registry, self.config.plain_markdown);
        self.sitemap = content_index.sitemap;
        self.flat = content_index.flat;
        self.log.record_all(content_index.errors);

        tracing::info!(
            data = self.data.leaf_count(),
            pages = self.flat.len(),
            errors = self.log.len(),
            "Site loaded"
        );
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn data(&self) -> &SharedData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut SharedData {
        &mut self.data
    }

    pub fn sitemap(&self) -> &SiteMap {
        &self.sitemap
    }

    pub fn sitemap_mut(&mut self) -> &mut SiteMap {
        &mut self.sitemap
    }

    /// Every discovered content file, in discovery order.
    pub fn flat(&self) -> &[PathBuf] {
        &self.flat
    }

    pub fn templates(&self) -> &[PathBuf] {
        self.templates.templates()
    }

    /// Canonical content directory.
    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    /// Canonical templates directory.
    pub fn templates_root(&self) -> &Path {
        self.templates.root()
    }

    pub fn log(&self) -> &BuildLog {
        &self.log
    }

    /// Write the site into the build folder.
    pub fn build(&mut self) -> Result<BuildReport, SiteError> {
        let build_start = Local::now();

        self.copy_optional("assets", &self.config.assets_dir(), "assets")?;
        self.copy_optional("js", &self.config.js_dir(), "js")?;
        self.build_stylesheets()?;
        let (pages_built, pages_skipped) = self.build_content()?;
        if self.config.data_in_build {
            self.copy_optional("data", &self.config.data_dir(), "__data")?;
        }

        let report = BuildReport {
            build_start,
            build_end: Local::now(),
            pages_built,
            pages_skipped,
            errors: self.log.entries().to_vec(),
        };
        tracing::info!(
            built = report.pages_built,
            skipped = report.pages_skipped,
            ms = report.build_time().num_milliseconds(),
            "Build finished"
        );
        Ok(report)
    }

    fn copy_optional(&self, what: &str, src: &Path, target: &str) -> Result<(), SiteError> {
        if !src.is_dir() {
            tracing::debug!(what, path = %src.display(), "Skipping missing directory");
            return Ok(());
        }
        tracing::info!(what, "Copying");
        assets::copy_tree(src, &self.build_root.join(target))?;
        Ok(())
    }

    fn build_stylesheets(&mut self) -> Result<(), SiteError> {
        if !self.config.scss.active {
            return self.copy_optional("css", &self.config.css_dir(), "css");
        }

        let scss_dir = self.config.scss_dir();
        if !scss_dir.is_dir() {
            tracing::debug!(path = %scss_dir.display(), "Skipping missing scss directory");
            return Ok(());
        }
        tracing::info!("Compiling stylesheets");
        let errors = assets::compile_scss(
            &scss_dir,
            &self.build_root.join("css"),
            self.config.scss.output_style,
        )?;
        for error in &errors {
            self.log.record_once(error);
        }
        Ok(())
    }

    fn build_content(&mut self) -> Result<(usize, usize), SiteError> {
        tracing::info!(pages = self.flat.len(), "Rendering pages");
        let mut built = 0;
        let mut skipped = 0;

        for source in &self.flat {
            let page = match content::parse_page(source, &self.registry) {
                Ok(page) if page.has_metadata => page,
                Ok(_) => {
                    skipped += 1;
                    self.log.record_once(&ItemError::EmptyMetadata {
                        path: source.clone(),
                    });
                    continue;
                }
                Err(e) => {
                    skipped += 1;
                    self.log.record_once(&e);
                    continue;
                }
            };

            let destination =
                match destination_path(source, &self.content_root, &self.build_root, &self.registry)
                {
                    Ok(destination) => destination,
                    Err(source_err) => {
                        skipped += 1;
                        self.log.record_once(&ItemError::Key {
                            path: source.clone(),
                            source: source_err,
                        });
                        continue;
                    }
                };

            let template = self.templates.resolve(page.metadata.template.as_deref());
            let body = render::markdown_to_html(&page.body);
            let bindings = Bindings {
                data: &self.data,
                sitemap: &self.sitemap,
                config: &self.config,
                metadata: &page.metadata,
                content: &body,
            };
            let html = match self.templates.render(template, &bindings) {
                Ok(html) => html,
                Err(e) => {
                    skipped += 1;
                    self.log.record_once(&ItemError::Render {
                        path: source.clone(),
                        source: e,
                    });
                    continue;
                }
            };

            assets::write_output(&destination, &html)?;
            tracing::debug!(
                source = %source.display(),
                destination = %destination.display(),
                template,
                "Page written"
            );
            built += 1;
        }

        Ok((built, skipped))
    }
}

/// Map a content file to its HTML output path.
///
/// `content/sub/b.json.md` becomes `build/sub/b.html`: the trailing `.md` is
/// dropped, then a trailing registered handler suffix, then `.html` is added.
pub fn destination_path(
    source: &Path,
    content_root: &Path,
    build_root: &Path,
    registry: &HandlerRegistry,
) -> Result<PathBuf, PathError> {
    let relative = source
        .strip_prefix(content_root)
        .map_err(|_| PathError::NotBeneath {
            path: source.to_path_buf(),
            base: content_root.to_path_buf(),
        })?;
    let file_name = relative
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| PathError::NoFileName(source.to_path_buf()))?;

    let mut stem = file_name.strip_suffix(".md").unwrap_or(&file_name);
    if let Some(suffix) = keys::final_suffix(stem)
        && registry.get(&suffix).is_some()
    {
        stem = &stem[..stem.len() - suffix.len()];
    }

    Ok(build_root.join(relative.with_file_name(format!("{stem}.html"))))
}
