//! # Sitetree
//!
//! A small static site generator. Two directories are read into nested trees
//! that every template can see, and every markdown page becomes one HTML file.
//!
//! ```text
//! content/blog/hello.yaml.md  →  sitemap.blog.hello  →  build/blog/hello.html
//! data/nav/main.json          →  data.nav.main
//! ```
//!
//! # Architecture: Load, Then Build
//!
//! A [`site::Site`] is one session. Constructing it loads everything; calling
//! [`site::Site::build`] writes the output:
//!
//! ```text
//! 1. Load    data/     →  data tree      (data::load)
//!            content/  →  sitemap + flat (content::load)
//! 2. Build   assets, js, scss/css  →  build/
//!            flat pages            →  build/**/*.html
//! ```
//!
//! Loading never stops at a bad file. Each file that cannot be used becomes
//! an [`report::ItemError`], the session records it once in its
//! [`report::BuildLog`], and the next file is processed. Only an unusable
//! project (no content directory, no default template, a build folder that
//! cannot be created, an invalid config) is fatal.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`keys`] | File path → key path (`blog/about.yaml.md` → `["blog", "about"]`) |
//! | [`tree`] | `NestedTree`, the keyed tree behind the sitemap and the data |
//! | [`discover`] | Recursive file discovery filtered by suffix |
//! | [`handlers`] | Suffix → format registry (JSON, YAML, TOML) |
//! | [`frontmatter`] | Front-matter block detection and parsing |
//! | [`content`] | Content loader: sitemap + flat page list |
//! | [`data`] | Data loader: one tree of decoded data files |
//! | [`render`] | Markdown → HTML and MiniJinja templates |
//! | [`assets`] | Directory copies and SCSS compilation |
//! | [`report`] | Recoverable errors, the session log, the build report |
//! | [`site`] | The build session tying it all together |
//! | [`config`] | `site.toml` loading, merging, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Value Type
//!
//! JSON, YAML and TOML all decode into `serde_json::Value`. Templates, the
//! data tree and page metadata share that representation, so a template does
//! not care which format a file was written in. TOML datetimes become
//! strings on the way.
//!
//! ## Runtime Templates
//!
//! Templates are [MiniJinja](https://docs.rs/minijinja) files read from the
//! project's templates directory at build time. Site authors change the HTML
//! without recompiling anything, and `{% extends %}` works across files.
//! Output is auto-escaped; only the rendered markdown is inserted raw.
//!
//! ## Sorted Trees
//!
//! Tree branches are `BTreeMap`s. Listing the sitemap in a template or on the
//! command line gives the same order on every machine, whatever order the
//! filesystem returned the files in.

pub mod assets;
pub mod config;
pub mod content;
pub mod data;
pub mod discover;
pub mod frontmatter;
pub mod handlers;
pub mod keys;
pub mod output;
pub mod render;
pub mod report;
pub mod site;
pub mod tree;

#[cfg(test)]
pub(crate) mod test_helpers;
