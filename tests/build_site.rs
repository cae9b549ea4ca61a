//! End-to-end builds over a copy of `fixtures/site/`.

use pretty_assertions::assert_eq;
use serde_json::json;
use sitetree::assets::copy_dir_recursive;
use sitetree::config::{self, CONFIG_FILE};
use sitetree::site::Site;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn fixture_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn open(project: &Path) -> Site {
    let project = project.canonicalize().unwrap();
    let config = config::load_project(&project, Path::new(CONFIG_FILE)).unwrap();
    Site::new(config).unwrap()
}

#[test]
fn loads_sitemap_and_data_trees() {
    let tmp = fixture_project();
    let site = open(tmp.path());

    let sitemap = serde_json::to_value(site.sitemap()).unwrap();
    assert_eq!(sitemap["test1"]["title"], json!("Test One"));
    assert_eq!(sitemap["test1"]["tags"], json!(["intro", "fixtures"]));
    assert_eq!(sitemap["subfolder"]["test2"]["template"], json!("alternate.html"));
    assert_eq!(
        sitemap["subfolder"]["subsubfolder"]["test3"]["date"],
        json!("2024-03-01")
    );
    assert_eq!(
        sitemap["subfolder"]["subsubfolder"]["test4"]["title"],
        json!("Test Four")
    );
    assert!(sitemap.get("no-front-matter").is_none());

    let data = serde_json::to_value(site.data()).unwrap();
    assert_eq!(data["site"]["name"], json!("Fixture Site"));
    assert_eq!(data["nav"]["main"][1]["title"], json!("Second"));
    assert_eq!(data["settings"]["show_footer"], json!(true));
    assert!(data.get("broken").is_none());

    assert_eq!(site.flat().len(), 5);
    assert_eq!(site.templates().len(), 3);
    assert_eq!(site.log().len(), 2);
}

#[test]
fn builds_the_fixture_site() {
    let tmp = fixture_project();
    let mut site = open(tmp.path());
    let report = site.build().unwrap();

    assert_eq!(report.pages_built, 4);
    assert_eq!(report.pages_skipped, 1);
    assert_eq!(report.errors.len(), 2);

    let build = tmp.path().join("build");
    let home = fs::read_to_string(build.join("test1.html")).unwrap();
    assert!(home.contains("<title>Test One</title>"));
    assert!(home.contains("<header>Fixture Site</header>"));
    assert!(home.contains(">Second</a>"));
    assert!(home.contains("<strong>bold</strong>"));
    assert!(home.contains("<footer>Built from fixtures</footer>"));
    assert!(home.contains("class=\"default\""));

    let second = fs::read_to_string(build.join("subfolder/test2.html")).unwrap();
    assert!(second.contains("class=\"alternate\""));
    assert!(second.contains("<aside>examples</aside>"));
    assert!(second.contains("<em>alternate</em>"));

    assert!(build.join("subfolder/subsubfolder/test3.html").is_file());
    assert!(build.join("subfolder/subsubfolder/test4.html").is_file());

    let css = fs::read_to_string(build.join("css/style.css")).unwrap();
    assert!(css.contains("#0055aa"));
    assert!(build.join("assets/robots.txt").is_file());
    assert!(build.join("js/site.js").is_file());
}

#[test]
fn site_toml_overrides_defaults() {
    let tmp = fixture_project();
    fs::write(
        tmp.path().join(CONFIG_FILE),
        r#"
build_path = "public"
data_in_build = true
handlers = [".json", ".yaml", ".yml"]

[scss]
active = false
"#,
    )
    .unwrap();

    let mut site = open(tmp.path());
    // TOML is no longer a handler: settings.toml is not data, and the
    // TOML front matter page is rejected.
    assert!(site.data().leaf(&["settings"]).is_none());
    assert!(site.sitemap().leaf(&["subfolder", "subsubfolder", "test4"]).is_none());

    let report = site.build().unwrap();
    assert_eq!(report.pages_built, 3);

    let public = tmp.path().join("public");
    assert!(public.join("css/plain.css").is_file());
    assert!(!public.join("css/style.css").exists());
    assert!(public.join("__data/site.yaml").is_file());
    assert!(!tmp.path().join("build").exists());
}

#[test]
fn rebuilding_gives_identical_output() {
    let tmp = fixture_project();
    let mut site = open(tmp.path());
    site.build().unwrap();
    let first = fs::read_to_string(tmp.path().join("build/subfolder/test2.html")).unwrap();

    site.reload();
    site.build().unwrap();
    let second = fs::read_to_string(tmp.path().join("build/subfolder/test2.html")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn sitemap_edits_are_visible_to_templates() {
    let tmp = fixture_project();
    fs::write(
        tmp.path().join("templates/index.html"),
        "{% for key, page in sitemap|items %}{{ key }};{% endfor %}",
    )
    .unwrap();

    let mut site = open(tmp.path());
    site.sitemap_mut().remove(&["subfolder"]).unwrap();
    site.build().unwrap();

    let home = fs::read_to_string(tmp.path().join("build/test1.html")).unwrap();
    assert_eq!(home, "test1;");
}

#[test]
fn repeated_builds_report_the_same_errors() {
    let tmp = fixture_project();
    let mut site = open(tmp.path());

    let first = site.build().unwrap();
    let second = site.build().unwrap();

    assert_eq!(first.errors.len(), 2);
    assert_eq!(second.errors, first.errors);
    assert_eq!(second.pages_built, first.pages_built);
    assert_eq!(site.log().len(), 2);
}
