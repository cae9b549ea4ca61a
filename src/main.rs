use clap::{Parser, Subcommand};
use sitetree::{config, output, site::Site};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sitetree")]
#[command(about = "Static site generator: content and data trees in, HTML out")]
#[command(long_about = "\
Static site generator: content and data trees in, HTML out

Every markdown file under content/ becomes an HTML page rendered through a
template. Data files under data/ become one nested tree every template can
read.

Project structure:

  my-site/
  ├── site.toml                    # Config (optional)
  ├── content/
  │   ├── index.md                 # → build/index.html
  │   └── blog/
  │       └── first.yaml.md        # → build/blog/first.html
  ├── data/
  │   ├── site.yaml                # → data.site
  │   └── nav/main.json            # → data.nav.main
  ├── templates/
  │   ├── index.html               # Default template (required)
  │   └── post.html                # Picked with `template: post.html`
  ├── scss/                        # → build/css (compiled)
  ├── assets/                      # → build/assets
  └── js/                          # → build/js

Front matter is YAML (---), TOML (+++) or a JSON object ({ ... }).

Run 'sitetree gen-config' to generate a documented site.toml.")]
#[command(version)]
struct Cli {
    /// Project directory
    #[arg(long, default_value = ".", global = true)]
    project: PathBuf,

    /// Config file, relative to the project directory
    #[arg(long, default_value = config::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Log progress at info level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the project and write the site into the build folder
    Build,
    /// Load the project and print the sitemap, data and errors without building
    Check,
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // --verbose enables INFO, otherwise RUST_LOG or WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Build => {
            let mut site = open(&cli)?;
            let report = site.build()?;
            output::print_report(&report);
            if !report.errors.is_empty() {
                std::process::exit(1);
            }
        }
        Command::Check => {
            let site = open(&cli)?;
            output::print_check(&site);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn open(cli: &Cli) -> Result<Site, Box<dyn std::error::Error>> {
    let project = cli.project.canonicalize()?;
    let site_config = config::load_project(&project, &cli.config)?;
    Ok(Site::new(site_config)?)
}
