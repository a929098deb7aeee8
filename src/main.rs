use clap::{Parser, Subcommand};
use mdmirror::site::{BatchReport, Site};
use mdmirror::{config, frontmatter, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mdmirror")]
#[command(about = "Static site generator for folders of Markdown articles")]
#[command(long_about = "\
Static site generator for folders of Markdown articles

Every article lives in its own folder next to its images and attachments.
The output tree mirrors the source tree: each article becomes an index.html
with its sibling folders and featured images copied beside it.

Source structure:

  articles/
  ├── mdmirror.toml                # Site config (optional)
  └── blog/
      ├── blog.g.md                # Digest of the folders below (generated)
      └── kbd-style/
          ├── kbd-style.md         # Article with YAML front matter
          ├── featured-image.png   # Copied next to the page
          ├── attribution.json     # Copied when present
          └── img/                 # Sibling folders are mirrored
              └── keyboard.png

Front matter keys with defined meaning: date, update, categories, tags,
published, latex, lang, related-id, author, permalink. Other keys are kept
as they are.

Run 'mdmirror gen-config' to generate a documented mdmirror.toml.")]
#[command(version)]
struct Cli {
    /// Articles directory
    #[arg(long, default_value = "articles", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "build_site", global = true)]
    output: PathBuf,

    /// Log progress at info level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render every article into the output directory
    Build,
    /// Number image captions in every article and save the files
    Captions,
    /// Write a `{folder}.g.md` digest into every folder of article folders
    Digest,
    /// Set a front matter key in every article and save the files
    SetMeta {
        /// Key to set
        key: String,
        /// Value, parsed as YAML: `true`, `2022-09-18`, `[a, b]`, `text`
        value: String,
    },
    /// List every front matter key in use
    Keys,
    /// Load every article and report problems without writing anything
    Check,
    /// Print a stock mdmirror.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Keys => {
            let (site, _) = open_site(&cli.source)?;
            output::print_keys(&site.metadata_keys());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let (site, report) = open_site(&cli.source)?;
            output::print_site_output(&site);
            if !report.failures.is_empty() {
                println!();
                output::print_report(
                    &BatchReport {
                        entries: Vec::new(),
                        failures: report.failures.clone(),
                    },
                    site.root(),
                    site.root(),
                    "Loaded",
                    ("article", "articles"),
                );
            }
            exit_if_all_failed(&report)?;
            println!("==> Articles are valid");
        }
        Command::Build => {
            let (site, _) = open_site(&cli.source)?;
            println!("==> Generating HTML → {}", cli.output.display());
            let report = site.generate_site(&cli.output)?;
            let output_root = std::path::absolute(&cli.output)?;
            output::print_report(&report, site.root(), &output_root, "Generated", ("page", "pages"));
            exit_if_all_failed(&report)?;
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Captions => {
            let (mut site, _) = open_site(&cli.source)?;
            let report = site.add_image_captions();
            output::print_report(&report, site.root(), site.root(), "Saved", ("article", "articles"));
            exit_if_all_failed(&report)?;
        }
        Command::Digest => {
            let (site, _) = open_site(&cli.source)?;
            let report = site.generate_generalized_md();
            output::print_report(&report, site.root(), site.root(), "Wrote", ("digest", "digests"));
            exit_if_all_failed(&report)?;
        }
        Command::SetMeta { key, value } => {
            let value = frontmatter::parse_value(&value)?;
            let (mut site, _) = open_site(&cli.source)?;
            let report = site.add_metadata_to_all(&key, value);
            output::print_report(&report, site.root(), site.root(), "Saved", ("article", "articles"));
            exit_if_all_failed(&report)?;
        }
    }

    Ok(())
}

/// Install the fmt subscriber on stderr.
///
/// `RUST_LOG` wins; otherwise `--verbose` selects info and the default is warn.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load config and every article under `source`, sizing the thread pool first.
fn open_site(source: &Path) -> Result<(Site, BatchReport), Box<dyn std::error::Error>> {
    let site_config = config::load_config(source)?;
    init_thread_pool(&site_config.processing);
    Ok(Site::open(source, site_config)?)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn exit_if_all_failed(report: &BatchReport) -> Result<(), Box<dyn std::error::Error>> {
    if report.all_failed() {
        return Err(format!("all {} files failed", report.failures.len()).into());
    }
    Ok(())
}
