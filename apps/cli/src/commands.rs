//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use mddocset_core::pipeline::{BuildReport, ProgressReporter};
use mddocset_shared::{AppConfig, BuildConfig, default_config_path, init_config, load_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// mddocset: turn Markdown API docs into an offline docset.
#[derive(Parser)]
#[command(
    name = "mddocset",
    version,
    about = "Convert a tree of Markdown API documentation into a searchable offline docset.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Build the docset bundle from the configured source tree.
    Build {
        /// Config file (defaults to ./mddocset.toml if present).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Docset name (overrides `docset.name`).
        #[arg(short, long)]
        name: Option<String>,

        /// Source root holding `<name>/<section prefix>/<section>/` (overrides `paths.source_root`).
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Output root for the bundle (overrides `paths.output_root`).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a config file with defaults.
    Init {
        /// Where to write it (defaults to ./mddocset.toml).
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show resolved configuration.
    Show {
        /// Config file to resolve (defaults to ./mddocset.toml if present).
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "mddocset=info",
        1 => "mddocset=debug",
        _ => "mddocset=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build {
            config,
            name,
            source,
            out,
        } => cmd_build(config.as_deref(), name, source, out).await,
        Command::Config { action } => match action {
            ConfigAction::Init { path } => cmd_config_init(path.as_deref()).await,
            ConfigAction::Show { config } => cmd_config_show(config.as_deref()).await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

/// Merge the config file with CLI overrides.
fn resolve_build_config(
    config_path: Option<&Path>,
    name: Option<String>,
    source: Option<PathBuf>,
    out: Option<PathBuf>,
) -> Result<BuildConfig> {
    let config = load_config(config_path)?;
    let mut build = BuildConfig::from(&config);

    if let Some(name) = name {
        build.name = name;
    }
    if let Some(source) = source {
        build.source_root = source;
    }
    if let Some(out) = out {
        build.output_root = out;
    }

    build.validate()?;
    Ok(build)
}

async fn cmd_build(
    config_path: Option<&Path>,
    name: Option<String>,
    source: Option<PathBuf>,
    out: Option<PathBuf>,
) -> Result<()> {
    let build = resolve_build_config(config_path, name, source, out)?;

    info!(
        name = %build.name,
        input = %build.input_dir().display(),
        output = %build.bundle_dir().display(),
        "building docset"
    );

    let reporter = CliProgress::new();
    let report = mddocset_core::pipeline::build_docset(&build, &reporter).await?;

    println!();
    println!("  Docset built.");
    println!("  Name:     {}", build.name);
    println!("  Sections: {}", report.sections);
    println!(
        "  Pages:    {} written, {} failed",
        report.documents_written, report.documents_failed
    );
    println!("  Index:    {} entries", report.index_entries);
    println!("  Path:     {}", report.bundle_path.display());
    println!(
        "  Time:     {:.1}s",
        report.elapsed.as_secs_f64()
    );
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn document_done(&self, file: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Rendering [{current}/{total}] {file}"));
    }

    fn done(&self, _report: &BuildReport) {
        self.spinner.finish_and_clear();
    }
}

async fn cmd_config_init(path: Option<&Path>) -> Result<()> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if path.exists() {
        return Err(eyre!("config file '{}' already exists", path.display()));
    }
    let path = init_config(&path)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config: AppConfig = load_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
