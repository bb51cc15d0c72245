//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use docmirror_core::pipeline::{IngestConfig, IngestReport, ProgressReporter, run_ingest};
use docmirror_github::GitHubClient;
use docmirror_shared::{AppConfig, config_file_path, init_config_at, load_config, load_config_from};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docmirror: mirror repository markdown into a static-site docs tree.
#[derive(Parser)]
#[command(
    name = "docmirror",
    version,
    about = "Mirror markdown documentation from GitHub repositories into a local docs tree.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.docmirror/docmirror.toml).
    #[arg(long, global = true, env = "DOCMIRROR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
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
    /// Fetch, transform and write the documentation tree.
    Ingest {
        /// Output directory (overrides output.root).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Run everything except writing; print the paths that would be written.
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the current API quota for the configured credential.
    RateLimit,

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
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docmirror=info",
        1 => "docmirror=debug",
        _ => "docmirror=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Ingest { out, dry_run } => cmd_ingest(config_path, out, dry_run).await,
        Command::RateLimit => cmd_rate_limit(config_path).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path).await,
            ConfigAction::Show => cmd_config_show(config_path).await,
        },
    }
}

/// Load from `--config` when given, otherwise the default location.
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_ingest(config_path: Option<&Path>, out: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let mut config = resolve_config(config_path)?;
    if let Some(out) = out {
        config.output.root = out;
    }

    let client = GitHubClient::from_config(&config.github)?;

    let mut ingest_config = IngestConfig::from_app(&config);
    ingest_config.dry_run = dry_run;

    info!(
        sources = ingest_config.sources.len(),
        root = %ingest_config.output.root.display(),
        dry_run,
        "starting ingest"
    );

    let reporter = CliProgress::new();
    let report = run_ingest(&ingest_config, &client, &reporter).await?;

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &IngestReport) {
    println!();
    if report.dry_run {
        println!("  Dry run, nothing written. Would write:");
        for path in &report.output_paths {
            println!("    {path}");
        }
        println!();
    } else {
        println!("  Documentation mirrored successfully!");
    }
    println!("  Listed:    {}", report.entries_listed);
    println!("  Eligible:  {}", report.documents_eligible);
    println!("  Written:   {}", report.files_written);
    if report.collisions > 0 {
        println!("  Collided:  {}", report.collisions);
    }
    println!("  Output:    {}", report.output_root.display());
    println!("  Fetch:     {} ms", report.fetch_elapsed.as_millis());
    if !report.dry_run {
        println!("  Write:     {} ms", report.write_elapsed.as_millis());
    }
    println!(
        "  Quota:     {} / {} remaining",
        report.rate_after.remaining, report.rate_after.limit
    );
    println!("  Time:      {:.1}s", report.elapsed.as_secs_f64());
    println!();
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
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn document_fetched(&self, path: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetching [{current}/{total}] {path}"));
    }

    fn done(&self, _report: &IngestReport) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    // Clear the spinner when the pipeline fails before `done`.
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

async fn cmd_rate_limit(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let client = GitHubClient::from_config(&config.github)?;

    let rate = client.rate_limit().await?;
    let auth = if client.is_authenticated() {
        "authenticated"
    } else {
        "unauthenticated"
    };

    println!(
        "Rate limit {} / {} requests per hour remaining ({auth}). Reset in {} minutes.",
        rate.remaining,
        rate.limit,
        rate.resets_in_minutes(Utc::now())
    );
    Ok(())
}

async fn cmd_config_init(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => config_file_path()?,
    };
    if path.exists() {
        return Err(eyre!("config file already exists at {}", path.display()));
    }

    init_config_at(&path)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
