//! End-to-end `ingest` pipeline: list → filter → fetch → transform → publish.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::try_join_all;
use tracing::{info, instrument, warn};

use docmirror_github::GitHubClient;
use docmirror_shared::{
    AppConfig, FetchConfig, FilterConfig, OutputConfig, RateLimit, RepoSpec, Result, TreeEntry,
};

use crate::fetch::fetch_documents;
use crate::filter::NodeFilter;
use crate::paths::prefix_entries;
use crate::publish::{self, plan_outputs};
use crate::stages::StagePlan;

/// Configuration for the `ingest` pipeline.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Source repositories, primary first. Output order follows this order.
    pub sources: Vec<RepoSpec>,
    /// Output tree layout.
    pub output: OutputConfig,
    /// Blob fetch fan-out and failure policy.
    pub fetch: FetchConfig,
    /// Listing filter.
    pub filter: FilterConfig,
    /// Warn when fewer API requests than this remain before the run.
    pub low_rate_limit: u64,
    /// Run everything except publish.
    pub dry_run: bool,
}

impl IngestConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            sources: config.sources.clone(),
            output: config.output.clone(),
            fetch: config.fetch.clone(),
            filter: config.filter.clone(),
            low_rate_limit: config.github.low_rate_limit,
            dry_run: false,
        }
    }
}

/// Result of the `ingest` pipeline.
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// Output root the tree was (or would be) written to.
    pub output_root: PathBuf,
    /// Entries listed across all sources.
    pub entries_listed: usize,
    /// Entries that passed the filter.
    pub documents_eligible: usize,
    /// Output-relative paths, in pipeline order.
    pub output_paths: Vec<String>,
    /// Files written; zero for a dry run.
    pub files_written: usize,
    /// Records dropped by case-insensitive path collisions.
    pub collisions: usize,
    pub dry_run: bool,
    pub rate_before: RateLimit,
    pub rate_after: RateLimit,
    pub fetch_elapsed: Duration,
    pub write_elapsed: Duration,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called as each document body arrives; `current` counts completions.
    fn document_fetched(&self, path: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &IngestReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn document_fetched(&self, _path: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &IngestReport) {}
}

/// Run the full `ingest` pipeline.
///
/// 1. Rate-limit snapshot
/// 2. List every source tree (concurrently) and prefix it
/// 3. Filter, then fetch bodies
/// 4. Run the standard stage plan
/// 5. Publish (skipped for a dry run)
/// 6. Rate-limit snapshot
#[instrument(skip_all, fields(sources = config.sources.len(), dry_run = config.dry_run))]
pub async fn run_ingest(
    config: &IngestConfig,
    client: &GitHubClient,
    progress: &dyn ProgressReporter,
) -> Result<IngestReport> {
    let start = Instant::now();
    let plan = StagePlan::standard(&config.output)?;

    progress.phase("Checking rate limit");
    let rate_before = client.rate_limit().await?;
    log_rate_limit(&rate_before, "before");
    if rate_before.remaining < config.low_rate_limit {
        warn!(
            remaining = rate_before.remaining,
            threshold = config.low_rate_limit,
            "API quota is low, the run may fail part way"
        );
    }

    // --- Listing ---
    progress.phase("Listing source trees");
    let listings = try_join_all(config.sources.iter().map(|s| list_source(client, s))).await?;
    let combined: Vec<TreeEntry> = listings.into_iter().flatten().collect();
    let entries_listed = combined.len();

    let eligible = NodeFilter::from_config(&config.filter).apply(combined);
    let documents_eligible = eligible.len();
    info!(
        listed = entries_listed,
        eligible = documents_eligible,
        "filtered {entries_listed} nodes to {documents_eligible}"
    );

    // --- Fetch ---
    progress.phase(&format!("Fetching {documents_eligible} documents"));
    let fetch_start = Instant::now();
    let documents = fetch_documents(client, eligible, &config.fetch, progress).await?;
    let fetch_elapsed = fetch_start.elapsed();
    info!(elapsed_ms = fetch_elapsed.as_millis(), "fetching completed");

    // --- Transform ---
    progress.phase("Transforming documents");
    info!(stages = ?plan.stage_names(), documents = documents.len(), "running stage plan");
    let documents = plan.run(documents);

    // --- Publish ---
    let write_start = Instant::now();
    let (output_paths, files_written, collisions) = if config.dry_run {
        let (planned, collisions) = plan_outputs(&documents);
        let paths: Vec<String> = planned.into_iter().map(|(path, _)| path).collect();
        info!(files = paths.len(), root = %config.output.root.display(), "dry run, output left untouched");
        (paths, 0, collisions)
    } else {
        progress.phase(&format!("Writing {} documents", documents.len()));
        let published = publish::publish(&config.output.root, &documents)?;
        (published.paths, published.files_written, published.collisions)
    };
    let write_elapsed = write_start.elapsed();
    if !config.dry_run {
        info!(elapsed_ms = write_elapsed.as_millis(), "writing completed");
    }

    let rate_after = client.rate_limit().await?;
    log_rate_limit(&rate_after, "after");

    let report = IngestReport {
        output_root: config.output.root.clone(),
        entries_listed,
        documents_eligible,
        output_paths,
        files_written,
        collisions,
        dry_run: config.dry_run,
        rate_before,
        rate_after,
        fetch_elapsed,
        write_elapsed,
        elapsed: start.elapsed(),
    };

    progress.done(&report);

    info!(
        files = report.files_written,
        eligible = report.documents_eligible,
        elapsed_ms = report.elapsed.as_millis(),
        "ingest pipeline complete"
    );

    Ok(report)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve a source's branch, list its tree and place it under its prefix.
#[instrument(skip(client, source), fields(repo = %source.repo, branch = %source.branch))]
async fn list_source(client: &GitHubClient, source: &RepoSpec) -> Result<Vec<TreeEntry>> {
    info!(repo = %source.repo, "fetching root sha");
    let sha = client.branch_head(&source.repo, &source.branch).await?;

    info!(repo = %source.repo, "fetching nodes");
    let entries = client.tree(&source.repo, &sha).await?;

    Ok(prefix_entries(entries, &source.prefix))
}

fn log_rate_limit(rate: &RateLimit, when: &str) {
    let reset_minutes = rate.resets_in_minutes(Utc::now());
    info!(
        when,
        remaining = rate.remaining,
        limit = rate.limit,
        reset_minutes,
        "rate limit {} / {} requests per hour remaining, reset in {reset_minutes} minutes",
        rate.remaining,
        rate.limit,
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
