//! Application configuration for docmirror.
//!
//! User config lives at `~/.docmirror/docmirror.toml`.
//! CLI flags override config file values, which override defaults.
//! The defaults reproduce the netdata documentation mirror.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DocMirrorError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docmirror.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docmirror";

// ---------------------------------------------------------------------------
// Config structs (matching docmirror.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Hosting API settings.
    #[serde(default)]
    pub github: GithubConfig,

    /// Output tree layout.
    #[serde(default)]
    pub output: OutputConfig,

    /// Document fetch fan-out.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Listing filter.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Source repositories, primary first.
    #[serde(default = "default_sources")]
    pub sources: Vec<RepoSpec>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            github: GithubConfig::default(),
            output: OutputConfig::default(),
            fetch: FetchConfig::default(),
            filter: FilterConfig::default(),
            sources: default_sources(),
        }
    }
}

/// `[github]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Name of the env var holding the access token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Warn before a run when fewer requests than this remain.
    #[serde(default = "default_low_rate_limit")]
    pub low_rate_limit: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            token_env: default_token_env(),
            low_rate_limit: default_low_rate_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GithubConfig {
    /// Read the access token from the configured env var, if set and non-empty.
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }
}

fn default_api_base() -> String {
    "https://api.github.com".into()
}
fn default_token_env() -> String {
    "GITHUB_TOKEN".into()
}
fn default_low_rate_limit() -> u64 {
    100
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the mirrored tree is written to (replaced on every run).
    #[serde(default = "default_output_root")]
    pub root: PathBuf,

    /// Absolute site path relative links are rewritten under.
    #[serde(default = "default_link_mount")]
    pub link_mount: String,

    /// Source subdirectory whose contents become the output root.
    #[serde(default = "default_docs_prefix")]
    pub docs_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: default_output_root(),
            link_mount: default_link_mount(),
            docs_prefix: default_docs_prefix(),
        }
    }
}

fn default_output_root() -> PathBuf {
    PathBuf::from("docs")
}
fn default_link_mount() -> String {
    "/docs".into()
}
fn default_docs_prefix() -> String {
    "docs/".into()
}

/// How the fetch fan-out joins its results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort on the first failed fetch.
    #[default]
    FailFast,
    /// Let every fetch finish, then report all failures together.
    Collect,
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum concurrent API requests.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Join semantics for the fetch fan-out.
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

fn default_concurrency() -> usize {
    8
}

/// `[filter]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Path prefixes never mirrored (root readmes, changelogs, ...).
    #[serde(default = "default_excluded_paths")]
    pub excluded_paths: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_paths: default_excluded_paths(),
        }
    }
}

fn default_excluded_paths() -> Vec<String> {
    [
        "README.md",
        "docs/README.md",
        "DOCUMENTATION.md",
        "HISTORICAL_CHANGELOG.md",
        "contrib/sles11/README.md",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// `[[sources]]` entry: one repository to mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSpec {
    /// `owner/name` on the hosting service.
    pub repo: String,

    /// Branch whose head is mirrored.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Subtree the repository's files are placed under (empty for the primary).
    #[serde(default)]
    pub prefix: String,
}

impl RepoSpec {
    pub fn new(repo: impl Into<String>, branch: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            branch: branch.into(),
            prefix: prefix.into(),
        }
    }
}

fn default_branch() -> String {
    "master".into()
}

fn default_sources() -> Vec<RepoSpec> {
    vec![
        RepoSpec::new("netdata/netdata", "master", ""),
        RepoSpec::new("netdata/go.d.plugin", "master", "collectors/go.d.plugin/"),
    ]
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Check cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<()> {
        static REPO_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").expect("valid regex")
        });

        Url::parse(&self.github.api_base).map_err(|e| {
            DocMirrorError::config(format!("github.api_base '{}': {e}", self.github.api_base))
        })?;

        if self.fetch.concurrency == 0 {
            return Err(DocMirrorError::config(
                "fetch.concurrency must be at least 1",
            ));
        }

        if !self.output.link_mount.starts_with('/') {
            return Err(DocMirrorError::config(format!(
                "output.link_mount must be an absolute site path, got '{}'",
                self.output.link_mount
            )));
        }

        if self.output.root.as_os_str().is_empty() {
            return Err(DocMirrorError::config("output.root must not be empty"));
        }

        if self.sources.is_empty() {
            return Err(DocMirrorError::config("at least one [[sources]] entry is required"));
        }

        for source in &self.sources {
            if !REPO_RE.is_match(&source.repo) {
                return Err(DocMirrorError::config(format!(
                    "source repo '{}' is not of the form owner/name",
                    source.repo
                )));
            }
            if source.branch.trim().is_empty() {
                return Err(DocMirrorError::config(format!(
                    "source '{}' has an empty branch",
                    source.repo
                )));
            }
            if source.prefix.starts_with('/') {
                return Err(DocMirrorError::config(format!(
                    "source '{}' prefix must be relative, got '{}'",
                    source.repo, source.prefix
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docmirror/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DocMirrorError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docmirror/docmirror.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocMirrorError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        DocMirrorError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    tracing::debug!(?path, sources = config.sources.len(), "config loaded");
    Ok(config)
}

/// Write a default config file at `path`, creating parent directories.
pub fn init_config_at(path: &Path) -> Result<PathBuf> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| DocMirrorError::io(dir, e))?;
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocMirrorError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| DocMirrorError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("api_base"));
        assert!(toml_str.contains("GITHUB_TOKEN"));
        assert!(toml_str.contains("netdata/go.d.plugin"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.fetch.concurrency, 8);
        assert_eq!(parsed.sources, config.sources);
        assert_eq!(parsed.filter.excluded_paths.len(), 5);
    }

    #[test]
    fn empty_file_yields_netdata_defaults() {
        let config: AppConfig = toml::from_str("").expect("parse");
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[1].prefix, "collectors/go.d.plugin/");
        assert_eq!(config.output.link_mount, "/docs");
        assert_eq!(config.output.docs_prefix, "docs/");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_with_sources_and_policy() {
        let toml_str = r#"
[fetch]
concurrency = 2
failure_policy = "collect"

[filter]
excluded_paths = ["CHANGELOG.md"]

[[sources]]
repo = "acme/widgets"
branch = "main"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.fetch.failure_policy, FailurePolicy::Collect);
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].prefix, "");
        assert_eq!(config.filter.excluded_paths, vec!["CHANGELOG.md".to_string()]);
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = AppConfig::default();
        config.fetch.concurrency = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn validate_rejects_bad_repo_and_relative_mount() {
        let mut config = AppConfig::default();
        config.sources = vec![RepoSpec::new("not-a-repo", "main", "")];
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.output.link_mount = "docs".into();
        assert!(config.validate().unwrap_err().to_string().contains("link_mount"));

        let mut config = AppConfig::default();
        config.sources.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_token_env_yields_none() {
        let mut config = GithubConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.token_env = "DOCMIRROR_TEST_NONEXISTENT_TOKEN_12345".into();
        assert!(config.token().is_none());
    }

    #[test]
    fn init_config_at_writes_loadable_file() {
        let dir = std::env::temp_dir().join(format!("docmirror-config-test-{}", uuid::Uuid::now_v7()));
        let path = dir.join("nested").join(CONFIG_FILE_NAME);

        let written = init_config_at(&path).expect("init");
        let loaded = load_config_from(&written).expect("load");
        assert_eq!(loaded.sources.len(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }
}
