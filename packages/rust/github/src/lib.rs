//! GitHub REST client for the few endpoints docmirror needs.
//!
//! - [`GitHubClient::rate_limit`]: quota introspection (logging only)
//! - [`GitHubClient::branch_head`]: resolve a branch to its commit sha
//! - [`GitHubClient::tree`]: recursive tree listing at a sha
//! - [`GitHubClient::blob`]: base64 blob content, decoded to bytes
//!
//! The base URL is configurable so tests can point the client at a mock server.

mod payload;

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use docmirror_shared::{DocMirrorError, GithubConfig, RateLimit, Result, TreeEntry};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("docmirror/", env!("CARGO_PKG_VERSION"));

/// Media type GitHub recommends for REST v3.
const GITHUB_JSON: &str = "application/vnd.github+json";

// ---------------------------------------------------------------------------
// GitHubClient
// ---------------------------------------------------------------------------

/// Thin authenticated wrapper over `reqwest` for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    /// API root, always ending in `/` so relative joins keep its path.
    api_base: Url,
    authenticated: bool,
}

impl GitHubClient {
    /// Build a client from the `[github]` config section, reading the token from its env var.
    pub fn from_config(config: &GithubConfig) -> Result<Self> {
        let token = config.token();
        if token.is_none() {
            warn!(
                token_env = %config.token_env,
                "no access token found, requests are unauthenticated (60 requests/hour)"
            );
        }
        Self::new(&config.api_base, token.as_deref(), config.timeout_secs)
    }

    /// Build a client for `api_base`, optionally authenticating with `token`.
    pub fn new(api_base: &str, token: Option<&str>, timeout_secs: u64) -> Result<Self> {
        let api_base = Url::parse(&format!("{}/", api_base.trim_end_matches('/')))
            .map_err(|e| DocMirrorError::config(format!("invalid API base '{api_base}': {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("token {token}"))
                .map_err(|_| DocMirrorError::config("access token contains invalid characters"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DocMirrorError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base,
            authenticated: token.is_some(),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Current quota for the calling credential.
    #[instrument(skip(self))]
    pub async fn rate_limit(&self) -> Result<RateLimit> {
        let url = self.endpoint("rate_limit")?;
        let body: payload::RateLimitResponse = self.get_json(url).await?;
        body.rate.into_rate_limit()
    }

    /// Resolve `branch` of `repo` (`owner/name`) to its head commit sha.
    #[instrument(skip(self))]
    pub async fn branch_head(&self, repo: &str, branch: &str) -> Result<String> {
        let url = self.endpoint(&format!("repos/{repo}/branches/{branch}"))?;
        let body: payload::BranchResponse = self.get_json(url).await?;
        debug!(sha = %body.commit.sha, "resolved branch head");
        Ok(body.commit.sha)
    }

    /// Flat recursive listing of every node under tree `sha`.
    #[instrument(skip(self))]
    pub async fn tree(&self, repo: &str, sha: &str) -> Result<Vec<TreeEntry>> {
        let mut url = self.endpoint(&format!("repos/{repo}/git/trees/{sha}"))?;
        url.query_pairs_mut().append_pair("recursive", "true");

        let body: payload::TreeResponse = self.get_json(url).await?;
        if body.truncated {
            warn!(
                entries = body.tree.len(),
                "tree listing was truncated by the API, some files will be missing"
            );
        }
        debug!(entries = body.tree.len(), "listed tree");
        Ok(body.tree)
    }

    /// Raw bytes of the blob behind a tree entry's content handle.
    #[instrument(skip(self))]
    pub async fn blob(&self, handle: &str) -> Result<Vec<u8>> {
        // Handles are absolute API URLs; `join` also accepts relative ones.
        let url = self
            .api_base
            .join(handle)
            .map_err(|e| DocMirrorError::decode(format!("invalid content handle '{handle}': {e}")))?;
        let body: payload::BlobResponse = self.get_json(url).await?;
        body.into_bytes()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_base
            .join(path)
            .map_err(|e| DocMirrorError::config(format!("invalid endpoint '{path}': {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DocMirrorError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocMirrorError::Api {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| DocMirrorError::Network(format!("{url}: failed to read body: {e}")))?;

        serde_json::from_str(&text)
            .map_err(|e| DocMirrorError::decode(format!("{url}: unexpected response: {e}")))
    }
}
