//! Document fetcher: turns eligible tree entries into document records.
//!
//! Blob requests fan out through a `buffered` stream, so at most
//! `fetch.concurrency` requests are in flight and results come back in input
//! order regardless of completion order.

use std::sync::atomic::{AtomicUsize, Ordering};

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, instrument, warn};

use docmirror_github::GitHubClient;
use docmirror_shared::{DocMirrorError, Document, FailurePolicy, FetchConfig, Result, TreeEntry};

use crate::pipeline::ProgressReporter;

/// Fetch the body of every entry.
///
/// With [`FailurePolicy::FailFast`] the first failure (in input order) is
/// returned and outstanding requests are dropped. With
/// [`FailurePolicy::Collect`] every request runs to completion and all
/// failures are reported together as [`DocMirrorError::Fetch`].
#[instrument(skip_all, fields(documents = entries.len(), concurrency = config.concurrency))]
pub async fn fetch_documents(
    client: &GitHubClient,
    entries: Vec<TreeEntry>,
    config: &FetchConfig,
    progress: &dyn ProgressReporter,
) -> Result<Vec<Document>> {
    let total = entries.len();
    let completed = AtomicUsize::new(0);
    let completed = &completed;

    let fetches = stream::iter(entries)
        .map(|entry| async move {
            let path = entry.path.clone();
            let result = fetch_one(client, entry).await;

            let current = completed.fetch_add(1, Ordering::Relaxed) + 1;
            progress.document_fetched(&path, current, total);

            result.map_err(|err| (path, err))
        })
        .buffered(config.concurrency.max(1));

    let documents = match config.failure_policy {
        FailurePolicy::FailFast => {
            fetches
                .map_err(|(path, err)| {
                    warn!(%path, error = %err, "document fetch failed, aborting");
                    err
                })
                .try_collect::<Vec<_>>()
                .await?
        }
        FailurePolicy::Collect => {
            let results: Vec<_> = fetches.collect().await;
            let mut documents = Vec::with_capacity(results.len());
            let mut failures = Vec::new();

            for result in results {
                match result {
                    Ok(document) => documents.push(document),
                    Err((path, err)) => failures.push((path, err.to_string())),
                }
            }

            if !failures.is_empty() {
                warn!(failed = failures.len(), total, "document fetches failed");
                return Err(DocMirrorError::Fetch { failures });
            }
            documents
        }
    };

    info!(documents = documents.len(), "fetched document bodies");
    Ok(documents)
}

async fn fetch_one(client: &GitHubClient, entry: TreeEntry) -> Result<Document> {
    let bytes = client.blob(&entry.url).await?;

    let body = match String::from_utf8(bytes) {
        Ok(text) => text,
        // Invalid sequences become U+FFFD; such documents are not written back byte for byte.
        Err(err) => {
            warn!(path = %entry.path, "document is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    };

    debug!(path = %entry.path, bytes = body.len(), "fetched document");
    Ok(Document::new(entry, body))
}
