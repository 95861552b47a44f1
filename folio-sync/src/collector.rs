//! Parallel detail fetch (languages + README) for the filtered repositories.
//!
//! Workers run on a `JoinSet` gated by a semaphore. Each worker returns its
//! repo's index so the output can be put back into input order, whatever
//! order the workers finish in.

use std::collections::HashMap;
use std::sync::Arc;

use folio_core::{RawProject, SourceRepo};
use folio_github::RepoSource;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::SyncError;

/// Maximum number of repositories fetched at once.
pub const DETAIL_CONCURRENCY: usize = 5;

/// Fetch details for every repo in `repos`.
///
/// A failed languages or README fetch is logged and replaced with an empty
/// value; a repo is never dropped. Cancellation aborts the outstanding
/// workers and returns [`SyncError::Cancelled`].
pub async fn collect_details(
    source: Arc<dyn RepoSource>,
    owner: &str,
    repos: &[SourceRepo],
    concurrency: usize,
    cancel: &CancellationToken,
) -> Result<Vec<RawProject>, SyncError> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut workers = JoinSet::new();

    for (index, repo) in repos.iter().cloned().enumerate() {
        let source = Arc::clone(&source);
        let semaphore = Arc::clone(&semaphore);
        let owner = owner.to_string();
        workers.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            fetch_one(source.as_ref(), &owner, index, &repo).await
        });
    }

    let mut projects = Vec::with_capacity(repos.len());
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                workers.abort_all();
                return Err(SyncError::Cancelled);
            }
            next = workers.join_next() => next,
        };
        match next {
            None => break,
            Some(Ok(project)) => projects.push(project),
            Some(Err(err)) => return Err(SyncError::Collect(err.to_string())),
        }
    }

    projects.sort_by_key(|project| project.index);
    Ok(projects)
}

async fn fetch_one(
    source: &dyn RepoSource,
    owner: &str,
    index: usize,
    repo: &SourceRepo,
) -> RawProject {
    let (languages, readme) = tokio::join!(
        source.repo_languages(owner, &repo.name),
        source.repo_readme(owner, &repo.name),
    );

    let languages = languages.unwrap_or_else(|err| {
        tracing::warn!(repo = %repo.name, error = %err, "could not fetch languages");
        HashMap::new()
    });
    let readme = readme.unwrap_or_else(|err| {
        tracing::warn!(repo = %repo.name, error = %err, "could not fetch README");
        String::new()
    });

    RawProject::from_repo(index, repo, languages, readme)
}
