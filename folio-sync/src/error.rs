//! Error types for folio-sync.

use thiserror::Error;

use folio_cms::CmsError;
use folio_enricher::EnrichError;
use folio_github::GithubError;

/// A failed sync run. Each variant names the stage that failed.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("list repos: {0}")]
    ListRepos(#[source] GithubError),

    /// A detail worker panicked or was torn down.
    #[error("fetch details: {0}")]
    Collect(String),

    #[error("enrich: {0}")]
    Enrich(#[source] EnrichError),

    #[error("get projects: {0}")]
    GetProjects(#[source] CmsError),

    /// The stored `content` field could not be read back and `force` is off.
    #[error("get projects: stored content is undecodable ({0}); rerun with --force to overwrite")]
    UndecodableContent(String),

    #[error("digest projects: {0}")]
    Digest(#[source] serde_json::Error),

    #[error("update projects: {0}")]
    UpdateProjects(#[source] CmsError),

    #[error("publish: {0}")]
    Publish(#[source] CmsError),

    #[error("cancelled")]
    Cancelled,
}

/// Failure while appending to the shared build log. Never fails a run.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("fetch build log: {0}")]
    Fetch(#[source] CmsError),

    #[error("encode build log entry: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("save build log: {0}")]
    Save(#[source] CmsError),

    #[error("publish build log: {0}")]
    Publish(#[source] CmsError),

    #[error("cancelled")]
    Cancelled,
}
