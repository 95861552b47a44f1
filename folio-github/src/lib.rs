//! # folio-github
//!
//! Read-only GitHub REST client for the repositories of one owner.
//!
//! The pipeline depends on the [`RepoSource`] trait; [`GithubClient`] is the
//! production implementation.

pub mod client;
pub mod error;

use std::collections::HashMap;

use async_trait::async_trait;
use folio_core::SourceRepo;

pub use client::GithubClient;
pub use error::GithubError;

/// The upstream listing and detail calls the sync pipeline needs.
#[async_trait]
pub trait RepoSource: Send + Sync {
    /// Every public repository owned by `owner`.
    async fn list_repos(&self, owner: &str) -> Result<Vec<SourceRepo>, GithubError>;

    /// Language name → byte count.
    async fn repo_languages(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<HashMap<String, u64>, GithubError>;

    /// The raw README text.
    async fn repo_readme(&self, owner: &str, repo: &str) -> Result<String, GithubError>;
}
