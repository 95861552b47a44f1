//! # folio-cms
//!
//! Versioned read-modify-write access to the Contentful entries the sync
//! owns: the projects section and the shared build log.
//!
//! The pipeline talks to the [`ProjectStore`] trait; [`CmaClient`] is the
//! Contentful Management API implementation.

pub mod client;
pub mod document;
pub mod error;

use async_trait::async_trait;
use folio_core::Project;
use serde_json::Value;

pub use client::CmaClient;
pub use document::{BuildLogDocument, Entry, ProjectsDocument, SectionContent, Sys};
pub use error::CmsError;

/// Optimistic-concurrency store for the projects section and build log.
///
/// Every write carries the version of the snapshot it was derived from; a
/// stale version fails with [`CmsError::VersionConflict`].
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Read the projects section by entry id, falling back to its `sectionId`.
    async fn get_projects(&self, entry_id: &str) -> Result<ProjectsDocument, CmsError>;

    /// Replace the section's projects. Returns the new version.
    async fn update_projects(
        &self,
        document: &ProjectsDocument,
        projects: &[Project],
    ) -> Result<u64, CmsError>;

    /// Make `version` of the entry the published revision.
    async fn publish_entry(&self, entry_id: &str, version: u64) -> Result<(), CmsError>;

    /// Read the build log; a missing entry yields an empty document.
    async fn get_build_log(&self) -> Result<BuildLogDocument, CmsError>;

    /// Create or update the build log. Returns `(entry_id, new_version)`.
    async fn save_build_log(
        &self,
        document: &BuildLogDocument,
        entries: &[Value],
    ) -> Result<(String, u64), CmsError>;
}
