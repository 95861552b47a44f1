//! Error types for folio-cms.

use thiserror::Error;

/// Errors from the Contentful Management API.
#[derive(Debug, Error)]
pub enum CmsError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Neither the entry id nor the `sectionId` fallback resolved.
    #[error("no siteSection entry found with id or sectionId {0:?}")]
    NotFound(String),

    /// The entry changed since it was read; the write was rejected.
    #[error("version conflict on entry {entry_id}: version {version} is stale")]
    VersionConflict { entry_id: String, version: u64 },

    /// Any other non-success response.
    #[error("CMA {operation} failed ({status}): {body}")]
    Api {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// A stored field did not have the expected shape.
    #[error("decode {field}: {reason}")]
    Decode { field: &'static str, reason: String },
}
