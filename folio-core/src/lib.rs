//! Folio core library — domain types, configuration, errors.
//!
//! - [`types`] — repositories as they flow through the sync pipeline
//! - [`config`] — [`Config`] loaded from the process environment
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, Trigger};
pub use error::ConfigError;
pub use types::{BuildLogEntry, Project, RawProject, SourceRepo, SyncStats, SyncStatus};
