//! # folio-sync
//!
//! Orchestration of one GitHub → CMS sync run.
//!
//! Build a [`Pipeline`] from a [`folio_core::Config`] and the three service
//! seams (repo source, enricher, project store), then call
//! [`Pipeline::run`] followed by [`Pipeline::record_run`].

pub mod audit;
pub mod collector;
pub mod digest;
pub mod error;
pub mod featured;
pub mod filter;
pub mod pipeline;

pub use error::{AuditError, SyncError};
pub use pipeline::{Pipeline, RunOptions};
