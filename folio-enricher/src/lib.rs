//! # folio-enricher
//!
//! Turns [`folio_core::RawProject`]s into [`folio_core::Project`]s with one
//! batched call to a generative text service.
//!
//! - [`TextGenerator`] — the seam to the service; [`GeminiClient`] implements it
//! - [`prompt`] — system instruction, batch payload, fence stripping
//! - [`enrich`] — retry/backoff and positional matching ([`Enricher`])

pub mod enrich;
pub mod error;
pub mod gemini;
pub mod prompt;

use async_trait::async_trait;

pub use enrich::{Enricher, RetryPolicy};
pub use error::{EnrichError, GenerateError};
pub use gemini::GeminiClient;

/// One system instruction + one user payload in, one completion out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, user: &str) -> Result<String, GenerateError>;
}
