//! Error types for folio-enricher.

use thiserror::Error;

/// Errors from a single text-generation call.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The service answered 2xx but without any candidate text.
    #[error("response contained no text")]
    EmptyResponse,
}

impl GenerateError {
    /// Rate limiting shows up as HTTP 429 or as a `RESOURCE_EXHAUSTED`
    /// marker somewhere in the error text.
    pub fn is_rate_limited(&self) -> bool {
        if let GenerateError::Api { status: 429, .. } = self {
            return true;
        }
        let text = self.to_string();
        text.contains("429") || text.contains("RESOURCE_EXHAUSTED")
    }
}

/// Errors from a whole batch enrichment.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// A non-retryable generation failure.
    #[error("gemini: {0}")]
    Generate(#[source] GenerateError),

    /// Still rate limited after every retry.
    #[error("gemini after {retries} retries: {source}")]
    RetriesExhausted {
        retries: u32,
        #[source]
        source: GenerateError,
    },

    /// The batch payload could not be encoded.
    #[error("encode batch payload: {0}")]
    Payload(#[source] serde_json::Error),

    /// The completion was not a JSON array of project objects.
    #[error("parse gemini response: {0}")]
    Parse(#[source] serde_json::Error),

    /// The run was cancelled while a request or backoff was pending.
    #[error("enrichment cancelled")]
    Cancelled,
}
