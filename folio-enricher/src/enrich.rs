//! Batch enrichment.
//!
//! All projects go out in one request. Rate-limit failures are retried with a
//! linear backoff (`base_delay × attempt`); anything else fails the batch at
//! once. The reply is matched back to the input strictly by array position.

use std::sync::Arc;
use std::time::Duration;

use folio_core::{Project, RawProject};
use tokio_util::sync::CancellationToken;

use crate::error::EnrichError;
use crate::prompt::{build_batch_prompt, strip_fences, GeneratedProject, SYSTEM_PROMPT};
use crate::TextGenerator;

/// Retry settings for rate-limited requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Wait before retry `n` is `base_delay * n`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(20),
        }
    }
}

pub struct Enricher {
    generator: Arc<dyn TextGenerator>,
    policy: RetryPolicy,
}

impl Enricher {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self::with_policy(generator, RetryPolicy::default())
    }

    pub fn with_policy(generator: Arc<dyn TextGenerator>, policy: RetryPolicy) -> Self {
        Self { generator, policy }
    }

    /// Enrich `projects` in one batch.
    ///
    /// The output keeps input order. When the reply is shorter than the input
    /// the unmatched projects are dropped with a warning; extra reply items
    /// are ignored.
    pub async fn enrich(
        &self,
        projects: &[RawProject],
        cancel: &CancellationToken,
    ) -> Result<Vec<Project>, EnrichError> {
        tracing::info!(count = projects.len(), "sending projects to gemini in a single batch");

        let payload = build_batch_prompt(projects).map_err(EnrichError::Payload)?;
        let response = self.generate_with_retry(&payload, cancel).await?;

        let generated: Vec<GeneratedProject> =
            serde_json::from_str(strip_fences(&response)).map_err(EnrichError::Parse)?;

        let enriched = match_by_position(projects, generated);
        tracing::info!(
            enriched = enriched.len(),
            requested = projects.len(),
            "gemini returned project data"
        );
        Ok(enriched)
    }

    async fn generate_with_retry(
        &self,
        payload: &str,
        cancel: &CancellationToken,
    ) -> Result<String, EnrichError> {
        let mut attempt: u32 = 0;
        loop {
            if attempt > 0 {
                let backoff = self.policy.base_delay * attempt;
                tracing::info!(
                    attempt,
                    max_retries = self.policy.max_retries,
                    backoff_secs = backoff.as_secs_f64(),
                    "retrying gemini request"
                );
                tokio::select! {
                    _ = cancel.cancelled() => return Err(EnrichError::Cancelled),
                    _ = tokio::time::sleep(backoff) => {}
                }
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => return Err(EnrichError::Cancelled),
                result = self.generator.generate(SYSTEM_PROMPT, payload) => result,
            };

            match result {
                Ok(text) => return Ok(text),
                Err(err) if !err.is_rate_limited() => return Err(EnrichError::Generate(err)),
                Err(source) if attempt >= self.policy.max_retries => {
                    return Err(EnrichError::RetriesExhausted {
                        retries: self.policy.max_retries,
                        source,
                    })
                }
                Err(err) => {
                    tracing::warn!(attempt, error = %err, "gemini rate limited, will retry");
                    attempt += 1;
                }
            }
        }
    }
}

/// Pair `generated[i]` with `projects[i]`.
pub fn match_by_position(projects: &[RawProject], generated: Vec<GeneratedProject>) -> Vec<Project> {
    let mut generated = generated.into_iter();
    let mut out = Vec::with_capacity(projects.len());

    for raw in projects {
        let Some(data) = generated.next() else {
            tracing::warn!(repo = %raw.name, "gemini did not return data, skipping");
            continue;
        };
        out.push(Project {
            name: data.name,
            slug: raw.slug.clone(),
            short_description: data.short_description,
            description: data.description,
            long_description: data.long_description,
            github_url: raw.github_url.clone(),
            live_url: raw.live_url.clone(),
            technologies: data.technologies,
            highlights: data.highlights,
            featured: false,
            gradient: data.gradient,
            category: data.category,
            pushed_at: raw.pushed_at,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(index: usize, name: &str) -> RawProject {
        RawProject {
            index,
            name: name.to_string(),
            slug: name.to_string(),
            github_url: format!("https://github.com/octo/{name}"),
            live_url: None,
            languages: vec![],
            readme: String::new(),
            size: 0,
            pushed_at: None,
        }
    }

    fn generated(name: &str) -> GeneratedProject {
        GeneratedProject {
            name: name.to_string(),
            category: "Backend".to_string(),
            ..GeneratedProject::default()
        }
    }

    #[test]
    fn shorter_reply_drops_the_tail() {
        let input = vec![raw(0, "a"), raw(1, "b"), raw(2, "c")];
        let out = match_by_position(&input, vec![generated("A"), generated("B")]);
        assert_eq!(out.len(), 2);
        assert_eq!((out[0].slug.as_str(), out[0].name.as_str()), ("a", "A"));
        assert_eq!((out[1].slug.as_str(), out[1].name.as_str()), ("b", "B"));
        assert!(out.iter().all(|p| !p.featured));
    }

    #[test]
    fn longer_reply_ignores_extras() {
        let input = vec![raw(0, "a")];
        let out = match_by_position(&input, vec![generated("A"), generated("Z")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].github_url, "https://github.com/octo/a");
    }
}
