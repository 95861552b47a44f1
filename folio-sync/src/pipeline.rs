//! The sync run: list → filter → collect → enrich → select → get → gate →
//! update → publish. The build log is appended separately by
//! [`Pipeline::record_run`] and never fails the run.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use folio_cms::{ProjectStore, SectionContent};
use folio_core::{Config, Project, SyncStats, SyncStatus};
use folio_enricher::{EnrichError, Enricher};
use folio_github::RepoSource;
use tokio_util::sync::CancellationToken;

use crate::audit;
use crate::collector::{collect_details, DETAIL_CONCURRENCY};
use crate::digest::content_digest;
use crate::error::SyncError;
use crate::featured::apply_featured;
use crate::filter::filter_repos;

/// Per-invocation switches layered on top of [`Config`].
///
/// Without `force`, a run whose selected projects hash to the same digest
/// as the stored content skips the update and publish and reports
/// [`SyncStatus::Unchanged`]. A dry run never writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Write even when the content is unchanged or the stored content is
    /// undecodable. Or-ed with `Config::force_update`.
    pub force: bool,
    /// Stop after reading the stored section; write nothing.
    pub dry_run: bool,
}

pub struct Pipeline {
    config: Config,
    source: Arc<dyn RepoSource>,
    enricher: Enricher,
    store: Arc<dyn ProjectStore>,
}

impl Pipeline {
    pub fn new(
        config: Config,
        source: Arc<dyn RepoSource>,
        enricher: Enricher,
        store: Arc<dyn ProjectStore>,
    ) -> Self {
        Self {
            config,
            source,
            enricher,
            store,
        }
    }

    fn force(&self, options: RunOptions) -> bool {
        options.force || self.config.force_update
    }

    pub async fn run(
        &self,
        options: RunOptions,
        cancel: &CancellationToken,
    ) -> Result<SyncStats, SyncError> {
        let force = self.force(options);
        let owner = self.config.github_username.as_str();

        tracing::info!(owner, "fetching repositories");
        let repos = cancellable(cancel, self.source.list_repos(owner))
            .await?
            .map_err(SyncError::ListRepos)?;
        let listed = repos.len();
        let repos = filter_repos(repos, owner);
        tracing::info!(listed, kept = repos.len(), "filtered repositories");

        if repos.is_empty() {
            tracing::info!("no repositories to sync");
            return Ok(SyncStats::default());
        }

        let raw = collect_details(
            Arc::clone(&self.source),
            owner,
            &repos,
            DETAIL_CONCURRENCY,
            cancel,
        )
        .await?;

        let enriched = self.enricher.enrich(&raw, cancel).await.map_err(|err| match err {
            EnrichError::Cancelled => SyncError::Cancelled,
            other => SyncError::Enrich(other),
        })?;

        let selected = apply_featured(enriched, self.config.max_featured, self.config.max_projects);
        let featured = selected.iter().filter(|p| p.featured).count();

        tracing::info!(entry_id = %self.config.entry_id, "fetching current projects");
        let document = cancellable(cancel, self.store.get_projects(&self.config.entry_id))
            .await?
            .map_err(SyncError::GetProjects)?;

        let previous: &[Project] = match &document.content {
            SectionContent::Projects(projects) => projects,
            SectionContent::Missing => {
                tracing::info!("content field is empty, creating it");
                &[]
            }
            SectionContent::Undecodable(reason) if force => {
                tracing::warn!(reason = %reason, "stored content is undecodable, overwriting");
                &[]
            }
            SectionContent::Undecodable(reason) => {
                return Err(SyncError::UndecodableContent(reason.clone()))
            }
        };
        log_slug_changes(previous, &selected);

        let mut stats = SyncStats {
            total: selected.len(),
            new_added: selected.len() as i64 - previous.len() as i64,
            featured,
            status: SyncStatus::Success,
            projects: selected,
        };

        if options.dry_run {
            tracing::info!(total = stats.total, "dry run, not writing");
            stats.status = SyncStatus::DryRun;
            return Ok(stats);
        }

        if !force {
            let current = content_digest(previous).map_err(SyncError::Digest)?;
            let next = content_digest(&stats.projects).map_err(SyncError::Digest)?;
            if current == next {
                tracing::info!(digest = %next, "stored content is up to date, skipping write");
                stats.status = SyncStatus::Unchanged;
                return Ok(stats);
            }
        }

        tracing::info!(total = stats.total, version = document.version, "updating projects");
        let version = cancellable(cancel, self.store.update_projects(&document, &stats.projects))
            .await?
            .map_err(SyncError::UpdateProjects)?;

        tracing::info!(version, "publishing");
        cancellable(cancel, self.store.publish_entry(&document.entry_id, version))
            .await?
            .map_err(SyncError::Publish)?;

        Ok(stats)
    }

    /// Append this run to the shared build log. Failures are logged only.
    pub async fn record_run(&self, stats: &SyncStats, options: RunOptions, cancel: &CancellationToken) {
        tracing::info!("recording build log");
        let entry = audit::build_entry(stats, self.config.trigger, self.force(options), Utc::now());
        if let Err(err) = audit::append_entry(self.store.as_ref(), &entry, cancel).await {
            tracing::warn!(error = %err, "failed to record build log");
        }
    }
}

async fn cancellable<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, SyncError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SyncError::Cancelled),
        out = fut => Ok(out),
    }
}

fn log_slug_changes(previous: &[Project], selected: &[Project]) {
    let before: HashSet<&str> = previous.iter().map(|p| p.slug.as_str()).collect();
    let after: HashSet<&str> = selected.iter().map(|p| p.slug.as_str()).collect();
    let added: Vec<&str> = after.difference(&before).copied().collect();
    let removed: Vec<&str> = before.difference(&after).copied().collect();
    tracing::debug!(?added, ?removed, "project set changes");
}
