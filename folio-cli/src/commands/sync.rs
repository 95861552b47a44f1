//! `folio sync` — run the GitHub → CMS pipeline once.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};
use tokio_util::sync::CancellationToken;

use folio_cms::CmaClient;
use folio_core::{Config, SyncStats, SyncStatus};
use folio_enricher::{Enricher, GeminiClient};
use folio_github::GithubClient;
use folio_sync::{Pipeline, RunOptions};

/// Hard ceiling for one run, audit included.
const RUN_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Arguments for `folio sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Write even if the stored content is unchanged or undecodable.
    #[arg(long)]
    pub force: bool,

    /// Compute the new project list without writing anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                tracing::warn!(error = %err, "could not load .env");
            }
        }
        let config = Config::from_env().context("config")?;
        tracing::debug!(?config, "configuration loaded");

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to start tokio runtime")?;
        let stats = runtime.block_on(self.sync(config))?;

        print_summary(&stats);
        Ok(())
    }

    async fn sync(&self, config: Config) -> Result<SyncStats> {
        let options = RunOptions {
            force: self.force,
            dry_run: self.dry_run,
        };

        let source = GithubClient::new(config.github_token.clone()).context("github client")?;
        let generator = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())
            .context("gemini client")?;
        let store = CmaClient::new(
            config.space_id.clone(),
            config.environment.clone(),
            config.cma_token.clone(),
        )
        .context("contentful client")?;

        let pipeline = Pipeline::new(
            config,
            Arc::new(source),
            Enricher::new(Arc::new(generator)),
            Arc::new(store),
        );

        let cancel = CancellationToken::new();
        let watchdog = tokio::spawn(cancel_on_timeout_or_ctrl_c(cancel.clone()));

        let result = pipeline.run(options, &cancel).await.context("sync");
        if let Ok(stats) = &result {
            if !options.dry_run {
                pipeline.record_run(stats, options, &cancel).await;
            }
        }

        watchdog.abort();
        result
    }
}

async fn cancel_on_timeout_or_ctrl_c(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = tokio::time::sleep(RUN_TIMEOUT) => {
            tracing::warn!(timeout_secs = RUN_TIMEOUT.as_secs(), "run timed out, cancelling");
        }
        _ = ctrl_c => tracing::info!("received ctrl-c, cancelling"),
    }
    cancel.cancel();
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "slug")]
    slug: String,
    #[tabled(rename = "category")]
    category: String,
    #[tabled(rename = "featured")]
    featured: &'static str,
    #[tabled(rename = "last push")]
    last_push: String,
}

fn print_summary(stats: &SyncStats) {
    match stats.status {
        SyncStatus::Success => println!(
            "✓ Sync complete: {} projects ({} new)",
            stats.total, stats.new_added
        ),
        SyncStatus::Unchanged => println!(
            "✓ Sync complete: {} projects ({} new) {}",
            stats.total,
            stats.new_added,
            "unchanged, nothing written".yellow()
        ),
        SyncStatus::DryRun => println!(
            "[dry-run] would write {} projects ({} new)",
            stats.total, stats.new_added
        ),
    }

    if stats.projects.is_empty() {
        return;
    }

    let rows: Vec<ProjectRow> = stats
        .projects
        .iter()
        .map(|p| ProjectRow {
            slug: p.slug.clone(),
            category: p.category.clone(),
            featured: if p.featured { "★" } else { "" },
            last_push: p
                .pushed_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
