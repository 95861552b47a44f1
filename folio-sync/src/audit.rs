//! Best-effort append to the build log shared with other services.
//!
//! The log keeps every other service's records untouched and at most
//! [`OWN_ENTRIES_KEPT`] previous records of ours, followed by the new one.

use chrono::{DateTime, SecondsFormat, Utc};
use folio_cms::ProjectStore;
use folio_core::{BuildLogEntry, SyncStats, Trigger};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::AuditError;

/// `service` value written on our records.
pub const SERVICE_NAME: &str = "github-cms-sync";
/// Previous records of ours kept alongside the new one.
pub const OWN_ENTRIES_KEPT: usize = 2;

pub fn build_entry(
    stats: &SyncStats,
    trigger: Trigger,
    force_update: bool,
    now: DateTime<Utc>,
) -> BuildLogEntry {
    BuildLogEntry {
        service: SERVICE_NAME.to_string(),
        timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        triggered_by: trigger.to_string(),
        force_update,
        translation_used: false,
        new_added: stats.new_added,
        total_after_sync: stats.total,
        status: stats.status.to_string(),
    }
}

/// `others ++ last OWN_ENTRIES_KEPT of ours ++ new`, others in their
/// original order and content.
pub fn merge_build_log(existing: Vec<Value>, new: Value) -> Vec<Value> {
    let (own, mut merged): (Vec<Value>, Vec<Value>) =
        existing.into_iter().partition(|entry| is_own(entry));

    let skip = own.len().saturating_sub(OWN_ENTRIES_KEPT);
    merged.extend(own.into_iter().skip(skip));
    merged.push(new);
    merged
}

fn is_own(entry: &Value) -> bool {
    entry.get("service").and_then(Value::as_str) == Some(SERVICE_NAME)
}

/// Read, merge, write and publish the build log.
pub async fn append_entry(
    store: &dyn ProjectStore,
    entry: &BuildLogEntry,
    cancel: &CancellationToken,
) -> Result<(), AuditError> {
    let new = serde_json::to_value(entry).map_err(AuditError::Encode)?;

    let work = async {
        let document = store.get_build_log().await.map_err(AuditError::Fetch)?;
        let entries = merge_build_log(document.entries.clone(), new);
        let (entry_id, version) = store
            .save_build_log(&document, &entries)
            .await
            .map_err(AuditError::Save)?;
        store
            .publish_entry(&entry_id, version)
            .await
            .map_err(AuditError::Publish)?;
        tracing::info!(entry_id = %entry_id, entries = entries.len(), "build log recorded");
        Ok(())
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AuditError::Cancelled),
        result = work => result,
    }
}
