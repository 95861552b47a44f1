//! Domain types for the GitHub → CMS sync.
//!
//! A repository moves through three shapes: [`SourceRepo`] as listed by
//! GitHub, [`RawProject`] once its languages and README are attached, and
//! [`Project`] after enrichment. Only [`Project`] is persisted.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Source repositories
// ---------------------------------------------------------------------------

/// A repository as returned by the GitHub REST API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SourceRepo {
    pub id: u64,
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub size: u64,
    /// `null` for repositories that never received a push.
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
}

impl SourceRepo {
    /// The external homepage, treating an empty string as absent.
    pub fn live_url(&self) -> Option<String> {
        self.homepage
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_owned)
    }
}

// ---------------------------------------------------------------------------
// Pre-enrichment projection
// ---------------------------------------------------------------------------

/// A filtered repository with its details attached, ready for enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProject {
    /// Position in the filtered repository list. Stable for the whole run.
    pub index: usize,
    pub name: String,
    pub slug: String,
    pub github_url: String,
    pub live_url: Option<String>,
    /// Language names, heaviest first.
    pub languages: Vec<String>,
    pub readme: String,
    pub size: u64,
    pub pushed_at: Option<DateTime<Utc>>,
}

impl RawProject {
    /// Build a raw project from a repository and its fetched details.
    ///
    /// `languages` is the byte-count map from GitHub; it is flattened into a
    /// list sorted by descending weight, ties broken by name.
    pub fn from_repo<I>(index: usize, repo: &SourceRepo, languages: I, readme: String) -> Self
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        let mut weighted: Vec<(String, u64)> = languages.into_iter().collect();
        weighted.sort_by(|(a_name, a_bytes), (b_name, b_bytes)| {
            b_bytes.cmp(a_bytes).then_with(|| a_name.cmp(b_name))
        });

        Self {
            index,
            name: repo.name.clone(),
            slug: repo.name.clone(),
            github_url: repo.html_url.clone(),
            live_url: repo.live_url(),
            languages: weighted.into_iter().map(|(name, _)| name).collect(),
            readme,
            size: repo.size,
            pushed_at: repo.pushed_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Enriched project (persisted shape)
// ---------------------------------------------------------------------------

/// A project as stored in the CMS `content` field.
///
/// `pushed_at` only drives ranking and is never written to the CMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(default)]
    pub github_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub technologies: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub gradient: String,
    #[serde(default)]
    pub category: String,
    #[serde(skip)]
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Decode an explicit `null` as the type's default. Stored documents and
/// model replies both write empty lists as `null`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ---------------------------------------------------------------------------
// Run results
// ---------------------------------------------------------------------------

/// Terminal status of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// The CMS entry was written and published (or there was nothing to sync).
    #[default]
    Success,
    /// The stored content already matched; no write was issued.
    Unchanged,
    /// `--dry-run`: the selection was computed but nothing was written.
    #[serde(rename = "dry-run")]
    DryRun,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Success => write!(f, "success"),
            SyncStatus::Unchanged => write!(f, "unchanged"),
            SyncStatus::DryRun => write!(f, "dry-run"),
        }
    }
}

/// Aggregate counts reported at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncStats {
    /// Projects in the final selection.
    pub total: usize,
    /// `total` minus the number of projects stored before the run. Negative
    /// when the selection shrank.
    pub new_added: i64,
    pub featured: usize,
    pub status: SyncStatus,
    /// The final selection, in stored order.
    pub projects: Vec<Project>,
}

/// One record of the shared build log kept in the CMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildLogEntry {
    pub service: String,
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
    pub triggered_by: String,
    #[serde(default)]
    pub force_update: bool,
    #[serde(default)]
    pub translation_used: bool,
    #[serde(default)]
    pub new_added: i64,
    #[serde(default)]
    pub total_after_sync: usize,
    pub status: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str) -> SourceRepo {
        SourceRepo {
            id: 1,
            name: name.to_string(),
            html_url: format!("https://github.com/octo/{name}"),
            homepage: None,
            size: 42,
            pushed_at: None,
            fork: false,
            archived: false,
        }
    }

    #[test]
    fn empty_homepage_is_not_a_live_url() {
        let mut r = repo("site");
        r.homepage = Some("  ".to_string());
        assert_eq!(r.live_url(), None);
        r.homepage = Some("https://example.com".to_string());
        assert_eq!(r.live_url().as_deref(), Some("https://example.com"));
    }

    #[test]
    fn languages_sorted_by_weight_then_name() {
        let langs = vec![
            ("Go".to_string(), 10),
            ("Rust".to_string(), 900),
            ("Shell".to_string(), 10),
            ("TypeScript".to_string(), 300),
        ];
        let raw = RawProject::from_repo(3, &repo("tool"), langs, String::new());
        assert_eq!(raw.languages, vec!["Rust", "TypeScript", "Go", "Shell"]);
        assert_eq!(raw.index, 3);
        assert_eq!(raw.slug, "tool");
    }

    #[test]
    fn project_json_uses_camel_case_and_omits_pushed_at() {
        let project = Project {
            name: "Tool".to_string(),
            slug: "tool".to_string(),
            short_description: "short".to_string(),
            pushed_at: Some(Utc::now()),
            ..Project::default()
        };
        let json = serde_json::to_value(&project).expect("serialize");
        assert_eq!(json["shortDescription"], "short");
        assert!(json.get("pushedAt").is_none());
        assert!(json.get("pushed_at").is_none());
        assert!(json.get("liveUrl").is_none());
    }

    #[test]
    fn sync_status_display() {
        assert_eq!(SyncStatus::Success.to_string(), "success");
        assert_eq!(SyncStatus::Unchanged.to_string(), "unchanged");
    }
}
