//! In-memory fakes for the three service seams.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use folio_cms::{BuildLogDocument, CmsError, Entry, ProjectStore, ProjectsDocument, Sys};
use folio_core::{Config, Project, SourceRepo};
use folio_enricher::{Enricher, GenerateError, TextGenerator};
use folio_github::{GithubError, RepoSource};
use serde_json::{json, Map, Value};

pub const OWNER: &str = "octo";

pub fn config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("GITHUB_USERNAME", OWNER),
        ("CONTENTFUL_SPACE_ID", "space"),
        ("CONTENTFUL_CMA_TOKEN", "token"),
        ("CONTENTFUL_ENTRY_ID", "projects"),
        ("GEMINI_API_KEY", "key"),
    ]);
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).expect("config")
}

pub fn pushed(day: u32) -> Option<DateTime<Utc>> {
    Some(Utc.with_ymd_and_hms(2026, 5, day, 12, 0, 0).unwrap())
}

pub fn repo(name: &str, day: u32) -> SourceRepo {
    SourceRepo {
        id: u64::from(day),
        name: name.to_string(),
        html_url: format!("https://github.com/{OWNER}/{name}"),
        pushed_at: pushed(day),
        ..SourceRepo::default()
    }
}

// ---------------------------------------------------------------------------
// RepoSource
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeSource {
    pub repos: Vec<SourceRepo>,
    /// Repos whose languages and README calls fail.
    pub failing: HashSet<String>,
    /// Per-repo delay before the languages call returns.
    pub delays: HashMap<String, Duration>,
    /// Repos whose languages call never returns.
    pub hanging: HashSet<String>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub list_calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(repos: Vec<SourceRepo>) -> Self {
        Self {
            repos,
            ..Self::default()
        }
    }
}

#[async_trait]
impl RepoSource for FakeSource {
    async fn list_repos(&self, _owner: &str) -> Result<Vec<SourceRepo>, GithubError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.repos.clone())
    }

    async fn repo_languages(
        &self,
        _owner: &str,
        repo: &str,
    ) -> Result<HashMap<String, u64>, GithubError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if self.hanging.contains(repo) {
            std::future::pending::<()>().await;
        }
        if let Some(delay) = self.delays.get(repo) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(repo) {
            return Err(GithubError::Api {
                status: 500,
                message: "boom".to_string(),
            });
        }
        Ok(HashMap::from([
            ("Rust".to_string(), 9000),
            ("Shell".to_string(), 100),
        ]))
    }

    async fn repo_readme(&self, _owner: &str, repo: &str) -> Result<String, GithubError> {
        if self.failing.contains(repo) {
            return Err(GithubError::Api {
                status: 404,
                message: "Not Found".to_string(),
            });
        }
        Ok(format!("# {repo}\nA tool."))
    }
}

// ---------------------------------------------------------------------------
// TextGenerator
// ---------------------------------------------------------------------------

/// Answers with one deterministic object per input project.
pub struct EchoGenerator;

#[async_trait]
impl TextGenerator for EchoGenerator {
    async fn generate(&self, _system: &str, user: &str) -> Result<String, GenerateError> {
        let items: Vec<Value> = serde_json::from_str(user).map_err(|_| GenerateError::EmptyResponse)?;
        let out: Vec<Value> = items
            .iter()
            .map(|item| {
                let name = item["name"].as_str().unwrap_or_default();
                json!({
                    "name": name,
                    "shortDescription": format!("{name} in brief"),
                    "description": format!("{name} does things"),
                    "longDescription": format!("{name} does many things"),
                    "technologies": item["languages"].as_str().unwrap_or_default().split(", ").collect::<Vec<_>>(),
                    "highlights": ["fast"],
                    "category": "Backend",
                    "gradient": "from-blue-500 to-purple-600"
                })
            })
            .collect();
        Ok(format!("```json\n{}\n```", Value::Array(out)))
    }
}

pub fn echo_enricher() -> Enricher {
    Enricher::new(Arc::new(EchoGenerator))
}

// ---------------------------------------------------------------------------
// ProjectStore
// ---------------------------------------------------------------------------

pub const BUILD_LOG_ID: &str = "build-log";

#[derive(Debug, Default)]
pub struct StoreState {
    pub entry_id: String,
    pub version: u64,
    pub fields: Map<String, Value>,
    pub published_version: Option<u64>,
    pub gets: usize,
    pub updates: usize,
    pub publishes: usize,
    /// `(version, entries)` once the build log exists.
    pub build_log: Option<(u64, Vec<Value>)>,
    pub build_log_published: Option<u64>,
    pub fail_build_log: bool,
    /// Simulate another writer landing between our read and our write.
    pub interfere_with: Option<Vec<Project>>,
}

pub struct FakeStore {
    pub state: Mutex<StoreState>,
}

impl FakeStore {
    /// A section entry whose id differs from the configured one, so the
    /// pipeline must use the resolved id.
    pub fn new() -> Arc<Self> {
        let mut fields = Map::new();
        fields.insert("sectionId".to_string(), json!({ "en-US": "projects" }));
        fields.insert("title".to_string(), json!({ "en-US": "Projects" }));
        Arc::new(Self {
            state: Mutex::new(StoreState {
                entry_id: "real-entry".to_string(),
                version: 1,
                fields,
                ..StoreState::default()
            }),
        })
    }

    pub fn with_content(self: Arc<Self>, content: Value) -> Arc<Self> {
        self.state
            .lock()
            .unwrap()
            .fields
            .insert("content".to_string(), content);
        self
    }

    pub fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap()
    }

    /// The stored `content` field exactly as it would go over the wire.
    pub fn content_bytes(&self) -> String {
        serde_json::to_string(&self.lock().fields["content"]).unwrap()
    }

    pub fn stored_projects(&self) -> Vec<Project> {
        serde_json::from_value(self.lock().fields["content"]["en-US"].clone()).unwrap()
    }
}

#[async_trait]
impl ProjectStore for FakeStore {
    async fn get_projects(&self, _entry_id: &str) -> Result<ProjectsDocument, CmsError> {
        let mut state = self.lock();
        state.gets += 1;
        let document = ProjectsDocument::from_entry(Entry {
            sys: Sys {
                id: state.entry_id.clone(),
                version: state.version,
            },
            fields: state.fields.clone(),
        });
        if let Some(projects) = state.interfere_with.take() {
            state
                .fields
                .insert("content".to_string(), json!({ "en-US": projects }));
            state.version += 1;
        }
        Ok(document)
    }

    async fn update_projects(
        &self,
        document: &ProjectsDocument,
        projects: &[Project],
    ) -> Result<u64, CmsError> {
        let mut state = self.lock();
        if document.entry_id != state.entry_id || document.version != state.version {
            return Err(CmsError::VersionConflict {
                entry_id: document.entry_id.clone(),
                version: document.version,
            });
        }
        state.fields = document.fields_with(projects)?;
        state.version += 1;
        state.updates += 1;
        Ok(state.version)
    }

    async fn publish_entry(&self, entry_id: &str, version: u64) -> Result<(), CmsError> {
        let mut state = self.lock();
        let current = if entry_id == BUILD_LOG_ID {
            state.build_log.as_ref().map(|(v, _)| *v)
        } else if entry_id == state.entry_id {
            Some(state.version)
        } else {
            None
        };
        if current != Some(version) {
            return Err(CmsError::VersionConflict {
                entry_id: entry_id.to_string(),
                version,
            });
        }
        if entry_id == BUILD_LOG_ID {
            state.build_log_published = Some(version);
        } else {
            state.published_version = Some(version);
            state.publishes += 1;
        }
        Ok(())
    }

    async fn get_build_log(&self) -> Result<BuildLogDocument, CmsError> {
        let state = self.lock();
        if state.fail_build_log {
            return Err(CmsError::Api {
                operation: "query",
                status: 500,
                body: "unavailable".to_string(),
            });
        }
        Ok(match &state.build_log {
            None => BuildLogDocument::default(),
            Some((version, entries)) => BuildLogDocument {
                entry_id: Some(BUILD_LOG_ID.to_string()),
                version: *version,
                entries: entries.clone(),
                other_fields: Map::new(),
            },
        })
    }

    async fn save_build_log(
        &self,
        document: &BuildLogDocument,
        entries: &[Value],
    ) -> Result<(String, u64), CmsError> {
        let mut state = self.lock();
        let version = match (&document.entry_id, &state.build_log) {
            (None, _) => 1,
            (Some(_), Some((current, _))) if *current == document.version => current + 1,
            (Some(id), _) => {
                return Err(CmsError::VersionConflict {
                    entry_id: id.clone(),
                    version: document.version,
                })
            }
        };
        state.build_log = Some((version, entries.to_vec()));
        Ok((BUILD_LOG_ID.to_string(), version))
    }
}
