//! Contentful Management API client.
//!
//! ## Projects section: fetch-mutate-put
//!
//! 1. `GET` the entry by id (404 → query `siteSection` by `fields.sectionId`).
//! 2. Decode `content`, keep every other field aside.
//! 3. `PUT` all fields back with `X-Contentful-Version` set to the version read
//!    in step 1. A 409 means someone else wrote in between.
//! 4. `PUT …/published` with the version returned by step 3.
//!
//! Steps 3 and 4 are separate calls; a crash between them leaves an
//! unpublished draft.

use std::time::Duration;

use async_trait::async_trait;
use folio_core::Project;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::document::{BuildLogDocument, Entry, EntryCollection, ProjectsDocument};
use crate::error::CmsError;
use crate::ProjectStore;

pub const DEFAULT_BASE_URL: &str = "https://api.contentful.com";
pub const SECTION_CONTENT_TYPE: &str = "siteSection";
pub const BUILD_LOG_CONTENT_TYPE: &str = "buildLog";
const CMA_JSON: &str = "application/vnd.contentful.management.v1+json";
const VERSION_HEADER: &str = "X-Contentful-Version";

pub struct CmaClient {
    http: reqwest::Client,
    base_url: String,
    space_id: String,
    environment: String,
    token: String,
}

impl CmaClient {
    pub fn new(
        space_id: impl Into<String>,
        environment: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, CmsError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            space_id: space_id.into(),
            environment: environment.into(),
            token: token.into(),
        })
    }

    /// Create with custom base URL (for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn entries_url(&self) -> String {
        format!(
            "{}/spaces/{}/environments/{}/entries",
            self.base_url,
            urlencoding::encode(&self.space_id),
            urlencoding::encode(&self.environment)
        )
    }

    fn entry_url(&self, entry_id: &str) -> String {
        format!("{}/{}", self.entries_url(), urlencoding::encode(entry_id))
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header(AUTHORIZATION, format!("Bearer {}", self.token))
    }

    /// `None` on 404.
    async fn get_entry(&self, entry_id: &str) -> Result<Option<Entry>, CmsError> {
        let resp = self
            .authed(self.http.get(self.entry_url(entry_id)))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(expect_success(resp, "get entry").await?.json().await?))
    }

    /// First entry of `content_type` matching the optional field filter.
    async fn query_first(
        &self,
        content_type: &str,
        field: Option<(&str, &str)>,
    ) -> Result<Option<Entry>, CmsError> {
        let mut params = vec![
            ("content_type".to_string(), content_type.to_string()),
            ("limit".to_string(), "1".to_string()),
        ];
        if let Some((name, value)) = field {
            params.push((format!("fields.{name}"), value.to_string()));
        }

        let resp = self
            .authed(self.http.get(self.entries_url()))
            .query(&params)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let collection: EntryCollection = expect_success(resp, "query").await?.json().await?;
        Ok(collection.items.into_iter().next())
    }

    /// Conditional `PUT` of a whole field map. Returns the new version.
    async fn put_fields(
        &self,
        entry_id: &str,
        version: u64,
        fields: serde_json::Map<String, Value>,
        operation: &'static str,
    ) -> Result<u64, CmsError> {
        let resp = self
            .authed(self.http.put(self.entry_url(entry_id)))
            .header(CONTENT_TYPE, CMA_JSON)
            .header(VERSION_HEADER, version.to_string())
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        let entry: Entry = expect_write(resp, operation, entry_id, version)
            .await?
            .json()
            .await?;
        Ok(entry.sys.version)
    }
}

#[async_trait]
impl ProjectStore for CmaClient {
    async fn get_projects(&self, entry_id: &str) -> Result<ProjectsDocument, CmsError> {
        let entry = match self.get_entry(entry_id).await? {
            Some(entry) => entry,
            None => {
                tracing::debug!(entry_id, "entry not found by id, querying by sectionId");
                self.query_first(SECTION_CONTENT_TYPE, Some(("sectionId", entry_id)))
                    .await?
                    .ok_or_else(|| CmsError::NotFound(entry_id.to_string()))?
            }
        };
        Ok(ProjectsDocument::from_entry(entry))
    }

    async fn update_projects(
        &self,
        document: &ProjectsDocument,
        projects: &[Project],
    ) -> Result<u64, CmsError> {
        let fields = document.fields_with(projects)?;
        self.put_fields(&document.entry_id, document.version, fields, "update")
            .await
    }

    async fn publish_entry(&self, entry_id: &str, version: u64) -> Result<(), CmsError> {
        let resp = self
            .authed(self.http.put(format!("{}/published", self.entry_url(entry_id))))
            .header(VERSION_HEADER, version.to_string())
            .send()
            .await?;
        expect_write(resp, "publish", entry_id, version).await?;
        Ok(())
    }

    async fn get_build_log(&self) -> Result<BuildLogDocument, CmsError> {
        match self.query_first(BUILD_LOG_CONTENT_TYPE, None).await? {
            Some(entry) => BuildLogDocument::from_entry(entry),
            None => Ok(BuildLogDocument::default()),
        }
    }

    async fn save_build_log(
        &self,
        document: &BuildLogDocument,
        entries: &[Value],
    ) -> Result<(String, u64), CmsError> {
        let fields = document.fields_with(entries)?;

        if let Some(entry_id) = &document.entry_id {
            let version = self
                .put_fields(entry_id, document.version, fields, "update build log")
                .await?;
            return Ok((entry_id.clone(), version));
        }

        let resp = self
            .authed(self.http.post(self.entries_url()))
            .header(CONTENT_TYPE, CMA_JSON)
            .header("X-Contentful-Content-Type", BUILD_LOG_CONTENT_TYPE)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        let entry: Entry = expect_success(resp, "create build log").await?.json().await?;
        Ok((entry.sys.id, entry.sys.version))
    }
}

async fn expect_success(
    resp: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response, CmsError> {
    if !resp.status().is_success() {
        return Err(CmsError::Api {
            operation,
            status: resp.status().as_u16(),
            body: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

/// Like [`expect_success`], but a 409 becomes [`CmsError::VersionConflict`].
async fn expect_write(
    resp: reqwest::Response,
    operation: &'static str,
    entry_id: &str,
    version: u64,
) -> Result<reqwest::Response, CmsError> {
    if resp.status() == StatusCode::CONFLICT {
        return Err(CmsError::VersionConflict {
            entry_id: entry_id.to_string(),
            version,
        });
    }
    expect_success(resp, operation).await
}
