//! GitHub REST client.
//!
//! Three endpoints are used: the owner's repository listing (paged), the
//! per-repository language breakdown, and the raw README.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use folio_core::SourceRepo;
use reqwest::header::{ACCEPT, AUTHORIZATION};

use crate::error::GithubError;
use crate::RepoSource;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";
const PER_PAGE: usize = 100;

pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GithubClient {
    /// Create a client. A token is optional and only raises rate limits.
    pub fn new(token: Option<String>) -> Result<Self, GithubError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            token,
        })
    }

    /// Point the client at another host (tests, GitHub Enterprise).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .http
            .get(format!("{}{path}", self.base_url))
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        req
    }
}

#[async_trait]
impl RepoSource for GithubClient {
    async fn list_repos(&self, owner: &str) -> Result<Vec<SourceRepo>, GithubError> {
        let path = format!("/users/{}/repos", urlencoding::encode(owner));
        let mut repos = Vec::new();
        let mut page = 1usize;

        loop {
            let resp = self
                .get(&path)
                .header(ACCEPT, "application/vnd.github+json")
                .query(&[
                    ("type", "owner".to_string()),
                    ("sort", "pushed".to_string()),
                    ("per_page", PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ])
                .send()
                .await?;
            let batch: Vec<SourceRepo> = check_response(resp).await?.json().await?;
            let len = batch.len();
            tracing::debug!(owner, page, count = len, "listed repository page");
            repos.extend(batch);

            if len < PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(repos)
    }

    async fn repo_languages(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<HashMap<String, u64>, GithubError> {
        let path = format!(
            "/repos/{}/{}/languages",
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        );
        let resp = self
            .get(&path)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?;
        Ok(check_response(resp).await?.json().await?)
    }

    async fn repo_readme(&self, owner: &str, repo: &str) -> Result<String, GithubError> {
        let path = format!(
            "/repos/{}/{}/readme",
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        );
        let resp = self
            .get(&path)
            .header(ACCEPT, "application/vnd.github.raw+json")
            .send()
            .await?;
        Ok(check_response(resp).await?.text().await?)
    }
}

/// Map a non-success status to [`GithubError::Api`] carrying the body.
async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, GithubError> {
    if !resp.status().is_success() {
        return Err(GithubError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}
