//! Run configuration, read from environment variables.
//!
//! [`Config::from_env`] is the production entry point; [`Config::from_lookup`]
//! takes any key → value function so tests never touch the real environment.

use std::fmt;

use crate::error::ConfigError;

pub const DEFAULT_GITHUB_USERNAME: &str = "alberto-moreno-sa";
pub const DEFAULT_ENVIRONMENT: &str = "master";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_MAX_FEATURED: usize = 5;
pub const DEFAULT_MAX_PROJECTS: usize = 15;

/// Where a run was started from. Recorded in the build log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trigger {
    #[default]
    Local,
    GithubActions,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Local => write!(f, "local"),
            Trigger::GithubActions => write!(f, "github-actions"),
        }
    }
}

/// Everything one sync run needs to know.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub github_username: String,
    pub github_token: Option<String>,

    pub space_id: String,
    pub cma_token: String,
    /// Entry id of the projects section, or its `sectionId`.
    pub entry_id: String,
    pub environment: String,

    pub gemini_api_key: String,
    pub gemini_model: String,

    pub max_featured: usize,
    pub max_projects: usize,
    pub force_update: bool,
    pub trigger: Trigger,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through `lookup`. Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let space_id = require("CONTENTFUL_SPACE_ID")?;
        let cma_token = require("CONTENTFUL_CMA_TOKEN")?;
        let entry_id = require("CONTENTFUL_ENTRY_ID")?;
        let gemini_api_key = require("GEMINI_API_KEY")?;

        let trigger = match get("GITHUB_ACTIONS").as_deref() {
            Some("true") => Trigger::GithubActions,
            _ => Trigger::Local,
        };

        Ok(Self {
            github_username: get("GITHUB_USERNAME")
                .unwrap_or_else(|| DEFAULT_GITHUB_USERNAME.to_string()),
            github_token: get("GITHUB_TOKEN"),
            space_id,
            cma_token,
            entry_id,
            environment: get("CONTENTFUL_ENVIRONMENT")
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            gemini_api_key,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            max_featured: parse_count(get("MAX_FEATURED"), DEFAULT_MAX_FEATURED),
            max_projects: parse_count(get("MAX_PROJECTS"), DEFAULT_MAX_PROJECTS),
            force_update: get("FORCE_UPDATE").as_deref().is_some_and(parse_bool),
            trigger,
        })
    }
}

// Secrets stay out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("github_username", &self.github_username)
            .field("github_token", &self.github_token.as_ref().map(|_| "***"))
            .field("space_id", &self.space_id)
            .field("cma_token", &"***")
            .field("entry_id", &self.entry_id)
            .field("environment", &self.environment)
            .field("gemini_api_key", &"***")
            .field("gemini_model", &self.gemini_model)
            .field("max_featured", &self.max_featured)
            .field("max_projects", &self.max_projects)
            .field("force_update", &self.force_update)
            .field("trigger", &self.trigger)
            .finish()
    }
}

fn parse_count(value: Option<String>, default: usize) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

/// `1 t T TRUE true True` are true; anything else is false.
pub fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "t" | "T" | "TRUE" | "true" | "True")
}
