//! Prompt construction and response cleanup.

use folio_core::types::null_as_default;
use folio_core::RawProject;
use serde::{Deserialize, Serialize};

/// README text sent per project is cut to this many bytes.
pub const MAX_README_BYTES: usize = 1500;

/// Allowed values for the generated `category`.
pub const CATEGORIES: [&str; 7] = [
    "Web",
    "Backend",
    "Full-Stack",
    "Libraries",
    "DevOps",
    "Game Dev",
    "Mobile",
];

pub const SYSTEM_PROMPT: &str = r#"You write project copy for a software engineer's portfolio website.
The user message is a JSON array of GitHub repositories, each with "name", "languages" and "readme".
Produce exactly one JSON object per repository, in the same order as the input, with these keys:

- "name": a readable title derived from the repository name ("financial-dashboard" -> "Financial Dashboard", "go-service-kit" -> "Go Service Kit"; keep domain-style names such as "example.com" unchanged).
- "shortDescription": one short phrase, at most 200 characters.
- "description": one sentence, at most 120 characters, saying what the project does.
- "longDescription": two or three sentences covering purpose, notable technical decisions and impact.
- "technologies": specific frameworks, libraries, databases and tools inferred from the languages and the README. Prefer "React" over "JavaScript" when both apply.
- "highlights": three to five technical achievements, each under 60 characters.
- "category": exactly one of ["Web", "Backend", "Full-Stack", "Libraries", "DevOps", "Game Dev", "Mobile"].
- "gradient": a Tailwind gradient such as "from-emerald-500 to-teal-600". Match the domain: finance emerald/teal, infrastructure cyan/blue, frontend purple/indigo, data amber/orange, games red/rose, libraries and tools slate/gray.

Reply with the JSON array only. No markdown, no commentary."#;

#[derive(Serialize)]
struct BatchItem<'a> {
    name: &'a str,
    languages: String,
    readme: &'a str,
}

/// Serialize the whole batch into the user payload.
pub fn build_batch_prompt(projects: &[RawProject]) -> Result<String, serde_json::Error> {
    let items: Vec<BatchItem<'_>> = projects
        .iter()
        .map(|p| BatchItem {
            name: &p.name,
            languages: p.languages.join(", "),
            readme: truncate_bytes(&p.readme, MAX_README_BYTES),
        })
        .collect();
    serde_json::to_string(&items)
}

/// Cut `text` to at most `max` bytes, backing off to a character boundary.
pub fn truncate_bytes(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Remove an optional ```` ```json ```` / ```` ``` ```` opening fence and a
/// trailing ```` ``` ````.
pub fn strip_fences(response: &str) -> &str {
    let mut s = response.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// One object of the model's JSON array. Missing keys and `null` values
/// decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratedProject {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub short_description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub long_description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub technologies: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub highlights: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub gradient: String,
}
