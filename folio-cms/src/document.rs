//! Typed views of the two CMS entries the sync touches.
//!
//! Contentful stores every field locale-wrapped (`{"en-US": value}`). Each
//! document decodes the one field it owns and keeps every other field in an
//! opaque side-table so a write round-trips them untouched.

use folio_core::Project;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::CmsError;

/// Field of the projects section that holds the project list.
pub const CONTENT_FIELD: &str = "content";
/// Field of the build log entry that holds the log records.
pub const ENTRIES_FIELD: &str = "entries";
/// Locale written on update and preferred on read.
pub const DEFAULT_LOCALE: &str = "en-US";

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    pub sys: Sys,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sys {
    pub id: String,
    /// Required: every conditional write is keyed on it.
    pub version: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EntryCollection {
    #[serde(default)]
    pub items: Vec<Entry>,
}

// ---------------------------------------------------------------------------
// Projects section
// ---------------------------------------------------------------------------

/// State of the `content` field as read from the store.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionContent {
    /// The field does not exist yet; the first write creates it.
    Missing,
    Projects(Vec<Project>),
    /// The field exists but is not a locale-wrapped project list.
    Undecodable(String),
}

/// Point-in-time snapshot of the projects section plus its version.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectsDocument {
    pub entry_id: String,
    pub version: u64,
    pub content: SectionContent,
    /// Every field except `content`, exactly as read.
    pub other_fields: Map<String, Value>,
}

impl ProjectsDocument {
    pub fn from_entry(entry: Entry) -> Self {
        let mut fields = entry.fields;
        let content = match fields.remove(CONTENT_FIELD) {
            None => SectionContent::Missing,
            Some(raw) => decode_projects(&raw),
        };
        Self {
            entry_id: entry.sys.id,
            version: entry.sys.version,
            content,
            other_fields: fields,
        }
    }

    /// Stored projects; empty when the content is missing or undecodable.
    pub fn projects(&self) -> &[Project] {
        match &self.content {
            SectionContent::Projects(projects) => projects,
            SectionContent::Missing | SectionContent::Undecodable(_) => &[],
        }
    }

    /// The field map to send back with `projects` as the new content.
    pub fn fields_with(&self, projects: &[Project]) -> Result<Map<String, Value>, CmsError> {
        let mut fields = self.other_fields.clone();
        fields.insert(CONTENT_FIELD.to_string(), localized(projects, CONTENT_FIELD)?);
        Ok(fields)
    }
}

fn decode_projects(raw: &Value) -> SectionContent {
    let Some(value) = unwrap_locale(raw) else {
        return SectionContent::Undecodable("content field is not locale-wrapped".to_string());
    };
    match serde_json::from_value::<Vec<Project>>(value.clone()) {
        Ok(projects) => SectionContent::Projects(projects),
        Err(err) => SectionContent::Undecodable(format!("unmarshal projects: {err}")),
    }
}

// ---------------------------------------------------------------------------
// Build log
// ---------------------------------------------------------------------------

/// Snapshot of the shared build log entry. `entry_id` is `None` when the
/// entry does not exist yet.
///
/// Records are kept as raw JSON: other services write their own shapes and
/// those must survive a rewrite byte for byte.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuildLogDocument {
    pub entry_id: Option<String>,
    pub version: u64,
    pub entries: Vec<Value>,
    pub other_fields: Map<String, Value>,
}

impl BuildLogDocument {
    pub fn from_entry(entry: Entry) -> Result<Self, CmsError> {
        let mut fields = entry.fields;
        let entries = match fields.remove(ENTRIES_FIELD) {
            None => Vec::new(),
            Some(raw) => {
                let value = unwrap_locale(&raw).ok_or_else(|| CmsError::Decode {
                    field: ENTRIES_FIELD,
                    reason: "not locale-wrapped".to_string(),
                })?;
                serde_json::from_value(value.clone()).map_err(|err| CmsError::Decode {
                    field: ENTRIES_FIELD,
                    reason: err.to_string(),
                })?
            }
        };
        Ok(Self {
            entry_id: Some(entry.sys.id),
            version: entry.sys.version,
            entries,
            other_fields: fields,
        })
    }

    pub fn fields_with(&self, entries: &[Value]) -> Result<Map<String, Value>, CmsError> {
        let mut fields = self.other_fields.clone();
        fields.insert(ENTRIES_FIELD.to_string(), localized(entries, ENTRIES_FIELD)?);
        Ok(fields)
    }
}

// ---------------------------------------------------------------------------
// Locale helpers
// ---------------------------------------------------------------------------

/// Pick the default locale's value, else the first locale in document order.
fn unwrap_locale(raw: &Value) -> Option<&Value> {
    let locales = raw.as_object()?;
    locales
        .get(DEFAULT_LOCALE)
        .or_else(|| locales.values().next())
}

fn localized<T: serde::Serialize + ?Sized>(
    value: &T,
    field: &'static str,
) -> Result<Value, CmsError> {
    let inner = serde_json::to_value(value).map_err(|err| CmsError::Decode {
        field,
        reason: err.to_string(),
    })?;
    let mut wrapper = Map::new();
    wrapper.insert(DEFAULT_LOCALE.to_string(), inner);
    Ok(Value::Object(wrapper))
}
