//! Resume record: the normalized, in-memory representation of one resume.
//!
//! Free-text fields are `Option<String>`: `None` means "not entered".
//! Blank input is normalized to `None` both when deserializing and when a
//! field is updated, so `Some(text)` never holds a blank string.
//!
//! The JSON wire shape matches the stored blob: camelCase keys, every field
//! present, absence written as `""`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Returns a fresh opaque entry id. Only used as a stable render/update key.
pub fn new_entry_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Normalizes raw input into a presence-typed field value.
pub fn normalize_text(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Serde adapter mapping `Option<String>` to a JSON string (`None` ⇔ `""`).
mod text {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw.and_then(super::normalize_text))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Record types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default, with = "text")]
    pub name: Option<String>,
    #[serde(default, with = "text")]
    pub email: Option<String>,
    #[serde(default, with = "text")]
    pub phone: Option<String>,
    #[serde(default, with = "text")]
    pub linkedin_url: Option<String>,
    #[serde(default, with = "text")]
    pub github_url: Option<String>,
}

impl PersonalInfo {
    /// True when the name or any contact field is set.
    pub fn has_any(&self) -> bool {
        self.name.is_some()
            || self.email.is_some()
            || self.phone.is_some()
            || self.linkedin_url.is_some()
            || self.github_url.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default = "new_entry_id")]
    pub id: String,
    #[serde(default, with = "text")]
    pub institution: Option<String>,
    #[serde(default, with = "text")]
    pub degree: Option<String>,
    /// Field of study; rendered as `degree in area`.
    #[serde(default, with = "text")]
    pub area: Option<String>,
    #[serde(default, with = "text")]
    pub location: Option<String>,
    #[serde(default, with = "text")]
    pub cgpa: Option<String>,
    #[serde(default, with = "text")]
    pub start_year: Option<String>,
    #[serde(default, with = "text")]
    pub end_year: Option<String>,
}

impl Education {
    pub fn new() -> Self {
        Self {
            id: new_entry_id(),
            institution: None,
            degree: None,
            area: None,
            location: None,
            cgpa: None,
            start_year: None,
            end_year: None,
        }
    }
}

impl Default for Education {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(default = "new_entry_id")]
    pub id: String,
    #[serde(default, with = "text")]
    pub company: Option<String>,
    #[serde(default, with = "text")]
    pub company_url: Option<String>,
    #[serde(default, with = "text")]
    pub position: Option<String>,
    #[serde(default, with = "text")]
    pub location: Option<String>,
    #[serde(default, with = "text")]
    pub start_year: Option<String>,
    #[serde(default, with = "text")]
    pub end_year: Option<String>,
    /// Bullet-point achievements. Blank strings are placeholders awaiting input.
    #[serde(default)]
    pub points: Vec<String>,
}

impl Experience {
    /// A new entry starts with one blank point, ready for input.
    pub fn new() -> Self {
        Self {
            id: new_entry_id(),
            company: None,
            company_url: None,
            position: None,
            location: None,
            start_year: None,
            end_year: None,
            points: vec![String::new()],
        }
    }
}

impl Default for Experience {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skills {
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
}

impl Skills {
    pub fn has_any(&self) -> bool {
        self.languages
            .iter()
            .chain(self.tools.iter())
            .any(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default = "new_entry_id")]
    pub id: String,
    #[serde(default, with = "text")]
    pub title: Option<String>,
    #[serde(default, with = "text")]
    pub live_url: Option<String>,
    /// Free text, not a structured list.
    #[serde(default, with = "text")]
    pub technologies: Option<String>,
    #[serde(default)]
    pub points: Vec<String>,
}

impl Project {
    pub fn new() -> Self {
        Self {
            id: new_entry_id(),
            title: None,
            live_url: None,
            technologies: None,
            points: vec![String::new()],
        }
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Award {
    #[serde(default = "new_entry_id")]
    pub id: String,
    #[serde(default, with = "text")]
    pub title: Option<String>,
    #[serde(default, with = "text")]
    pub summary: Option<String>,
    #[serde(default, with = "text")]
    pub awarder: Option<String>,
    #[serde(default, with = "text")]
    pub date: Option<String>,
}

impl Award {
    pub fn new() -> Self {
        Self {
            id: new_entry_id(),
            title: None,
            summary: None,
            awarder: None,
            date: None,
        }
    }
}

impl Default for Award {
    fn default() -> Self {
        Self::new()
    }
}

/// Root aggregate. Owned by the editing session and replaced wholesale on
/// every change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub skills: Skills,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub awards: Vec<Award>,
}

/// Filename stem used when the record has no name.
pub const DEFAULT_DOCUMENT_NAME: &str = "Resume";

impl ResumeRecord {
    /// The all-empty record a fresh session starts from.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Stem for exported artifacts: the trimmed name, or `"Resume"`.
    pub fn document_name(&self) -> String {
        self.personal_info
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_DOCUMENT_NAME)
            .to_string()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
