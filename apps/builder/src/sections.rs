//! Section renderers: one per logical resume section.
//!
//! Each renderer turns its slice of the record into a backend-neutral
//! [`SectionBlock`], or `None` when there is nothing to show. "No data" means
//! "no section": a heading is never emitted without content.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::format::{
    format_date_range, format_degree_line, format_display_range, join_inline, CONTACT_SEPARATOR,
};
use crate::models::resume::{PersonalInfo, ResumeRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    Profile,
    Education,
    Experience,
    Skills,
    Projects,
    Awards,
}

impl SectionId {
    pub const ALL: [SectionId; 6] = [
        SectionId::Profile,
        SectionId::Education,
        SectionId::Experience,
        SectionId::Skills,
        SectionId::Projects,
        SectionId::Awards,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionId::Profile => "profile",
            SectionId::Education => "education",
            SectionId::Experience => "experience",
            SectionId::Skills => "skills",
            SectionId::Projects => "projects",
            SectionId::Awards => "awards",
        }
    }

    pub fn default_heading(&self) -> &'static str {
        match self {
            SectionId::Profile => "Profile",
            SectionId::Education => "Education",
            SectionId::Experience => "Experience",
            SectionId::Skills => "Skills",
            SectionId::Projects => "Projects",
            SectionId::Awards => "Awards",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "profile" | "personalinfo" | "basics" => Ok(SectionId::Profile),
            "education" => Ok(SectionId::Education),
            "experience" | "work" => Ok(SectionId::Experience),
            "skills" => Ok(SectionId::Skills),
            "projects" => Ok(SectionId::Projects),
            "awards" => Ok(SectionId::Awards),
            other => Err(format!("unknown section identifier '{other}'")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Section blocks
// ────────────────────────────────────────────────────────────────────────────

/// One contact link in the profile header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactItem {
    pub label: String,
    pub href: String,
}

/// One inline skill line, e.g. `Languages: Rust, Go`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillLine {
    pub label: String,
    pub items: Vec<String>,
}

impl SkillLine {
    pub fn joined(&self) -> String {
        join_inline(&self.items)
    }
}

/// One entry of a repeated section. Field placement per entry type is fixed
/// here so every backend lays out all entries of a type identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryBlock {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub subtitle_link: Option<String>,
    pub location: Option<String>,
    /// Display dates for the preview and PDF tree (`Jan 2020 – Present`).
    pub dates: Option<String>,
    /// Dates as entered (`2020 – 2022`), used by the LaTeX templates.
    pub date_range: Option<String>,
    pub detail: Option<String>,
    /// Shown before `detail` on screen and in the PDF tree.
    pub detail_label: Option<String>,
    pub link: Option<String>,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionBody {
    Profile {
        name: Option<String>,
        contacts: Vec<ContactItem>,
    },
    Entries {
        entries: Vec<EntryBlock>,
    },
    Skills {
        lines: Vec<SkillLine>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionBlock {
    pub id: SectionId,
    pub heading: String,
    pub body: SectionBody,
}

impl SectionBlock {
    pub fn entries(&self) -> &[EntryBlock] {
        match &self.body {
            SectionBody::Entries { entries } => entries,
            _ => &[],
        }
    }
}

impl EntryBlock {
    /// `detail` with its label, as printed by the visual backends.
    pub fn detail_text(&self) -> Option<String> {
        let detail = self.detail.as_ref()?;
        Some(match &self.detail_label {
            Some(label) => format!("{label}: {detail}"),
            None => detail.clone(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Renderers
// ────────────────────────────────────────────────────────────────────────────

/// Dispatches to the renderer for `id`.
pub fn render_section(record: &ResumeRecord, id: SectionId, heading: &str) -> Option<SectionBlock> {
    let body = match id {
        SectionId::Profile => profile_body(&record.personal_info),
        SectionId::Education => education_body(record),
        SectionId::Experience => experience_body(record),
        SectionId::Skills => skills_body(record),
        SectionId::Projects => projects_body(record),
        SectionId::Awards => awards_body(record),
    }?;
    Some(SectionBlock {
        id,
        heading: heading.to_string(),
        body,
    })
}

/// Contact items in fixed order: email, phone, LinkedIn, GitHub.
pub fn contact_items(info: &PersonalInfo) -> Vec<ContactItem> {
    let mut items = Vec::new();
    if let Some(email) = &info.email {
        items.push(ContactItem {
            label: email.clone(),
            href: format!("mailto:{email}"),
        });
    }
    if let Some(phone) = &info.phone {
        items.push(ContactItem {
            label: phone.clone(),
            href: format!("tel:{phone}"),
        });
    }
    if let Some(url) = &info.linkedin_url {
        items.push(ContactItem {
            label: "LinkedIn".to_string(),
            href: url.clone(),
        });
    }
    if let Some(url) = &info.github_url {
        items.push(ContactItem {
            label: "GitHub".to_string(),
            href: url.clone(),
        });
    }
    items
}

/// The contact line as plain text, `" | "`-separated.
pub fn contact_line(contacts: &[ContactItem]) -> String {
    crate::format::format_contact_list(
        contacts.iter().map(|c| Some(c.label.as_str())),
        CONTACT_SEPARATOR,
    )
}

fn profile_body(info: &PersonalInfo) -> Option<SectionBody> {
    if !info.has_any() {
        return None;
    }
    Some(SectionBody::Profile {
        name: info.name.clone(),
        contacts: contact_items(info),
    })
}

fn non_blank(points: &[String]) -> Vec<String> {
    points
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn entries_body(entries: Vec<EntryBlock>) -> Option<SectionBody> {
    if entries.is_empty() {
        None
    } else {
        Some(SectionBody::Entries { entries })
    }
}

fn education_body(record: &ResumeRecord) -> Option<SectionBody> {
    let entries = record
        .education
        .iter()
        .map(|edu| EntryBlock {
            id: edu.id.clone(),
            title: edu.institution.clone().unwrap_or_default(),
            subtitle: non_empty(format_degree_line(edu.degree.as_deref(), edu.area.as_deref())),
            location: edu.location.clone(),
            dates: non_empty(format_display_range(
                edu.start_year.as_deref(),
                edu.end_year.as_deref(),
            )),
            date_range: non_empty(format_date_range(
                edu.start_year.as_deref(),
                edu.end_year.as_deref(),
            )),
            detail: edu.cgpa.clone(),
            ..EntryBlock::default()
        })
        .collect();
    entries_body(entries)
}

fn experience_body(record: &ResumeRecord) -> Option<SectionBody> {
    let entries = record
        .experience
        .iter()
        .map(|exp| EntryBlock {
            id: exp.id.clone(),
            title: exp.position.clone().unwrap_or_default(),
            subtitle: exp.company.clone(),
            subtitle_link: exp.company_url.clone(),
            location: exp.location.clone(),
            dates: non_empty(format_display_range(
                exp.start_year.as_deref(),
                exp.end_year.as_deref(),
            )),
            date_range: non_empty(format_date_range(
                exp.start_year.as_deref(),
                exp.end_year.as_deref(),
            )),
            bullets: non_blank(&exp.points),
            ..EntryBlock::default()
        })
        .collect();
    entries_body(entries)
}

fn projects_body(record: &ResumeRecord) -> Option<SectionBody> {
    let entries = record
        .projects
        .iter()
        .map(|proj| EntryBlock {
            id: proj.id.clone(),
            title: proj.title.clone().unwrap_or_default(),
            link: proj.live_url.clone(),
            detail: proj.technologies.clone(),
            detail_label: Some("Techstack Used".to_string()),
            bullets: non_blank(&proj.points),
            ..EntryBlock::default()
        })
        .collect();
    entries_body(entries)
}

fn awards_body(record: &ResumeRecord) -> Option<SectionBody> {
    let entries = record
        .awards
        .iter()
        .map(|award| EntryBlock {
            id: award.id.clone(),
            title: award.title.clone().unwrap_or_default(),
            subtitle: award.awarder.clone(),
            dates: award.date.clone(),
            date_range: award.date.clone(),
            detail: award.summary.clone(),
            ..EntryBlock::default()
        })
        .collect();
    entries_body(entries)
}

fn skills_body(record: &ResumeRecord) -> Option<SectionBody> {
    let mut lines = Vec::new();
    let languages = non_blank(&record.skills.languages);
    if !languages.is_empty() {
        lines.push(SkillLine {
            label: "Languages".to_string(),
            items: languages,
        });
    }
    let tools = non_blank(&record.skills.tools);
    if !tools.is_empty() {
        lines.push(SkillLine {
            label: "Tools & Technologies".to_string(),
            items: tools,
        });
    }
    if lines.is_empty() {
        None
    } else {
        Some(SectionBody::Skills { lines })
    }
}
