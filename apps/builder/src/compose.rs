//! Document composer: assembles section blocks in an explicit order.
//!
//! The order list drives everything: the same record can be re-sequenced
//! for a different document style without touching any renderer.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::resume::ResumeRecord;
use crate::sections::{render_section, SectionBlock, SectionId};

/// Section order used by the on-screen preview.
pub const DEFAULT_ORDER: [&str; 5] = ["profile", "skills", "experience", "projects", "education"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeOptions {
    /// Raw section identifiers. Unknown identifiers are skipped with a warning.
    pub order: Vec<String>,
    /// Custom heading text per section; missing or blank falls back to the default.
    pub headings: HashMap<SectionId, String>,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER.iter().map(|s| s.to_string()).collect(),
            headings: HashMap::new(),
        }
    }
}

impl ComposeOptions {
    pub fn with_order<I, S>(order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            order: order.into_iter().map(Into::into).collect(),
            headings: HashMap::new(),
        }
    }

    pub fn heading(mut self, id: SectionId, text: impl Into<String>) -> Self {
        self.headings.insert(id, text.into());
        self
    }

    pub fn heading_for(&self, id: SectionId) -> &str {
        self.headings
            .get(&id)
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| id.default_heading())
    }
}

/// The ordered, non-empty sections of one resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedDocument {
    /// Artifact stem: the person's name, or "Resume".
    pub title: String,
    pub sections: Vec<SectionBlock>,
}

impl ComposedDocument {
    pub fn section(&self, id: SectionId) -> Option<&SectionBlock> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Composes `record` following `options.order`.
pub fn compose(record: &ResumeRecord, options: &ComposeOptions) -> ComposedDocument {
    let mut seen = HashSet::new();
    let mut sections = Vec::new();

    for raw in &options.order {
        let id = match raw.parse::<SectionId>() {
            Ok(id) => id,
            Err(reason) => {
                warn!("Skipping section: {reason}");
                continue;
            }
        };
        if !seen.insert(id) {
            warn!("Skipping duplicate section '{id}'");
            continue;
        }
        if let Some(block) = render_section(record, id, options.heading_for(id)) {
            sections.push(block);
        }
    }

    ComposedDocument {
        title: record.document_name(),
        sections,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::resume::{Education, Experience, Project};
    use crate::sections::SectionBody;

    /// Shared fixture: the Jane Doe record used across backend tests.
    pub(crate) fn jane_doe() -> ResumeRecord {
        let mut record = ResumeRecord::empty();
        record.personal_info.name = Some("Jane Doe".to_string());
        record.experience.push(Experience {
            id: "exp-1".to_string(),
            position: Some("Engineer".to_string()),
            company: Some("Acme".to_string()),
            start_year: Some("2020".to_string()),
            end_year: None,
            points: vec!["Built X".to_string()],
            ..Experience::new()
        });
        record
    }

    pub(crate) fn full_record() -> ResumeRecord {
        let mut record = jane_doe();
        record.personal_info.email = Some("jane@example.com".to_string());
        record.personal_info.github_url = Some("https://github.com/jane".to_string());
        record.education.push(Education {
            id: "edu-1".to_string(),
            institution: Some("State University".to_string()),
            degree: Some("BSc Computer Science".to_string()),
            cgpa: Some("3.9".to_string()),
            start_year: Some("2014".to_string()),
            end_year: Some("2018".to_string()),
            ..Education::new()
        });
        record.skills.languages = vec!["Rust".to_string(), "Go".to_string()];
        record.skills.tools = vec!["Docker".to_string()];
        record.projects.push(Project {
            id: "proj-1".to_string(),
            title: Some("Folio".to_string()),
            live_url: Some("https://folio.example.com".to_string()),
            technologies: Some("Rust, WASM".to_string()),
            points: vec!["Rendered 10k resumes".to_string()],
            ..Project::new()
        });
        record
    }

    #[test]
    fn test_jane_doe_scenario() {
        let doc = compose(&jane_doe(), &ComposeOptions::with_order(["profile", "experience"]));
        assert_eq!(doc.sections.len(), 2);

        match &doc.sections[0].body {
            SectionBody::Profile { name, .. } => assert_eq!(name.as_deref(), Some("Jane Doe")),
            other => panic!("unexpected body {other:?}"),
        }

        let exp = &doc.sections[1];
        assert_eq!(exp.id, SectionId::Experience);
        let entry = &exp.entries()[0];
        assert_eq!(entry.title, "Engineer");
        assert_eq!(entry.subtitle.as_deref(), Some("Acme"));
        assert!(entry.dates.as_deref().unwrap().ends_with("2020 – Present"));
        assert_eq!(entry.bullets, vec!["Built X"]);

        assert!(doc.section(SectionId::Education).is_none());
        assert!(doc.section(SectionId::Projects).is_none());
    }

    #[test]
    fn test_empty_education_produces_no_section() {
        let doc = compose(&jane_doe(), &ComposeOptions::default());
        assert!(doc.section(SectionId::Education).is_none());
        assert!(doc.sections.iter().all(|s| s.heading != "Education"));
    }

    #[test]
    fn test_unknown_identifier_is_skipped() {
        let doc = compose(
            &jane_doe(),
            &ComposeOptions::with_order(["hobbies", "experience"]),
        );
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].id, SectionId::Experience);
    }

    #[test]
    fn test_duplicate_identifier_renders_once() {
        let doc = compose(
            &jane_doe(),
            &ComposeOptions::with_order(["experience", "work"]),
        );
        assert_eq!(doc.sections.len(), 1);
    }

    #[test]
    fn test_heading_override_and_blank_fallback() {
        let options = ComposeOptions::with_order(["experience", "profile"])
            .heading(SectionId::Experience, "Work History")
            .heading(SectionId::Profile, "   ");
        let doc = compose(&jane_doe(), &options);
        assert_eq!(doc.sections[0].heading, "Work History");
        assert_eq!(doc.sections[1].heading, "Profile");
    }

    #[test]
    fn test_compose_is_idempotent() {
        let record = full_record();
        let options = ComposeOptions::default();
        assert_eq!(compose(&record, &options), compose(&record, &options));
    }

    #[test]
    fn test_reordering_changes_only_order() {
        let record = full_record();
        let forward = compose(
            &record,
            &ComposeOptions::with_order(["profile", "education", "skills", "projects"]),
        );
        let reversed = compose(
            &record,
            &ComposeOptions::with_order(["projects", "skills", "education", "profile"]),
        );
        let mut back: Vec<_> = reversed.sections.clone();
        back.reverse();
        assert_eq!(forward.sections, back);
    }

    #[test]
    fn test_fixtures_are_stable_across_calls() {
        assert_eq!(jane_doe(), jane_doe());
        assert_eq!(full_record(), full_record());
        assert_eq!(full_record().experience[0].id, "exp-1");
    }

    #[test]
    fn test_title_uses_name() {
        assert_eq!(compose(&jane_doe(), &ComposeOptions::default()).title, "Jane Doe");
        assert_eq!(
            compose(&ResumeRecord::empty(), &ComposeOptions::default()).title,
            "Resume"
        );
    }
}
