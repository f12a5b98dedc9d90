use serde::{Deserialize, Serialize};

use crate::models::resume::{PersonalInfo, ResumeRecord};
use crate::sections::SectionId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Complete,
    /// Something was entered but the required field is still empty.
    Incomplete,
    Missing,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectionCompletion {
    pub section: SectionId,
    pub entry_count: usize,
    pub status: SectionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionReport {
    pub sections: Vec<SectionCompletion>,
    pub completed: usize,
    pub missing_sections: Vec<String>,
}

impl CompletionReport {
    pub fn is_complete(&self, section: SectionId) -> bool {
        self.sections
            .iter()
            .any(|s| s.section == section && s.status == SectionStatus::Complete)
    }
}

fn personal_field_count(info: &PersonalInfo) -> usize {
    [
        &info.name,
        &info.email,
        &info.phone,
        &info.linkedin_url,
        &info.github_url,
    ]
    .iter()
    .filter(|f| f.is_some())
    .count()
}

fn status(entry_count: usize, complete: bool) -> SectionStatus {
    match (entry_count, complete) {
        (_, true) => SectionStatus::Complete,
        (0, false) => SectionStatus::Missing,
        _ => SectionStatus::Incomplete,
    }
}

/// Per-section completion indicators for the editing form. Presence checks
/// only: personal info needs a name and an email, each list section needs
/// at least one entry with its key field set.
pub fn compute_completion_report(record: &ResumeRecord) -> CompletionReport {
    let info = &record.personal_info;
    let skill_count = record
        .skills
        .languages
        .iter()
        .chain(&record.skills.tools)
        .filter(|s| !s.trim().is_empty())
        .count();

    let checks = [
        (
            SectionId::Profile,
            personal_field_count(info),
            info.name.is_some() && info.email.is_some(),
        ),
        (
            SectionId::Education,
            record.education.len(),
            record.education.iter().any(|e| e.degree.is_some()),
        ),
        (
            SectionId::Experience,
            record.experience.len(),
            record.experience.iter().any(|e| e.position.is_some()),
        ),
        (SectionId::Skills, skill_count, skill_count > 0),
        (
            SectionId::Projects,
            record.projects.len(),
            record.projects.iter().any(|p| p.title.is_some()),
        ),
    ];

    let mut sections = Vec::with_capacity(checks.len());
    let mut missing_sections = Vec::new();
    for (section, entry_count, complete) in checks {
        let status = status(entry_count, complete);
        if status != SectionStatus::Complete {
            missing_sections.push(section.to_string());
        }
        sections.push(SectionCompletion {
            section,
            entry_count,
            status,
        });
    }

    CompletionReport {
        completed: sections.len() - missing_sections.len(),
        sections,
        missing_sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::tests::{full_record, jane_doe};
    use crate::models::resume::Education;

    #[test]
    fn test_empty_record_is_all_missing() {
        let report = compute_completion_report(&ResumeRecord::empty());
        assert_eq!(report.completed, 0);
        assert!(report.sections.iter().all(|s| s.status == SectionStatus::Missing));
        assert_eq!(report.missing_sections.len(), 5);
    }

    #[test]
    fn test_personal_info_needs_name_and_email() {
        let report = compute_completion_report(&jane_doe());
        let profile = &report.sections[0];
        assert_eq!(profile.section, SectionId::Profile);
        assert_eq!(profile.status, SectionStatus::Incomplete);
        assert!(report.is_complete(SectionId::Experience));

        let report = compute_completion_report(&full_record());
        assert!(report.is_complete(SectionId::Profile));
    }

    #[test]
    fn test_education_without_degree_is_incomplete() {
        let mut record = ResumeRecord::empty();
        record.education.push(Education {
            institution: Some("State University".to_string()),
            ..Education::new()
        });
        let report = compute_completion_report(&record);
        let education = report
            .sections
            .iter()
            .find(|s| s.section == SectionId::Education)
            .unwrap();
        assert_eq!(education.status, SectionStatus::Incomplete);
        assert_eq!(education.entry_count, 1);
    }

    #[test]
    fn test_blank_skills_do_not_count() {
        let mut record = ResumeRecord::empty();
        record.skills.languages = vec!["  ".to_string()];
        assert!(!compute_completion_report(&record).is_complete(SectionId::Skills));
    }

    #[test]
    fn test_full_record_is_complete() {
        let report = compute_completion_report(&full_record());
        assert_eq!(report.completed, 5);
        assert!(report.missing_sections.is_empty());
    }
}
