//! Record lifecycle: add, update and remove operations.
//!
//! `ResumeRecord::apply` never mutates the receiver: it returns a new record
//! with the edit applied (copy-on-write). An out-of-range index is rejected
//! and the caller keeps its previous record.

use crate::errors::{BuilderError, Result};
use crate::models::resume::{
    normalize_text, Award, Education, Experience, Project, ResumeRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Education,
    Experience,
    Project,
    Award,
}

/// Entry types that own a `points` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsOwner {
    Experience,
    Project,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillKind {
    Languages,
    Tools,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalField {
    Name,
    Email,
    Phone,
    LinkedinUrl,
    GithubUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EducationField {
    Institution,
    Degree,
    Area,
    Location,
    Cgpa,
    StartYear,
    EndYear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceField {
    Company,
    CompanyUrl,
    Position,
    Location,
    StartYear,
    EndYear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectField {
    Title,
    LiveUrl,
    Technologies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwardField {
    Title,
    Summary,
    Awarder,
    Date,
}

/// One field-level or list-level change to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordEdit {
    SetPersonal { field: PersonalField, value: String },
    AddEntry(EntryKind),
    RemoveEntry { kind: EntryKind, index: usize },
    SetEducation { index: usize, field: EducationField, value: String },
    SetExperience { index: usize, field: ExperienceField, value: String },
    SetProject { index: usize, field: ProjectField, value: String },
    SetAward { index: usize, field: AwardField, value: String },
    AddPoint { owner: PointsOwner, index: usize },
    SetPoint { owner: PointsOwner, index: usize, point: usize, value: String },
    RemovePoint { owner: PointsOwner, index: usize, point: usize },
    AddSkill(SkillKind),
    SetSkill { kind: SkillKind, index: usize, value: String },
    RemoveSkill { kind: SkillKind, index: usize },
}

fn slot<'a, T>(items: &'a mut [T], index: usize, what: &str) -> Result<&'a mut T> {
    let len = items.len();
    items.get_mut(index).ok_or_else(|| {
        BuilderError::InvalidEdit(format!("{what} index {index} out of range (len {len})"))
    })
}

fn remove_at<T>(items: &mut Vec<T>, index: usize, what: &str) -> Result<()> {
    if index >= items.len() {
        return Err(BuilderError::InvalidEdit(format!(
            "{what} index {index} out of range (len {})",
            items.len()
        )));
    }
    items.remove(index);
    Ok(())
}

impl ResumeRecord {
    /// Returns a new record with `edit` applied.
    pub fn apply(&self, edit: RecordEdit) -> Result<ResumeRecord> {
        let mut next = self.clone();
        next.apply_in_place(edit)?;
        Ok(next)
    }

    fn apply_in_place(&mut self, edit: RecordEdit) -> Result<()> {
        match edit {
            RecordEdit::SetPersonal { field, value } => {
                let info = &mut self.personal_info;
                let target = match field {
                    PersonalField::Name => &mut info.name,
                    PersonalField::Email => &mut info.email,
                    PersonalField::Phone => &mut info.phone,
                    PersonalField::LinkedinUrl => &mut info.linkedin_url,
                    PersonalField::GithubUrl => &mut info.github_url,
                };
                *target = normalize_text(value);
            }
            RecordEdit::AddEntry(kind) => match kind {
                EntryKind::Education => self.education.push(Education::new()),
                EntryKind::Experience => self.experience.push(Experience::new()),
                EntryKind::Project => self.projects.push(Project::new()),
                EntryKind::Award => self.awards.push(Award::new()),
            },
            RecordEdit::RemoveEntry { kind, index } => match kind {
                EntryKind::Education => remove_at(&mut self.education, index, "education")?,
                EntryKind::Experience => remove_at(&mut self.experience, index, "experience")?,
                EntryKind::Project => remove_at(&mut self.projects, index, "project")?,
                EntryKind::Award => remove_at(&mut self.awards, index, "award")?,
            },
            RecordEdit::SetEducation { index, field, value } => {
                let edu = slot(&mut self.education, index, "education")?;
                let target = match field {
                    EducationField::Institution => &mut edu.institution,
                    EducationField::Degree => &mut edu.degree,
                    EducationField::Area => &mut edu.area,
                    EducationField::Location => &mut edu.location,
                    EducationField::Cgpa => &mut edu.cgpa,
                    EducationField::StartYear => &mut edu.start_year,
                    EducationField::EndYear => &mut edu.end_year,
                };
                *target = normalize_text(value);
            }
            RecordEdit::SetExperience { index, field, value } => {
                let exp = slot(&mut self.experience, index, "experience")?;
                let target = match field {
                    ExperienceField::Company => &mut exp.company,
                    ExperienceField::CompanyUrl => &mut exp.company_url,
                    ExperienceField::Position => &mut exp.position,
                    ExperienceField::Location => &mut exp.location,
                    ExperienceField::StartYear => &mut exp.start_year,
                    ExperienceField::EndYear => &mut exp.end_year,
                };
                *target = normalize_text(value);
            }
            RecordEdit::SetProject { index, field, value } => {
                let proj = slot(&mut self.projects, index, "project")?;
                let target = match field {
                    ProjectField::Title => &mut proj.title,
                    ProjectField::LiveUrl => &mut proj.live_url,
                    ProjectField::Technologies => &mut proj.technologies,
                };
                *target = normalize_text(value);
            }
            RecordEdit::SetAward { index, field, value } => {
                let award = slot(&mut self.awards, index, "award")?;
                let target = match field {
                    AwardField::Title => &mut award.title,
                    AwardField::Summary => &mut award.summary,
                    AwardField::Awarder => &mut award.awarder,
                    AwardField::Date => &mut award.date,
                };
                *target = normalize_text(value);
            }
            RecordEdit::AddPoint { owner, index } => {
                self.points_mut(owner, index)?.push(String::new());
            }
            RecordEdit::SetPoint {
                owner,
                index,
                point,
                value,
            } => {
                *slot(self.points_mut(owner, index)?, point, "point")? = value;
            }
            RecordEdit::RemovePoint {
                owner,
                index,
                point,
            } => {
                remove_at(self.points_mut(owner, index)?, point, "point")?;
            }
            RecordEdit::AddSkill(kind) => self.skills_mut(kind).push(String::new()),
            RecordEdit::SetSkill { kind, index, value } => {
                *slot(self.skills_mut(kind), index, "skill")? = value;
            }
            RecordEdit::RemoveSkill { kind, index } => {
                remove_at(self.skills_mut(kind), index, "skill")?;
            }
        }
        Ok(())
    }

    fn points_mut(&mut self, owner: PointsOwner, index: usize) -> Result<&mut Vec<String>> {
        Ok(match owner {
            PointsOwner::Experience => &mut slot(&mut self.experience, index, "experience")?.points,
            PointsOwner::Project => &mut slot(&mut self.projects, index, "project")?.points,
        })
    }

    fn skills_mut(&mut self, kind: SkillKind) -> &mut Vec<String> {
        match kind {
            SkillKind::Languages => &mut self.skills.languages,
            SkillKind::Tools => &mut self.skills.tools,
        }
    }
}
