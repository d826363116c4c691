//! The in-memory résumé: one record of independently addressable sections.
//!
//! Every section sits behind an `Arc`. Replacing one section clones the
//! record (a handful of refcount bumps) and leaves every other section
//! pointer-equal to the previous model, so downstream consumers detect
//! change with `Arc::ptr_eq` instead of deep comparison.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::preview::templates::TemplateId;

fn new_entry_id() -> Uuid {
    Uuid::new_v4()
}

// ────────────────────────────────────────────────────────────────────────────
// Section entries
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PersonalInfo {
    #[serde(alias = "fullName")]
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub portfolio: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EducationEntry {
    #[serde(default = "new_entry_id")]
    pub id: Uuid,
    pub institution: String,
    pub degree: String,
    #[serde(default, alias = "fieldOfStudy")]
    pub field_of_study: String,
    #[serde(default, alias = "startDate")]
    pub start_date: String,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proficiency {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

impl Proficiency {
    pub fn label(&self) -> &'static str {
        match self {
            Proficiency::Beginner => "Beginner",
            Proficiency::Intermediate => "Intermediate",
            Proficiency::Advanced => "Advanced",
            Proficiency::Expert => "Expert",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkillEntry {
    #[serde(default = "new_entry_id")]
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    #[serde(default)]
    pub level: Proficiency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectEntry {
    #[serde(default = "new_entry_id")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "techStack")]
    pub tech_stack: Vec<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CertificationEntry {
    #[serde(default = "new_entry_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(alias = "issueDate")]
    pub issue_date: Option<String>,
    #[serde(alias = "credentialUrl")]
    pub credential_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HackathonEntry {
    #[serde(default = "new_entry_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub role: String,
    pub date: Option<String>,
    pub outcome: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InternshipEntry {
    #[serde(default = "new_entry_id")]
    pub id: Uuid,
    pub company: String,
    pub role: String,
    #[serde(default, alias = "startDate")]
    pub start_date: String,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AchievementEntry {
    #[serde(default = "new_entry_id")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fluency {
    Elementary,
    #[default]
    Conversational,
    Professional,
    Native,
}

impl Fluency {
    pub fn label(&self) -> &'static str {
        match self {
            Fluency::Elementary => "Elementary",
            Fluency::Conversational => "Conversational",
            Fluency::Professional => "Professional",
            Fluency::Native => "Native",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LanguageEntry {
    #[serde(default = "new_entry_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub fluency: Fluency,
}

/// Role-specific learning roadmap attached to the chosen job role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Roadmap {
    pub role: String,
    #[serde(default)]
    pub milestones: Vec<String>,
}

/// Entries of a list section: each carries an id that is stable for its lifetime.
pub trait SectionEntry {
    fn id(&self) -> Uuid;
}

macro_rules! impl_section_entry {
    ($($ty:ty),+ $(,)?) => {
        $(impl SectionEntry for $ty {
            fn id(&self) -> Uuid {
                self.id
            }
        })+
    };
}

impl_section_entry!(
    EducationEntry,
    SkillEntry,
    ProjectEntry,
    CertificationEntry,
    HackathonEntry,
    InternshipEntry,
    AchievementEntry,
    LanguageEntry,
);

/// Returns the first id that appears more than once in `entries`.
pub fn find_duplicate_id<E: SectionEntry>(entries: &[E]) -> Option<Uuid> {
    let mut seen = std::collections::HashSet::with_capacity(entries.len());
    entries.iter().map(SectionEntry::id).find(|id| !seen.insert(*id))
}

// ────────────────────────────────────────────────────────────────────────────
// Section names
// ────────────────────────────────────────────────────────────────────────────

/// Closed set of addressable sections. Anything else is rejected at the
/// dispatcher boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    PersonalInfo,
    Education,
    Skills,
    Projects,
    Certifications,
    Hackathons,
    Internships,
    Achievements,
    Languages,
    SelectedJobRole,
    SelectedTemplate,
    Roadmap,
}

impl Section {
    pub const ALL: [Section; 12] = [
        Section::PersonalInfo,
        Section::Education,
        Section::Skills,
        Section::Projects,
        Section::Certifications,
        Section::Hackathons,
        Section::Internships,
        Section::Achievements,
        Section::Languages,
        Section::SelectedJobRole,
        Section::SelectedTemplate,
        Section::Roadmap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::PersonalInfo => "personalInfo",
            Section::Education => "education",
            Section::Skills => "skills",
            Section::Projects => "projects",
            Section::Certifications => "certifications",
            Section::Hackathons => "hackathons",
            Section::Internships => "internships",
            Section::Achievements => "achievements",
            Section::Languages => "languages",
            Section::SelectedJobRole => "selectedJobRole",
            Section::SelectedTemplate => "selectedTemplate",
            Section::Roadmap => "roadmap",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown section '{0}'")]
pub struct UnknownSection(pub String);

impl FromStr for Section {
    type Err = UnknownSection;

    /// Accepts the camelCase wire name and its snake_case spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s.chars().filter(|c| *c != '_').collect();
        Section::ALL
            .into_iter()
            .find(|section| section.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentModel {
    pub personal_info: Arc<PersonalInfo>,
    pub education: Arc<Vec<EducationEntry>>,
    pub skills: Arc<Vec<SkillEntry>>,
    pub projects: Arc<Vec<ProjectEntry>>,
    pub certifications: Arc<Vec<CertificationEntry>>,
    pub hackathons: Arc<Vec<HackathonEntry>>,
    pub internships: Arc<Vec<InternshipEntry>>,
    pub achievements: Arc<Vec<AchievementEntry>>,
    pub languages: Arc<Vec<LanguageEntry>>,
    pub selected_job_role: Option<String>,
    pub selected_template: TemplateId,
    pub is_premium: bool,
    pub roadmap: Option<Arc<Roadmap>>,
}

impl DocumentModel {
    /// Number of entries in a list section; `None` for scalar sections.
    pub fn entry_count(&self, section: Section) -> Option<usize> {
        let count = match section {
            Section::Education => self.education.len(),
            Section::Skills => self.skills.len(),
            Section::Projects => self.projects.len(),
            Section::Certifications => self.certifications.len(),
            Section::Hackathons => self.hackathons.len(),
            Section::Internships => self.internships.len(),
            Section::Achievements => self.achievements.len(),
            Section::Languages => self.languages.len(),
            Section::PersonalInfo
            | Section::SelectedJobRole
            | Section::SelectedTemplate
            | Section::Roadmap => return None,
        };
        Some(count)
    }

    pub fn job_role(&self) -> Option<&str> {
        self.selected_job_role
            .as_deref()
            .map(str::trim)
            .filter(|role| !role.is_empty())
    }
}
