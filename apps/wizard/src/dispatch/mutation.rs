//! Tagged mutation requests and the pure reducer that applies them.
//!
//! `reduce` never touches its input: it clones the record (cheap, every
//! section is an `Arc`), swaps exactly one section, and returns the new
//! model. Any error is raised before the swap, so a rejected mutation leaves
//! no partial state behind.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::models::document::{
    find_duplicate_id, AchievementEntry, CertificationEntry, DocumentModel, EducationEntry,
    HackathonEntry, InternshipEntry, LanguageEntry, PersonalInfo, ProjectEntry, Roadmap, Section,
    SectionEntry, SkillEntry,
};
use crate::models::plan::{PremiumFeature, UpgradeRequired};
use crate::preview::templates::TemplateId;

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("unknown section '{0}'")]
    UnknownSection(String),

    #[error("invalid payload for section '{section}': {reason}")]
    InvalidPayload { section: Section, reason: String },

    #[error("duplicate entry id {id} in section '{section}'")]
    DuplicateEntryId { section: Section, id: Uuid },

    #[error("entry {id} not found in section '{section}'")]
    EntryNotFound { section: Section, id: Uuid },

    #[error("section '{0}' does not hold entries")]
    NotAListSection(Section),

    #[error(transparent)]
    UpgradeRequired(#[from] UpgradeRequired),
}

// ────────────────────────────────────────────────────────────────────────────
// Mutation requests
// ────────────────────────────────────────────────────────────────────────────

/// Replacement payload for one section. One payload shape per section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "section", content = "payload", rename_all = "camelCase")]
pub enum SectionUpdate {
    PersonalInfo(PersonalInfo),
    Education(Vec<EducationEntry>),
    Skills(Vec<SkillEntry>),
    Projects(Vec<ProjectEntry>),
    Certifications(Vec<CertificationEntry>),
    Hackathons(Vec<HackathonEntry>),
    Internships(Vec<InternshipEntry>),
    Achievements(Vec<AchievementEntry>),
    Languages(Vec<LanguageEntry>),
    SelectedJobRole(Option<String>),
    SelectedTemplate(TemplateId),
    Roadmap(Option<Roadmap>),
}

impl SectionUpdate {
    /// Builds an update from a section name and an untyped payload, as
    /// received at the form/HTTP boundary.
    pub fn from_parts(section: &str, payload: Value) -> Result<Self, DispatchError> {
        let section: Section = section
            .parse()
            .map_err(|_| DispatchError::UnknownSection(section.to_string()))?;

        let invalid = |e: serde_json::Error| DispatchError::InvalidPayload {
            section,
            reason: e.to_string(),
        };

        let update = match section {
            Section::PersonalInfo => {
                SectionUpdate::PersonalInfo(serde_json::from_value(payload).map_err(invalid)?)
            }
            Section::Education => {
                SectionUpdate::Education(serde_json::from_value(payload).map_err(invalid)?)
            }
            Section::Skills => {
                SectionUpdate::Skills(serde_json::from_value(payload).map_err(invalid)?)
            }
            Section::Projects => {
                SectionUpdate::Projects(serde_json::from_value(payload).map_err(invalid)?)
            }
            Section::Certifications => {
                SectionUpdate::Certifications(serde_json::from_value(payload).map_err(invalid)?)
            }
            Section::Hackathons => {
                SectionUpdate::Hackathons(serde_json::from_value(payload).map_err(invalid)?)
            }
            Section::Internships => {
                SectionUpdate::Internships(serde_json::from_value(payload).map_err(invalid)?)
            }
            Section::Achievements => {
                SectionUpdate::Achievements(serde_json::from_value(payload).map_err(invalid)?)
            }
            Section::Languages => {
                SectionUpdate::Languages(serde_json::from_value(payload).map_err(invalid)?)
            }
            Section::SelectedJobRole => {
                SectionUpdate::SelectedJobRole(serde_json::from_value(payload).map_err(invalid)?)
            }
            Section::SelectedTemplate => {
                SectionUpdate::SelectedTemplate(serde_json::from_value(payload).map_err(invalid)?)
            }
            Section::Roadmap => {
                SectionUpdate::Roadmap(serde_json::from_value(payload).map_err(invalid)?)
            }
        };
        Ok(update)
    }

    pub fn section(&self) -> Section {
        match self {
            SectionUpdate::PersonalInfo(_) => Section::PersonalInfo,
            SectionUpdate::Education(_) => Section::Education,
            SectionUpdate::Skills(_) => Section::Skills,
            SectionUpdate::Projects(_) => Section::Projects,
            SectionUpdate::Certifications(_) => Section::Certifications,
            SectionUpdate::Hackathons(_) => Section::Hackathons,
            SectionUpdate::Internships(_) => Section::Internships,
            SectionUpdate::Achievements(_) => Section::Achievements,
            SectionUpdate::Languages(_) => Section::Languages,
            SectionUpdate::SelectedJobRole(_) => Section::SelectedJobRole,
            SectionUpdate::SelectedTemplate(_) => Section::SelectedTemplate,
            SectionUpdate::Roadmap(_) => Section::Roadmap,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Mutation {
    UpdateSection(SectionUpdate),
    RemoveEntry { section: Section, id: Uuid },
    /// Written by the plan capability when the user's tier changes.
    SetPlan { is_premium: bool },
}

impl Mutation {
    /// The section whose owning step must be re-evaluated after this mutation.
    /// The plan tier decides whether the selected template is usable, so it
    /// reports the template section.
    pub fn section(&self) -> Section {
        match self {
            Mutation::UpdateSection(update) => update.section(),
            Mutation::RemoveEntry { section, .. } => *section,
            Mutation::SetPlan { .. } => Section::SelectedTemplate,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Reducer
// ────────────────────────────────────────────────────────────────────────────

/// Applies `mutation` to `prev`, returning a new model in which only the
/// named section differs.
pub fn reduce(prev: &DocumentModel, mutation: Mutation) -> Result<DocumentModel, DispatchError> {
    let mut next = prev.clone();
    match mutation {
        Mutation::UpdateSection(update) => apply_update(&mut next, update)?,
        Mutation::RemoveEntry { section, id } => remove_entry(&mut next, section, id)?,
        Mutation::SetPlan { is_premium } => next.is_premium = is_premium,
    }
    Ok(next)
}

fn apply_update(model: &mut DocumentModel, update: SectionUpdate) -> Result<(), DispatchError> {
    match update {
        SectionUpdate::PersonalInfo(info) => model.personal_info = Arc::new(info),
        SectionUpdate::Education(entries) => {
            replace_list(&mut model.education, Section::Education, entries)?
        }
        SectionUpdate::Skills(entries) => replace_list(&mut model.skills, Section::Skills, entries)?,
        SectionUpdate::Projects(entries) => {
            replace_list(&mut model.projects, Section::Projects, entries)?
        }
        SectionUpdate::Certifications(entries) => {
            replace_list(&mut model.certifications, Section::Certifications, entries)?
        }
        SectionUpdate::Hackathons(entries) => {
            replace_list(&mut model.hackathons, Section::Hackathons, entries)?
        }
        SectionUpdate::Internships(entries) => {
            replace_list(&mut model.internships, Section::Internships, entries)?
        }
        SectionUpdate::Achievements(entries) => {
            replace_list(&mut model.achievements, Section::Achievements, entries)?
        }
        SectionUpdate::Languages(entries) => {
            replace_list(&mut model.languages, Section::Languages, entries)?
        }
        SectionUpdate::SelectedJobRole(role) => model.selected_job_role = role,
        SectionUpdate::SelectedTemplate(template) => {
            if !template.is_selectable(model.is_premium) {
                return Err(UpgradeRequired {
                    feature: PremiumFeature::Template(template),
                }
                .into());
            }
            model.selected_template = template;
        }
        SectionUpdate::Roadmap(roadmap) => model.roadmap = roadmap.map(Arc::new),
    }
    Ok(())
}

fn replace_list<E: SectionEntry>(
    slot: &mut Arc<Vec<E>>,
    section: Section,
    entries: Vec<E>,
) -> Result<(), DispatchError> {
    if let Some(id) = find_duplicate_id(&entries) {
        return Err(DispatchError::DuplicateEntryId { section, id });
    }
    *slot = Arc::new(entries);
    Ok(())
}

fn remove_entry(model: &mut DocumentModel, section: Section, id: Uuid) -> Result<(), DispatchError> {
    match section {
        Section::Education => remove_from(&mut model.education, section, id),
        Section::Skills => remove_from(&mut model.skills, section, id),
        Section::Projects => remove_from(&mut model.projects, section, id),
        Section::Certifications => remove_from(&mut model.certifications, section, id),
        Section::Hackathons => remove_from(&mut model.hackathons, section, id),
        Section::Internships => remove_from(&mut model.internships, section, id),
        Section::Achievements => remove_from(&mut model.achievements, section, id),
        Section::Languages => remove_from(&mut model.languages, section, id),
        Section::PersonalInfo
        | Section::SelectedJobRole
        | Section::SelectedTemplate
        | Section::Roadmap => Err(DispatchError::NotAListSection(section)),
    }
}

fn remove_from<E: SectionEntry + Clone>(
    slot: &mut Arc<Vec<E>>,
    section: Section,
    id: Uuid,
) -> Result<(), DispatchError> {
    let position = slot
        .iter()
        .position(|entry| entry.id() == id)
        .ok_or(DispatchError::EntryNotFound { section, id })?;
    // The previous model still holds the old Vec, so this clones it.
    Arc::make_mut(slot).remove(position);
    Ok(())
}
