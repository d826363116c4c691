//! Step Registry: the static, ordered list of wizard steps.
//!
//! Steps are fixed at session start. Ids run 1..=N with no gaps and define
//! the order; only the `is_completed` display cache ever changes.

use serde::Serialize;
use thiserror::Error;

use crate::models::document::Section;

pub type StepId = u8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub id: StepId,
    pub title: &'static str,
    /// Name of the form component that edits this step's section.
    pub component_ref: &'static str,
    /// Display cache. Never read for gating.
    pub is_completed: bool,
    pub is_optional: bool,
    /// The DocumentModel section this step owns.
    pub section: Section,
}

impl Step {
    pub const fn required(
        id: StepId,
        title: &'static str,
        component_ref: &'static str,
        section: Section,
    ) -> Self {
        Self {
            id,
            title,
            component_ref,
            is_completed: false,
            is_optional: false,
            section,
        }
    }

    pub const fn optional(
        id: StepId,
        title: &'static str,
        component_ref: &'static str,
        section: Section,
    ) -> Self {
        Self {
            is_optional: true,
            ..Self::required(id, title, component_ref, section)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("a wizard needs at least one step")]
    Empty,

    #[error("step ids must run 1..=N in order; expected {expected}, found {found}")]
    OutOfOrder { expected: StepId, found: StepId },
}

#[derive(Debug, Clone)]
pub struct StepRegistry {
    steps: Vec<Step>,
}

impl StepRegistry {
    pub fn new(steps: Vec<Step>) -> Result<Self, RegistryError> {
        if steps.is_empty() {
            return Err(RegistryError::Empty);
        }
        for (index, step) in steps.iter().enumerate() {
            let expected = (index + 1) as StepId;
            if step.id != expected {
                return Err(RegistryError::OutOfOrder {
                    expected,
                    found: step.id,
                });
            }
        }
        Ok(Self { steps })
    }

    /// The résumé wizard's eleven steps.
    pub fn resume_wizard() -> Self {
        Self {
            steps: vec![
                Step::required(1, "Job Role", "JobRoleForm", Section::SelectedJobRole),
                Step::required(2, "Personal Info", "PersonalInfoForm", Section::PersonalInfo),
                Step::required(3, "Education", "EducationForm", Section::Education),
                Step::required(4, "Skills", "SkillsForm", Section::Skills),
                Step::optional(5, "Projects", "ProjectsForm", Section::Projects),
                Step::optional(6, "Internships", "InternshipsForm", Section::Internships),
                Step::optional(7, "Certifications", "CertificationsForm", Section::Certifications),
                Step::optional(8, "Hackathons", "HackathonsForm", Section::Hackathons),
                Step::optional(9, "Achievements", "AchievementsForm", Section::Achievements),
                Step::optional(10, "Languages", "LanguagesForm", Section::Languages),
                Step::required(11, "Template", "TemplatePicker", Section::SelectedTemplate),
            ],
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn first_id(&self) -> StepId {
        // Non-empty by construction.
        self.steps.first().map(|s| s.id).unwrap_or(1)
    }

    pub fn get(&self, id: StepId) -> Option<&Step> {
        id.checked_sub(1)
            .and_then(|index| self.steps.get(index as usize))
    }

    pub(crate) fn get_mut(&mut self, id: StepId) -> Option<&mut Step> {
        id.checked_sub(1)
            .and_then(|index| self.steps.get_mut(index as usize))
    }

    pub(crate) fn steps_mut(&mut self) -> impl Iterator<Item = &mut Step> {
        self.steps.iter_mut()
    }

    /// Steps strictly before `id`, in order.
    pub fn preceding(&self, id: StepId) -> impl Iterator<Item = &Step> {
        self.steps.iter().take_while(move |s| s.id < id)
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::resume_wizard()
    }
}
