//! Completion Evaluator: classifies a step from the data it owns.
//!
//! `evaluate` is a pure function of `(step, model)`: no counters, no clocks.
//! Gating calls it live on every check; `Step::is_completed` is only a cache
//! of its result for display.

use serde::{Deserialize, Serialize};

use crate::models::document::{DocumentModel, PersonalInfo, Section};
use crate::wizard::steps::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionStatus {
    Complete,
    Incomplete,
    /// An optional step with no data. Never blocks navigation.
    OptionalEmpty,
}

impl CompletionStatus {
    /// True when this status does not block later steps.
    pub fn is_satisfied(&self) -> bool {
        !matches!(self, CompletionStatus::Incomplete)
    }
}

/// Personal-info fields that must be non-blank for the step to be complete.
pub const MANDATORY_PERSONAL_FIELDS: &[&str] = &["full_name", "email", "phone"];

pub fn evaluate(step: &Step, model: &DocumentModel) -> CompletionStatus {
    match (section_satisfied(step.section, model), step.is_optional) {
        (true, _) => CompletionStatus::Complete,
        (false, true) => CompletionStatus::OptionalEmpty,
        (false, false) => CompletionStatus::Incomplete,
    }
}

fn section_satisfied(section: Section, model: &DocumentModel) -> bool {
    match section {
        Section::PersonalInfo => missing_personal_fields(&model.personal_info).is_empty(),
        Section::SelectedJobRole => model.job_role().is_some(),
        Section::SelectedTemplate => model.selected_template.is_selectable(model.is_premium),
        Section::Roadmap => model.roadmap.is_some(),
        list => model.entry_count(list).unwrap_or(0) > 0,
    }
}

/// Mandatory personal-info fields that are still blank, in declaration order.
pub fn missing_personal_fields(info: &PersonalInfo) -> Vec<&'static str> {
    MANDATORY_PERSONAL_FIELDS
        .iter()
        .copied()
        .filter(|field| {
            let value = match *field {
                "full_name" => &info.full_name,
                "email" => &info.email,
                "phone" => &info.phone,
                _ => return false,
            };
            value.trim().is_empty()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::MutationDispatcher;
    use crate::preview::templates::TemplateId;
    use crate::wizard::steps::StepRegistry;
    use serde_json::json;

    fn step(id: u8) -> Step {
        StepRegistry::resume_wizard().get(id).cloned().unwrap()
    }

    #[test]
    fn test_camel_case_personal_info_is_complete() {
        let mut dispatcher = MutationDispatcher::default();
        dispatcher
            .update_section(
                "personalInfo",
                json!({"full_name": "Old Name", "email": "old@x.com", "phone": "555-0000"}),
            )
            .unwrap();
        dispatcher
            .update_section(
                "personalInfo",
                json!({"fullName": "Jane Doe", "email": "jane@x.com", "phone": "555-0100"}),
            )
            .unwrap();

        assert_eq!(dispatcher.model().personal_info.full_name, "Jane Doe");
        assert_eq!(
            evaluate(&step(2), dispatcher.model()),
            CompletionStatus::Complete
        );
    }

    #[test]
    fn test_fresh_model_statuses() {
        let model = DocumentModel::default();
        let registry = StepRegistry::resume_wizard();
        let statuses: Vec<_> = registry
            .steps()
            .iter()
            .map(|s| evaluate(s, &model))
            .collect();

        use CompletionStatus::*;
        assert_eq!(
            statuses,
            vec![
                Incomplete,
                Incomplete,
                Incomplete,
                Incomplete,
                OptionalEmpty,
                OptionalEmpty,
                OptionalEmpty,
                OptionalEmpty,
                OptionalEmpty,
                OptionalEmpty,
                // The default template is free, so the template step starts complete.
                Complete,
            ]
        );
    }

    #[test]
    fn test_personal_info_complete_with_mandatory_fields() {
        let mut dispatcher = MutationDispatcher::default();
        dispatcher
            .update_section(
                "personalInfo",
                json!({"full_name": "Jane Doe", "email": "jane@x.com", "phone": "555-0100"}),
            )
            .unwrap();
        assert_eq!(
            evaluate(&step(2), dispatcher.model()),
            CompletionStatus::Complete
        );
    }

    #[test]
    fn test_personal_info_blank_field_is_incomplete() {
        let info = PersonalInfo {
            full_name: "Jane Doe".to_string(),
            email: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(missing_personal_fields(&info), vec!["email", "phone"]);
    }

    #[test]
    fn test_empty_optional_list_is_optional_empty() {
        let mut dispatcher = MutationDispatcher::default();
        dispatcher.update_section("projects", json!([])).unwrap();
        let status = evaluate(&step(5), dispatcher.model());
        assert_eq!(status, CompletionStatus::OptionalEmpty);
        assert!(status.is_satisfied());
    }

    #[test]
    fn test_required_list_needs_one_entry() {
        let mut dispatcher = MutationDispatcher::default();
        assert_eq!(evaluate(&step(4), dispatcher.model()), CompletionStatus::Incomplete);
        dispatcher
            .update_section("skills", json!([{"name": "Rust"}]))
            .unwrap();
        assert_eq!(evaluate(&step(4), dispatcher.model()), CompletionStatus::Complete);
    }

    #[test]
    fn test_premium_template_incomplete_after_downgrade() {
        let mut dispatcher = MutationDispatcher::default();
        dispatcher.set_plan(true).unwrap();
        dispatcher
            .update_section("selectedTemplate", json!("executive"))
            .unwrap();
        assert_eq!(evaluate(&step(11), dispatcher.model()), CompletionStatus::Complete);

        dispatcher.set_plan(false).unwrap();
        assert_eq!(dispatcher.model().selected_template, TemplateId::Executive);
        assert_eq!(evaluate(&step(11), dispatcher.model()), CompletionStatus::Incomplete);
    }

    #[test]
    fn test_evaluate_is_pure() {
        let mut dispatcher = MutationDispatcher::default();
        dispatcher
            .update_section("education", json!([{"institution": "MIT", "degree": "BSc"}]))
            .unwrap();
        let model = dispatcher.model();
        for s in StepRegistry::resume_wizard().steps() {
            let first = evaluate(s, model);
            for _ in 0..5 {
                assert_eq!(evaluate(s, model), first);
            }
        }
    }
}
