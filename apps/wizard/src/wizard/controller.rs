//! Wizard Controller: state machine over the current step.
//!
//! # Gating
//! A step is reachable if it is registered and any of:
//! - it is at most one past the current step (this includes every step behind it),
//! - it was visited before,
//! - every step before it evaluates live to `complete` or `optional-empty`.
//!
//! Gating always calls the Completion Evaluator. The `is_completed` cache,
//! including anything forced through `complete_step`, is display-only, so a
//! skipped required step never unlocks the steps after it.
//!
//! Invalid requests are ignored without an error, like a disabled button.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::models::document::{DocumentModel, Section};
use crate::wizard::completion::{evaluate, CompletionStatus};
use crate::wizard::steps::{Step, StepId, StepRegistry};

/// Fade used by the presentation layer between steps.
pub const DEFAULT_TRANSITION_FADE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TransitionPhase {
    Idle,
    /// Fading out of `from`; `current_step_id` becomes `to` on `settle`.
    Transitioning { from: StepId, to: StepId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransitionOutcome {
    /// Committed immediately (zero fade).
    Committed { from: StepId, to: StepId },
    /// Fade started; the caller must `settle` once `fade` has elapsed.
    Started {
        from: StepId,
        to: StepId,
        #[serde(serialize_with = "serialize_millis")]
        fade: Duration,
    },
    /// Target is already the current step.
    Unchanged,
    /// Target unreachable, unknown, or a transition is already in flight.
    Ignored,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl TransitionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(
            self,
            TransitionOutcome::Committed { .. } | TransitionOutcome::Started { .. }
        )
    }
}

/// Per-step view handed to forms and progress indicators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepStatusView {
    pub step_id: StepId,
    pub title: &'static str,
    /// Live evaluator result.
    pub status: CompletionStatus,
    /// Display cache, including user-asserted completion.
    pub is_completed: bool,
    pub is_optional: bool,
    pub is_accessible: bool,
    pub is_current: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

#[derive(Debug, Clone)]
pub struct WizardController {
    registry: StepRegistry,
    current_step_id: StepId,
    furthest_visited: StepId,
    phase: TransitionPhase,
    fade: Duration,
    /// Steps the user marked done regardless of their data.
    asserted: BTreeSet<StepId>,
    is_loading: bool,
}

impl WizardController {
    pub fn new(registry: StepRegistry, fade: Duration) -> Self {
        let first = registry.first_id();
        Self {
            registry,
            current_step_id: first,
            furthest_visited: first,
            phase: TransitionPhase::Idle,
            fade,
            asserted: BTreeSet::new(),
            is_loading: false,
        }
    }

    pub fn current_step_id(&self) -> StepId {
        self.current_step_id
    }

    pub fn current_step(&self) -> &Step {
        // current_step_id is only ever set to a registered id.
        self.registry
            .get(self.current_step_id)
            .unwrap_or(&self.registry.steps()[0])
    }

    pub fn steps(&self) -> &[Step] {
        self.registry.steps()
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, TransitionPhase::Transitioning { .. })
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn set_loading(&mut self, is_loading: bool) {
        self.is_loading = is_loading;
    }

    pub fn can_access(&self, target: StepId, model: &DocumentModel) -> bool {
        if self.registry.get(target).is_none() {
            return false;
        }
        if target <= self.current_step_id.saturating_add(1) || target <= self.furthest_visited {
            return true;
        }
        self.registry
            .preceding(target)
            .all(|step| evaluate(step, model).is_satisfied())
    }

    pub fn go_to(&mut self, target: StepId, model: &DocumentModel) -> TransitionOutcome {
        let from = self.current_step_id;
        if self.is_transitioning() {
            debug!("Ignoring transition {from} -> {target}: transition in flight");
            return TransitionOutcome::Ignored;
        }
        if target == from {
            return TransitionOutcome::Unchanged;
        }
        if !self.can_access(target, model) {
            debug!("Ignoring transition {from} -> {target}: step not accessible");
            return TransitionOutcome::Ignored;
        }

        if self.fade.is_zero() {
            self.commit(target);
            return TransitionOutcome::Committed { from, to: target };
        }
        self.phase = TransitionPhase::Transitioning { from, to: target };
        debug!("Transition {from} -> {target} started ({}ms fade)", self.fade.as_millis());
        TransitionOutcome::Started {
            from,
            to: target,
            fade: self.fade,
        }
    }

    /// Finishes an in-flight transition. Returns the new current step, or
    /// `None` when nothing was pending.
    pub fn settle(&mut self) -> Option<StepId> {
        match self.phase {
            TransitionPhase::Transitioning { to, .. } => {
                self.commit(to);
                Some(to)
            }
            TransitionPhase::Idle => None,
        }
    }

    fn commit(&mut self, target: StepId) {
        info!("Wizard moved {} -> {target}", self.current_step_id);
        self.current_step_id = target;
        self.furthest_visited = self.furthest_visited.max(target);
        self.phase = TransitionPhase::Idle;
    }

    /// Marks a step done in the display cache. Idempotent. Returns `false`
    /// for an unknown step.
    pub fn complete_step(&mut self, step_id: StepId) -> bool {
        let Some(step) = self.registry.get_mut(step_id) else {
            return false;
        };
        step.is_completed = true;
        if self.asserted.insert(step_id) {
            debug!("Step {step_id} marked complete by user");
        }
        true
    }

    /// Recomputes the display cache for the steps owning `section`, or for
    /// every step when `section` is `None`.
    pub fn refresh(&mut self, model: &DocumentModel, section: Option<Section>) {
        let asserted = &self.asserted;
        for step in self.registry.steps_mut() {
            if section.is_some_and(|s| s != step.section) {
                continue;
            }
            step.is_completed =
                evaluate(step, model) == CompletionStatus::Complete || asserted.contains(&step.id);
        }
    }

    pub fn step_status(&self, step_id: StepId, model: &DocumentModel) -> Option<StepStatusView> {
        let step = self.registry.get(step_id)?;
        Some(StepStatusView {
            step_id,
            title: step.title,
            status: evaluate(step, model),
            is_completed: step.is_completed,
            is_optional: step.is_optional,
            is_accessible: self.can_access(step_id, model),
            is_current: step_id == self.current_step_id,
        })
    }

    pub fn progress(&self) -> Progress {
        let total = self.registry.len();
        let completed = self.steps().iter().filter(|s| s.is_completed).count();
        let percent = if total == 0 {
            0
        } else {
            ((completed * 100) / total) as u8
        };
        Progress {
            completed,
            total,
            percent,
        }
    }
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new(StepRegistry::default(), DEFAULT_TRANSITION_FADE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::MutationDispatcher;
    use serde_json::json;

    fn instant() -> WizardController {
        WizardController::new(StepRegistry::resume_wizard(), Duration::ZERO)
    }

    fn fill_required(dispatcher: &mut MutationDispatcher) {
        dispatcher
            .update_section("selectedJobRole", json!("Backend Engineer"))
            .unwrap();
        dispatcher
            .update_section(
                "personalInfo",
                json!({"full_name": "Jane Doe", "email": "jane@x.com", "phone": "555-0100"}),
            )
            .unwrap();
        dispatcher
            .update_section("education", json!([{"institution": "MIT", "degree": "BSc"}]))
            .unwrap();
        dispatcher
            .update_section("skills", json!([{"name": "Rust"}]))
            .unwrap();
    }

    #[test]
    fn test_fresh_wizard_starts_at_step_one() {
        let wizard = instant();
        assert_eq!(wizard.current_step_id(), 1);
        assert_eq!(wizard.current_step().title, "Job Role");
        assert_eq!(wizard.phase(), TransitionPhase::Idle);
    }

    #[test]
    fn test_jump_past_incomplete_steps_ignored() {
        let mut wizard = instant();
        let model = DocumentModel::default();
        assert_eq!(wizard.go_to(3, &model), TransitionOutcome::Ignored);
        assert_eq!(wizard.current_step_id(), 1);
    }

    #[test]
    fn test_next_step_always_reachable() {
        let mut wizard = instant();
        let model = DocumentModel::default();
        assert_eq!(
            wizard.go_to(2, &model),
            TransitionOutcome::Committed { from: 1, to: 2 }
        );
        assert_eq!(wizard.current_step_id(), 2);
    }

    #[test]
    fn test_unknown_step_ignored() {
        let mut wizard = instant();
        let model = DocumentModel::default();
        assert_eq!(wizard.go_to(0, &model), TransitionOutcome::Ignored);
        assert_eq!(wizard.go_to(42, &model), TransitionOutcome::Ignored);
        assert_eq!(wizard.current_step_id(), 1);
    }

    #[test]
    fn test_go_to_current_is_unchanged() {
        let mut wizard = instant();
        assert_eq!(
            wizard.go_to(1, &DocumentModel::default()),
            TransitionOutcome::Unchanged
        );
    }

    #[test]
    fn test_gating_unlocks_once_required_step_completes() {
        let mut dispatcher = MutationDispatcher::default();
        let mut wizard = instant();
        dispatcher
            .update_section("selectedJobRole", json!("Backend Engineer"))
            .unwrap();

        // Step 2 (personal info) is required and incomplete: step 4 stays locked.
        assert_eq!(wizard.go_to(4, dispatcher.model()), TransitionOutcome::Ignored);
        assert_eq!(wizard.current_step_id(), 1);

        dispatcher
            .update_section(
                "personalInfo",
                json!({"full_name": "Jane Doe", "email": "jane@x.com", "phone": "555-0100"}),
            )
            .unwrap();
        dispatcher
            .update_section("education", json!([{"institution": "MIT", "degree": "BSc"}]))
            .unwrap();

        assert!(wizard.go_to(4, dispatcher.model()).is_accepted());
        assert_eq!(wizard.current_step_id(), 4);
    }

    #[test]
    fn test_empty_optional_step_does_not_block() {
        let mut dispatcher = MutationDispatcher::default();
        let mut wizard = instant();
        fill_required(&mut dispatcher);
        dispatcher.update_section("projects", json!([])).unwrap();

        assert!(wizard.go_to(5, dispatcher.model()).is_accepted());
        assert!(wizard.go_to(6, dispatcher.model()).is_accepted());
        assert_eq!(wizard.current_step_id(), 6);

        // Straight past several empty optional steps.
        assert!(wizard.go_to(11, dispatcher.model()).is_accepted());
    }

    #[test]
    fn test_visited_steps_stay_reachable() {
        let mut dispatcher = MutationDispatcher::default();
        let mut wizard = instant();
        fill_required(&mut dispatcher);
        assert!(wizard.go_to(8, dispatcher.model()).is_accepted());
        assert!(wizard.go_to(1, dispatcher.model()).is_accepted());

        dispatcher.update_section("skills", json!([])).unwrap();
        assert!(wizard.go_to(8, dispatcher.model()).is_accepted());
        // Never visited, and skills is incomplete again.
        assert_eq!(wizard.go_to(10, dispatcher.model()), TransitionOutcome::Ignored);
    }

    #[test]
    fn test_complete_step_is_idempotent() {
        let mut wizard = instant();
        assert!(wizard.complete_step(3));
        let once = wizard.steps().to_vec();
        assert!(wizard.complete_step(3));
        assert_eq!(wizard.steps(), once.as_slice());
        assert!(wizard.steps()[2].is_completed);
        assert!(!wizard.complete_step(99));
    }

    #[test]
    fn test_asserted_step_does_not_unlock_gating() {
        let model = DocumentModel::default();
        let mut wizard = instant();
        wizard.complete_step(1);
        wizard.complete_step(2);
        assert_eq!(wizard.go_to(3, &model), TransitionOutcome::Ignored);
        assert_eq!(
            wizard.step_status(2, &model).map(|s| s.status),
            Some(CompletionStatus::Incomplete)
        );
    }

    #[test]
    fn test_refresh_keeps_asserted_steps() {
        let model = DocumentModel::default();
        let mut wizard = instant();
        wizard.complete_step(5);
        wizard.refresh(&model, None);
        assert!(wizard.steps()[4].is_completed);
        assert!(!wizard.steps()[0].is_completed);
    }

    #[test]
    fn test_refresh_only_touches_owning_step() {
        let mut dispatcher = MutationDispatcher::default();
        let mut wizard = instant();
        fill_required(&mut dispatcher);
        wizard.refresh(dispatcher.model(), Some(Section::Skills));
        let completed: Vec<_> = wizard
            .steps()
            .iter()
            .filter(|s| s.is_completed)
            .map(|s| s.id)
            .collect();
        assert_eq!(completed, vec![4]);
    }

    #[test]
    fn test_progress() {
        let mut dispatcher = MutationDispatcher::default();
        let mut wizard = instant();
        fill_required(&mut dispatcher);
        wizard.refresh(dispatcher.model(), None);
        // Four required data steps plus the template step.
        assert_eq!(
            wizard.progress(),
            Progress {
                completed: 5,
                total: 11,
                percent: 45
            }
        );
    }

    #[test]
    fn test_fade_defers_commit_until_settle() {
        let model = DocumentModel::default();
        let mut wizard = WizardController::default();
        let outcome = wizard.go_to(2, &model);
        assert_eq!(
            outcome,
            TransitionOutcome::Started {
                from: 1,
                to: 2,
                fade: DEFAULT_TRANSITION_FADE
            }
        );
        assert_eq!(wizard.current_step_id(), 1);
        assert!(wizard.is_transitioning());

        // A second request while fading is dropped.
        assert_eq!(wizard.go_to(1, &model), TransitionOutcome::Ignored);

        assert_eq!(wizard.settle(), Some(2));
        assert_eq!(wizard.current_step_id(), 2);
        assert_eq!(wizard.settle(), None);
    }

    #[test]
    fn test_step_status_view() {
        let model = DocumentModel::default();
        let wizard = instant();
        let view = wizard.step_status(5, &model).unwrap();
        assert_eq!(view.status, CompletionStatus::OptionalEmpty);
        assert!(view.is_optional);
        assert!(!view.is_accessible);
        assert!(!view.is_current);
        assert!(wizard.step_status(12, &model).is_none());
    }
}
