//! One wizard session: the DocumentModel owner, the wizard controller, the
//! toast queue and the timers that drive them.
//!
//! `WizardSession` is fully synchronous. Anything that must happen later
//! (finishing a step fade, a simulated save delay, expiring a toast) is
//! recorded as an `Effect`; `SessionHandle` drains those after every
//! operation and hands them to the session's `Scheduler`. A fired effect
//! re-locks the session and drops itself if the session has been disposed.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::dispatch::{DispatchError, DispatchReceipt, MutationDispatcher};
use crate::models::document::{DocumentModel, Section};
use crate::notify::{Toast, ToastId, ToastKind, ToastQueue};
use crate::preview::templates::TemplateId;
use crate::preview::{render, render_selected, RenderError, RenderOptions, RenderedDocument};
use crate::scheduler::Scheduler;
use crate::wizard::{
    Progress, Step, StepId, StepRegistry, StepStatusView, TransitionOutcome, TransitionPhase,
    WizardController,
};

/// Per-session timing and defaults, taken from `Config`.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub transition_fade: Duration,
    pub save_latency: Duration,
    /// Zero keeps toasts until they are dismissed explicitly.
    pub toast_ttl: Duration,
    pub default_template: TemplateId,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            transition_fade: crate::wizard::DEFAULT_TRANSITION_FADE,
            save_latency: Duration::from_millis(600),
            toast_ttl: Duration::from_millis(4000),
            default_template: TemplateId::Classic,
        }
    }
}

/// Deferred state updates produced by synchronous operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Effect {
    Settle { after: Duration },
    FinishSave { step_id: StepId, after: Duration },
    ExpireToast { id: ToastId, after: Duration },
}

impl Effect {
    fn delay(&self) -> Duration {
        match *self {
            Effect::Settle { after }
            | Effect::FinishSave { after, .. }
            | Effect::ExpireToast { after, .. } => after,
        }
    }
}

/// Full wizard snapshot for the display layer.
#[derive(Debug, Clone, Serialize)]
pub struct WizardState {
    pub session_id: Uuid,
    pub current_step_id: StepId,
    pub current_step: Step,
    pub steps: Vec<Step>,
    pub is_loading: bool,
    pub toasts: Vec<Toast>,
    pub phase: TransitionPhase,
    pub progress: Progress,
    pub revision: u64,
    pub document: DocumentModel,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct WizardSession {
    id: Uuid,
    dispatcher: MutationDispatcher,
    wizard: WizardController,
    toasts: ToastQueue,
    scheduler: Scheduler,
    settings: SessionSettings,
    effects: Vec<Effect>,
    pending_saves: usize,
    disposed: bool,
    created_at: DateTime<Utc>,
}

impl WizardSession {
    pub fn new(id: Uuid, settings: SessionSettings) -> Self {
        let model = DocumentModel {
            selected_template: settings.default_template,
            ..Default::default()
        };
        let mut wizard = WizardController::new(StepRegistry::resume_wizard(), settings.transition_fade);
        wizard.refresh(&model, None);

        Self {
            id,
            dispatcher: MutationDispatcher::new(model),
            wizard,
            toasts: ToastQueue::new(),
            scheduler: Scheduler::new(),
            settings,
            effects: Vec::new(),
            pending_saves: 0,
            disposed: false,
            created_at: Utc::now(),
        }
    }

    pub fn model(&self) -> &DocumentModel {
        self.dispatcher.model()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ── Mutations ──────────────────────────────────────────────────────────

    pub fn update_section(
        &mut self,
        section: &str,
        payload: Value,
    ) -> Result<DispatchReceipt, DispatchError> {
        let result = self.dispatcher.update_section(section, payload);
        self.after_dispatch(result)
    }

    pub fn remove_entry(
        &mut self,
        section: Section,
        id: Uuid,
    ) -> Result<DispatchReceipt, DispatchError> {
        let result = self.dispatcher.remove_entry(section, id);
        self.after_dispatch(result)
    }

    pub fn set_plan(&mut self, is_premium: bool) -> Result<DispatchReceipt, DispatchError> {
        let result = self.dispatcher.set_plan(is_premium);
        self.after_dispatch(result)
    }

    fn after_dispatch(
        &mut self,
        result: Result<DispatchReceipt, DispatchError>,
    ) -> Result<DispatchReceipt, DispatchError> {
        match &result {
            Ok(receipt) => self
                .wizard
                .refresh(self.dispatcher.model(), Some(receipt.section)),
            Err(e) => {
                self.notify(ToastKind::Error, e.to_string());
            }
        }
        result
    }

    // ── Navigation ─────────────────────────────────────────────────────────

    pub fn go_to(&mut self, target: StepId) -> TransitionOutcome {
        let outcome = self.wizard.go_to(target, self.dispatcher.model());
        if let TransitionOutcome::Started { fade, .. } = outcome {
            self.effects.push(Effect::Settle { after: fade });
        }
        outcome
    }

    pub fn complete_step(&mut self, step_id: StepId) -> bool {
        self.wizard.complete_step(step_id)
    }

    pub fn current_step(&self) -> &Step {
        self.wizard.current_step()
    }

    pub fn step_status(&self, step_id: StepId) -> Option<StepStatusView> {
        self.wizard.step_status(step_id, self.dispatcher.model())
    }

    /// Starts a simulated save of `step_id`. The step is marked complete and
    /// a toast is raised once the save latency has elapsed.
    pub fn save_step(&mut self, step_id: StepId) -> bool {
        if self.wizard.steps().iter().all(|s| s.id != step_id) {
            return false;
        }
        self.pending_saves += 1;
        self.wizard.set_loading(true);
        if self.settings.save_latency.is_zero() {
            self.finish_save(step_id);
        } else {
            self.effects.push(Effect::FinishSave {
                step_id,
                after: self.settings.save_latency,
            });
        }
        true
    }

    fn finish_save(&mut self, step_id: StepId) {
        self.pending_saves = self.pending_saves.saturating_sub(1);
        self.wizard.set_loading(self.pending_saves > 0);
        self.wizard.complete_step(step_id);
        let title = self
            .wizard
            .steps()
            .iter()
            .find(|s| s.id == step_id)
            .map(|s| s.title)
            .unwrap_or("Step");
        self.notify(ToastKind::Success, format!("{title} saved"));
    }

    // ── Preview ────────────────────────────────────────────────────────────

    /// Renders the current model. `None` uses the model's selected template;
    /// an unknown id falls back to the session's default template.
    pub fn preview(
        &self,
        template_id: Option<&str>,
        options: RenderOptions,
    ) -> Result<RenderedDocument, RenderError> {
        let options = RenderOptions {
            fallback: self.settings.default_template,
            ..options
        };
        match template_id {
            Some(id) => render(self.dispatcher.model(), id, options),
            None => render_selected(self.dispatcher.model(), options),
        }
    }

    // ── Toasts ─────────────────────────────────────────────────────────────

    pub fn notify(&mut self, kind: ToastKind, message: impl Into<String>) -> ToastId {
        let id = self.toasts.add(kind, message);
        if !self.settings.toast_ttl.is_zero() {
            self.effects.push(Effect::ExpireToast {
                id,
                after: self.settings.toast_ttl,
            });
        }
        id
    }

    pub fn dismiss(&mut self, id: ToastId) -> bool {
        self.toasts.remove(id)
    }

    // ── Lifecycle ──────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> WizardState {
        WizardState {
            session_id: self.id,
            current_step_id: self.wizard.current_step_id(),
            current_step: self.current_step().clone(),
            steps: self.wizard.steps().to_vec(),
            is_loading: self.wizard.is_loading(),
            toasts: self.toasts.list(),
            phase: self.wizard.phase(),
            progress: self.wizard.progress(),
            revision: self.dispatcher.revision(),
            document: self.dispatcher.model().clone(),
            created_at: self.created_at,
        }
    }

    /// Tears the session down. Pending timers are cancelled and any that
    /// already fired become no-ops.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.effects.clear();
        self.scheduler.shutdown();
        info!("Session {} disposed", self.id);
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Settle { .. } => {
                self.wizard.settle();
            }
            Effect::FinishSave { step_id, .. } => self.finish_save(step_id),
            Effect::ExpireToast { id, .. } => {
                self.toasts.remove(id);
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared handle
// ────────────────────────────────────────────────────────────────────────────

/// Cloneable handle to a session behind an async mutex.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<WizardSession>>,
}

impl SessionHandle {
    pub fn new(session: WizardSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Runs `op` against the session, then schedules whatever deferred
    /// effects it produced.
    pub async fn with<R>(&self, op: impl FnOnce(&mut WizardSession) -> R) -> R {
        let mut guard = self.inner.lock().await;
        let result = op(&mut *guard);
        arm_effects(&Arc::downgrade(&self.inner), &mut guard);
        result
    }
}

fn arm_effects(weak: &Weak<Mutex<WizardSession>>, session: &mut WizardSession) {
    if session.is_disposed() {
        session.effects.clear();
        return;
    }
    for effect in std::mem::take(&mut session.effects) {
        debug!("Scheduling {effect:?} for session {}", session.id);
        let task = run_effect(weak.clone(), effect);
        session.scheduler.schedule(effect.delay(), task);
    }
}

fn run_effect(
    weak: Weak<Mutex<WizardSession>>,
    effect: Effect,
) -> Pin<Box<dyn Future<Output = ()> + Send>> {
    Box::pin(async move {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let mut guard = inner.lock().await;
        if guard.is_disposed() {
            return;
        }
        guard.apply(effect);
        arm_effects(&weak, &mut guard);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::completion::CompletionStatus;
    use serde_json::json;

    fn instant_settings() -> SessionSettings {
        SessionSettings {
            transition_fade: Duration::ZERO,
            save_latency: Duration::ZERO,
            toast_ttl: Duration::ZERO,
            default_template: TemplateId::Classic,
        }
    }

    fn session(settings: SessionSettings) -> WizardSession {
        WizardSession::new(Uuid::new_v4(), settings)
    }

    #[test]
    fn test_fresh_session_rejects_jump_to_step_three() {
        let mut s = session(instant_settings());
        assert_eq!(s.go_to(3), TransitionOutcome::Ignored);
        assert_eq!(s.snapshot().current_step_id, 1);
    }

    #[test]
    fn test_update_refreshes_step_cache() {
        let mut s = session(instant_settings());
        s.update_section(
            "personalInfo",
            json!({"full_name": "Jane Doe", "email": "jane@x.com", "phone": "555-0100"}),
        )
        .unwrap();
        let state = s.snapshot();
        assert!(state.steps[1].is_completed);
        assert_eq!(
            s.step_status(2).map(|v| v.status),
            Some(CompletionStatus::Complete)
        );
        assert_eq!(state.revision, 1);
    }

    #[test]
    fn test_rejected_update_raises_error_toast() {
        let mut s = session(instant_settings());
        let err = s.update_section("hobbies", json!([])).unwrap_err();
        assert_eq!(err, DispatchError::UnknownSection("hobbies".to_string()));
        let toasts = s.snapshot().toasts;
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Error);
        assert_eq!(s.snapshot().revision, 0);
    }

    #[test]
    fn test_empty_projects_do_not_block_next_step() {
        let mut s = session(instant_settings());
        s.update_section("selectedJobRole", json!("Data Analyst")).unwrap();
        s.update_section(
            "personalInfo",
            json!({"full_name": "Jane Doe", "email": "jane@x.com", "phone": "555-0100"}),
        )
        .unwrap();
        s.update_section("education", json!([{"institution": "MIT", "degree": "BSc"}]))
            .unwrap();
        s.update_section("skills", json!([{"name": "SQL"}])).unwrap();
        s.update_section("projects", json!([])).unwrap();

        assert!(s.go_to(5).is_accepted());
        assert_eq!(
            s.step_status(5).map(|v| v.status),
            Some(CompletionStatus::OptionalEmpty)
        );
        assert!(s.go_to(6).is_accepted());
        assert_eq!(s.current_step().id, 6);
    }

    #[test]
    fn test_instant_save_completes_step() {
        let mut s = session(instant_settings());
        assert!(s.save_step(7));
        let state = s.snapshot();
        assert!(state.steps[6].is_completed);
        assert!(!state.is_loading);
        assert_eq!(state.toasts[0].message, "Certifications saved");
        assert!(!s.save_step(40));
    }

    #[test]
    fn test_toast_add_then_dismiss() {
        let mut s = session(instant_settings());
        let id = s.notify(ToastKind::Success, "Saved");
        assert!(s.dismiss(id));
        assert!(s.snapshot().toasts.is_empty());
    }

    #[test]
    fn test_default_template_from_settings() {
        let s = session(SessionSettings {
            default_template: TemplateId::Modern,
            ..instant_settings()
        });
        assert_eq!(s.model().selected_template, TemplateId::Modern);
        let doc = s
            .preview(
                None,
                RenderOptions {
                    show_placeholder: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(doc.template, TemplateId::Modern);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_settles_through_scheduler() {
        let handle = SessionHandle::new(session(SessionSettings::default()));
        let outcome = handle.with(|s| s.go_to(2)).await;
        assert!(matches!(outcome, TransitionOutcome::Started { to: 2, .. }));
        assert_eq!(handle.with(|s| s.current_step().id).await, 1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        let state = handle.with(|s| s.snapshot()).await;
        assert_eq!(state.current_step_id, 2);
        assert_eq!(state.current_step.title, "Personal Info");
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_latency_and_toast_expiry() {
        let handle = SessionHandle::new(session(SessionSettings::default()));
        assert!(handle.with(|s| s.save_step(5)).await);
        assert!(handle.with(|s| s.snapshot()).await.is_loading);

        tokio::time::sleep(Duration::from_millis(700)).await;
        let state = handle.with(|s| s.snapshot()).await;
        assert!(!state.is_loading);
        assert!(state.steps[4].is_completed);
        assert_eq!(state.toasts.len(), 1);

        tokio::time::sleep(Duration::from_millis(4100)).await;
        assert!(handle.with(|s| s.snapshot()).await.toasts.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disposed_session_ignores_pending_timers() {
        let handle = SessionHandle::new(session(SessionSettings::default()));
        handle.with(|s| s.save_step(5)).await;
        handle.with(|s| s.dispose()).await;

        tokio::time::sleep(Duration::from_secs(1)).await;
        let (disposed, state) = handle.with(|s| (s.is_disposed(), s.snapshot())).await;
        assert!(disposed);
        assert!(!state.steps[4].is_completed);
    }
}
