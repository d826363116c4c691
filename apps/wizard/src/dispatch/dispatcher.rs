use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::dispatch::mutation::{reduce, DispatchError, Mutation, SectionUpdate};
use crate::models::document::{DocumentModel, Section};

/// Result of an applied mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchReceipt {
    /// Monotonic model revision after the mutation.
    pub revision: u64,
    /// Section whose owning step must be re-evaluated.
    pub section: Section,
}

/// Sole owner of a session's `DocumentModel`. Every edit goes through
/// `dispatch`, one at a time.
#[derive(Debug, Default)]
pub struct MutationDispatcher {
    model: DocumentModel,
    revision: u64,
}

impl MutationDispatcher {
    pub fn new(model: DocumentModel) -> Self {
        Self { model, revision: 0 }
    }

    pub fn model(&self) -> &DocumentModel {
        &self.model
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Applies `mutation`. On error the model and revision are unchanged.
    pub fn dispatch(&mut self, mutation: Mutation) -> Result<DispatchReceipt, DispatchError> {
        let section = mutation.section();
        match reduce(&self.model, mutation) {
            Ok(next) => {
                self.model = next;
                self.revision += 1;
                debug!("Applied mutation to '{section}' (revision {})", self.revision);
                Ok(DispatchReceipt {
                    revision: self.revision,
                    section,
                })
            }
            Err(e) => {
                warn!("Rejected mutation to '{section}': {e}");
                Err(e)
            }
        }
    }

    /// Replaces one section from an untyped payload.
    pub fn update_section(
        &mut self,
        section: &str,
        payload: Value,
    ) -> Result<DispatchReceipt, DispatchError> {
        let update = SectionUpdate::from_parts(section, payload).inspect_err(|e| {
            warn!("Rejected update to '{section}': {e}");
        })?;
        self.dispatch(Mutation::UpdateSection(update))
    }

    pub fn remove_entry(
        &mut self,
        section: Section,
        id: Uuid,
    ) -> Result<DispatchReceipt, DispatchError> {
        self.dispatch(Mutation::RemoveEntry { section, id })
    }

    pub fn set_plan(&mut self, is_premium: bool) -> Result<DispatchReceipt, DispatchError> {
        self.dispatch(Mutation::SetPlan { is_premium })
    }
}
