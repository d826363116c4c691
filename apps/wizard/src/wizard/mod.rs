// Wizard core: step registry, completion evaluator, and the controller that
// gates navigation between steps.

pub mod completion;
pub mod controller;
pub mod steps;

pub use controller::{
    Progress, StepStatusView, TransitionOutcome, TransitionPhase, WizardController,
    DEFAULT_TRANSITION_FADE,
};
pub use steps::{Step, StepId, StepRegistry};
