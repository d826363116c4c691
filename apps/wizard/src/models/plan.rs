use std::fmt;

use serde::Serialize;

use crate::export::ExportFormat;
use crate::preview::templates::TemplateId;

/// A capability only available on the premium plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PremiumFeature {
    Template(TemplateId),
    ExportFormat(ExportFormat),
}

impl fmt::Display for PremiumFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PremiumFeature::Template(id) => write!(f, "template '{id}'"),
            PremiumFeature::ExportFormat(format) => write!(f, "export format '{format}'"),
        }
    }
}

/// Signals that the current plan does not include `feature`. Never conflated
/// with a generic failure and never silently downgraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{feature} requires an upgrade to the premium plan")]
pub struct UpgradeRequired {
    pub feature: PremiumFeature,
}
