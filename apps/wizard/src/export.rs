//! Document export: the pluggable "render document" capability.
//!
//! Real PDF/DOCX backends live outside this crate and plug in through
//! `DocumentExporter`. The built-in `TextExporter` covers plain text and JSON.
//! Plan gating happens here, before any exporter runs.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::models::plan::{PremiumFeature, UpgradeRequired};
use crate::preview::RenderedDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Docx,
    Txt,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Txt => "txt",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Txt => "text/plain; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn is_premium(&self) -> bool {
        matches!(self, ExportFormat::Docx)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    UpgradeRequired(#[from] UpgradeRequired),

    #[error("export format '{0}' is not supported by this exporter")]
    Unsupported(ExportFormat),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A finished export, ready to hand to the browser as a download.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Bytes,
}

/// Turns a rendered document into file bytes. Swap implementations without
/// touching callers.
#[async_trait]
pub trait DocumentExporter: Send + Sync {
    async fn export(
        &self,
        document: &RenderedDocument,
        format: ExportFormat,
    ) -> Result<Bytes, ExportError>;
}

/// Built-in exporter for `txt` and `json`.
pub struct TextExporter;

#[async_trait]
impl DocumentExporter for TextExporter {
    async fn export(
        &self,
        document: &RenderedDocument,
        format: ExportFormat,
    ) -> Result<Bytes, ExportError> {
        match format {
            ExportFormat::Txt => Ok(Bytes::from(document.to_plain_text())),
            ExportFormat::Json => Ok(Bytes::from(serde_json::to_vec_pretty(document)?)),
            ExportFormat::Pdf | ExportFormat::Docx => Err(ExportError::Unsupported(format)),
        }
    }
}

/// Checks the plan, runs the exporter, and names the file after the résumé owner.
pub async fn export_document(
    exporter: &dyn DocumentExporter,
    document: &RenderedDocument,
    format: ExportFormat,
    is_premium: bool,
) -> Result<ExportedFile, ExportError> {
    if format.is_premium() && !is_premium {
        return Err(UpgradeRequired {
            feature: PremiumFeature::ExportFormat(format),
        }
        .into());
    }

    let bytes = exporter.export(document, format).await?;
    let file_name = format!("{}.{}", file_stem(document), format.extension());
    info!("Exported {file_name} ({} bytes)", bytes.len());

    Ok(ExportedFile {
        file_name,
        content_type: format.content_type(),
        bytes,
    })
}

fn file_stem(document: &RenderedDocument) -> String {
    let name = document
        .header
        .as_ref()
        .filter(|h| !h.placeholder)
        .map(|h| h.name.as_str())
        .unwrap_or("");
    let slug = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "resume".to_string()
    } else {
        format!("{slug}-resume")
    }
}
