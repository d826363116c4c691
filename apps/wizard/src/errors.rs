use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::dispatch::DispatchError;
use crate::export::ExportError;
use crate::models::plan::UpgradeRequired;
use crate::preview::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    UpgradeRequired(#[from] UpgradeRequired),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<DispatchError> for AppError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::UpgradeRequired(upgrade) => AppError::UpgradeRequired(upgrade),
            DispatchError::EntryNotFound { .. } => AppError::NotFound(e.to_string()),
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl From<RenderError> for AppError {
    fn from(e: RenderError) -> Self {
        match e {
            RenderError::UpgradeRequired(upgrade) => AppError::UpgradeRequired(upgrade),
        }
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::UpgradeRequired(upgrade) => AppError::UpgradeRequired(upgrade),
            ExportError::Unsupported(_) => AppError::NotImplemented(e.to_string()),
            ExportError::Serialize(err) => AppError::Internal(err.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UpgradeRequired(upgrade) => (
                StatusCode::PAYMENT_REQUIRED,
                "UPGRADE_REQUIRED",
                upgrade.to_string(),
            ),
            AppError::NotImplemented(msg) => {
                (StatusCode::NOT_IMPLEMENTED, "NOT_IMPLEMENTED", msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::Section;
    use crate::models::plan::PremiumFeature;
    use crate::preview::templates::TemplateId;
    use uuid::Uuid;

    #[test]
    fn test_upgrade_required_maps_to_402() {
        let err: AppError = DispatchError::UpgradeRequired(UpgradeRequired {
            feature: PremiumFeature::Template(TemplateId::Creative),
        })
        .into();
        assert_eq!(err.into_response().status(), StatusCode::PAYMENT_REQUIRED);
    }

    #[test]
    fn test_unknown_section_maps_to_400() {
        let err: AppError = DispatchError::UnknownSection("hobbies".to_string()).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_entry_maps_to_404() {
        let err: AppError = DispatchError::EntryNotFound {
            section: Section::Skills,
            id: Uuid::new_v4(),
        }
        .into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
