use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::dispatch::DispatchReceipt;
use crate::errors::AppError;
use crate::export::{export_document, ExportFormat};
use crate::models::document::{Section, UnknownSection};
use crate::notify::{ToastId, ToastKind};
use crate::preview::{RenderOptions, RenderedDocument};
use crate::session::{SessionHandle, WizardState};
use crate::state::AppState;
use crate::wizard::{StepId, StepStatusView, TransitionOutcome};

/// Step ids arrive as plain integers; anything outside `StepId` cannot name
/// a registered step.
fn registered_step_id(raw: i64) -> Option<StepId> {
    StepId::try_from(raw).ok()
}

fn step_or_not_found(raw: i64) -> Result<StepId, AppError> {
    registered_step_id(raw).ok_or_else(|| AppError::NotFound(format!("Step {raw} not found")))
}

async fn find_session(state: &AppState, id: Uuid) -> Result<SessionHandle, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

#[derive(Serialize)]
pub struct MutationResponse {
    pub receipt: DispatchReceipt,
    pub state: WizardState,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<WizardState>) {
    let (_, handle) = state.sessions.create(&state.config).await;
    let snapshot = handle.with(|s| s.snapshot()).await;
    (StatusCode::CREATED, Json(snapshot))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardState>, AppError> {
    let handle = find_session(&state, id).await?;
    Ok(Json(handle.with(|s| s.snapshot()).await))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

/// PUT /api/v1/sessions/:id/sections/:section
pub async fn handle_update_section(
    State(state): State<AppState>,
    Path((id, section)): Path<(Uuid, String)>,
    Json(payload): Json<Value>,
) -> Result<Json<MutationResponse>, AppError> {
    let handle = find_session(&state, id).await?;
    let response = handle
        .with(|s| {
            s.update_section(&section, payload).map(|receipt| MutationResponse {
                receipt,
                state: s.snapshot(),
            })
        })
        .await?;
    Ok(Json(response))
}

/// DELETE /api/v1/sessions/:id/sections/:section/entries/:entry_id
pub async fn handle_remove_entry(
    State(state): State<AppState>,
    Path((id, section, entry_id)): Path<(Uuid, String, Uuid)>,
) -> Result<Json<MutationResponse>, AppError> {
    let section: Section = section
        .parse()
        .map_err(|e: UnknownSection| AppError::Validation(e.to_string()))?;
    let handle = find_session(&state, id).await?;
    let response = handle
        .with(|s| {
            s.remove_entry(section, entry_id).map(|receipt| MutationResponse {
                receipt,
                state: s.snapshot(),
            })
        })
        .await?;
    Ok(Json(response))
}

#[derive(Deserialize)]
pub struct PlanRequest {
    pub is_premium: bool,
}

/// PUT /api/v1/sessions/:id/plan
pub async fn handle_set_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PlanRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    let handle = find_session(&state, id).await?;
    let response = handle
        .with(|s| {
            s.set_plan(req.is_premium).map(|receipt| MutationResponse {
                receipt,
                state: s.snapshot(),
            })
        })
        .await?;
    Ok(Json(response))
}

#[derive(Deserialize)]
pub struct NavigateRequest {
    pub step_id: i64,
}

#[derive(Serialize)]
pub struct NavigateResponse {
    pub accepted: bool,
    pub outcome: TransitionOutcome,
    pub state: WizardState,
}

/// POST /api/v1/sessions/:id/navigate
/// A refused request is not an error: the outcome is `ignored` and the
/// wizard stays where it was.
pub async fn handle_navigate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<NavigateRequest>,
) -> Result<Json<NavigateResponse>, AppError> {
    let handle = find_session(&state, id).await?;
    let response = handle
        .with(|s| {
            let outcome = registered_step_id(req.step_id)
                .map_or(TransitionOutcome::Ignored, |target| s.go_to(target));
            NavigateResponse {
                accepted: outcome.is_accepted(),
                outcome,
                state: s.snapshot(),
            }
        })
        .await;
    Ok(Json(response))
}

/// GET /api/v1/sessions/:id/steps/:step_id
pub async fn handle_step_status(
    State(state): State<AppState>,
    Path((id, raw_step_id)): Path<(Uuid, i64)>,
) -> Result<Json<StepStatusView>, AppError> {
    let handle = find_session(&state, id).await?;
    let step_id = step_or_not_found(raw_step_id)?;
    handle
        .with(|s| s.step_status(step_id))
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Step {step_id} not found")))
}

/// POST /api/v1/sessions/:id/steps/:step_id/complete
pub async fn handle_complete_step(
    State(state): State<AppState>,
    Path((id, raw_step_id)): Path<(Uuid, i64)>,
) -> Result<Json<WizardState>, AppError> {
    let handle = find_session(&state, id).await?;
    let step_id = step_or_not_found(raw_step_id)?;
    handle
        .with(|s| s.complete_step(step_id).then(|| s.snapshot()))
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Step {step_id} not found")))
}

/// POST /api/v1/sessions/:id/steps/:step_id/save
/// Accepted immediately; the step completes after the configured save latency.
pub async fn handle_save_step(
    State(state): State<AppState>,
    Path((id, raw_step_id)): Path<(Uuid, i64)>,
) -> Result<(StatusCode, Json<WizardState>), AppError> {
    let handle = find_session(&state, id).await?;
    let step_id = step_or_not_found(raw_step_id)?;
    handle
        .with(|s| s.save_step(step_id).then(|| s.snapshot()))
        .await
        .map(|snapshot| (StatusCode::ACCEPTED, Json(snapshot)))
        .ok_or_else(|| AppError::NotFound(format!("Step {step_id} not found")))
}

#[derive(Deserialize)]
pub struct PreviewQuery {
    pub template: Option<String>,
    #[serde(default)]
    pub placeholder: bool,
}

/// GET /api/v1/sessions/:id/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PreviewQuery>,
) -> Result<Json<RenderedDocument>, AppError> {
    let handle = find_session(&state, id).await?;
    let options = RenderOptions {
        show_placeholder: params.placeholder,
        ..Default::default()
    };
    let document = handle
        .with(|s| s.preview(params.template.as_deref(), options))
        .await?;
    Ok(Json(document))
}

#[derive(Deserialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub template: Option<String>,
}

/// POST /api/v1/sessions/:id/export
pub async fn handle_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let handle = find_session(&state, id).await?;
    let (document, is_premium) = handle
        .with(|s| {
            s.preview(req.template.as_deref(), RenderOptions::default())
                .map(|doc| (doc, s.model().is_premium))
        })
        .await?;

    // The session lock is released before the exporter runs.
    let file = export_document(state.exporter.as_ref(), &document, req.format, is_premium).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        file.bytes,
    )
        .into_response())
}

#[derive(Deserialize)]
pub struct ToastRequest {
    #[serde(rename = "type")]
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Serialize)]
pub struct ToastCreated {
    pub id: ToastId,
}

/// POST /api/v1/sessions/:id/toasts
pub async fn handle_add_toast(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ToastRequest>,
) -> Result<(StatusCode, Json<ToastCreated>), AppError> {
    let handle = find_session(&state, id).await?;
    let toast_id = handle.with(|s| s.notify(req.kind, req.message)).await;
    Ok((StatusCode::CREATED, Json(ToastCreated { id: toast_id })))
}

/// DELETE /api/v1/sessions/:id/toasts/:toast_id
pub async fn handle_dismiss_toast(
    State(state): State<AppState>,
    Path((id, toast_id)): Path<(Uuid, ToastId)>,
) -> Result<StatusCode, AppError> {
    let handle = find_session(&state, id).await?;
    if handle.with(|s| s.dismiss(toast_id)).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Toast {toast_id} not found")))
    }
}
