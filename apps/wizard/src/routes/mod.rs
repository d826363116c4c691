pub mod health;
pub mod sessions;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Session lifecycle
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(sessions::handle_get_session).delete(sessions::handle_delete_session),
        )
        // Document mutations
        .route(
            "/api/v1/sessions/:id/sections/:section",
            put(sessions::handle_update_section),
        )
        .route(
            "/api/v1/sessions/:id/sections/:section/entries/:entry_id",
            delete(sessions::handle_remove_entry),
        )
        .route("/api/v1/sessions/:id/plan", put(sessions::handle_set_plan))
        // Wizard navigation
        .route(
            "/api/v1/sessions/:id/navigate",
            post(sessions::handle_navigate),
        )
        .route(
            "/api/v1/sessions/:id/steps/:step_id",
            get(sessions::handle_step_status),
        )
        .route(
            "/api/v1/sessions/:id/steps/:step_id/complete",
            post(sessions::handle_complete_step),
        )
        .route(
            "/api/v1/sessions/:id/steps/:step_id/save",
            post(sessions::handle_save_step),
        )
        // Preview & export
        .route("/api/v1/sessions/:id/preview", get(sessions::handle_preview))
        .route("/api/v1/sessions/:id/export", post(sessions::handle_export))
        // Notifications
        .route("/api/v1/sessions/:id/toasts", post(sessions::handle_add_toast))
        .route(
            "/api/v1/sessions/:id/toasts/:toast_id",
            delete(sessions::handle_dismiss_toast),
        )
        .with_state(state)
}
