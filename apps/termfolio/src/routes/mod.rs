pub mod health;
pub mod resume;

use axum::{routing::get, Router};
use tower_http::services::ServeDir;

use crate::state::AppState;

/// API routes, with everything else served from the publish directory so the
/// published document and artifact stay reachable at their fixed names.
pub fn build_router(state: AppState) -> Router {
    let published = ServeDir::new(&state.config.publish_dir);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/resume", get(resume::handle_get_resume))
        .route(
            "/api/v1/resume/sections/:section",
            get(resume::handle_get_section),
        )
        .route("/api/v1/commands", get(resume::handle_get_commands))
        .route("/api/v1/terminal", get(resume::handle_get_terminal))
        .fallback_service(published)
        .with_state(state)
}
