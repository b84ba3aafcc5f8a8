use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::commands::{resolve_commands, CommandDescriptor};
use crate::errors::AppError;
use crate::resume::{Document, SectionId};
use crate::state::AppState;
use crate::terminal::{derive_file_names, derive_terminal_config, FileNames, TerminalConfig};

#[derive(Serialize)]
pub struct TerminalResponse {
    pub config: TerminalConfig,
    pub files: FileNames,
}

/// GET /api/v1/resume
pub async fn handle_get_resume(State(state): State<AppState>) -> Json<Document> {
    let document = state.resolver.document_or_minimal().await;
    Json(Document::clone(&document))
}

/// GET /api/v1/resume/sections/:section
pub async fn handle_get_section(
    State(state): State<AppState>,
    Path(section): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = SectionId::parse(&section)
        .ok_or_else(|| AppError::NotFound(format!("unknown section '{section}'")))?;
    let document = state.resolver.document_or_minimal().await;
    Ok(Json(document.section_json(id)?))
}

/// GET /api/v1/commands
///
/// Without a resolvable resume only the always-available commands are listed.
pub async fn handle_get_commands(State(state): State<AppState>) -> Json<Vec<CommandDescriptor>> {
    let document = resolved(&state).await;
    Json(resolve_commands(document.as_deref()))
}

/// GET /api/v1/terminal
pub async fn handle_get_terminal(State(state): State<AppState>) -> Json<TerminalResponse> {
    let document = resolved(&state).await;
    Json(TerminalResponse {
        config: derive_terminal_config(document.as_deref()),
        files: derive_file_names(document.as_deref()),
    })
}

async fn resolved(state: &AppState) -> Option<std::sync::Arc<Document>> {
    match state.resolver.document().await {
        Ok(document) => Some(document),
        Err(e) => {
            warn!("resume unavailable, using static defaults: {e}");
            None
        }
    }
}
