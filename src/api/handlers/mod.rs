use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::error::WorkflowError;
use crate::models::*;
use crate::sections::MetadataSection;
use crate::workflow;

// Request bodies are shared with the MCP tools
use crate::mcp::{
    InitResponse, MetadataSectionRequest, QueueRequest, RegisterApiEndpointRequest,
    RegisterBackendFunctionRequest, RegisterUiComponentRequest, RegistrationResponse,
};

type ApiResult<T> = Result<T, (StatusCode, String)>;

// ============================================================
// Error Handling
// ============================================================

/// Map a workflow failure to a status code. Internal faults are logged in
/// full but only a generic message reaches the client.
fn workflow_error(e: WorkflowError) -> (StatusCode, String) {
    match e {
        WorkflowError::MissingInput(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        WorkflowError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
        WorkflowError::Validation(_) => {
            tracing::warn!("Validation error: {}", e);
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        other => {
            tracing::error!("Internal error: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Phase queues
// ============================================================

#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    #[serde(default)]
    pub project_root: String,
}

#[derive(Debug, Deserialize)]
pub struct TreeQuery {
    #[serde(default)]
    pub project_root: String,
    #[serde(default)]
    pub requirements_path: String,
}

pub async fn init_phase(
    Path(phase): Path<Phase>,
    Json(req): Json<QueueRequest>,
) -> ApiResult<Json<InitResponse>> {
    let outcome = workflow::init_phase(phase, &req.project_root, &req.requirements_path)
        .map_err(workflow_error)?;
    Ok(Json(InitResponse {
        message: outcome.message(),
        outcome,
    }))
}

pub async fn reset_phase(
    Path(phase): Path<Phase>,
    Json(req): Json<QueueRequest>,
) -> ApiResult<Json<InitResponse>> {
    if phase != Phase::Design {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("{} cannot be reset", phase.label()),
        ));
    }
    let outcome =
        workflow::reset_design(&req.project_root, &req.requirements_path).map_err(workflow_error)?;
    Ok(Json(InitResponse {
        message: outcome.message(),
        outcome,
    }))
}

pub async fn pop_task(
    Path(phase): Path<Phase>,
    Json(req): Json<QueueRequest>,
) -> ApiResult<Json<PopOutcome>> {
    workflow::pop_task(phase, &req.project_root, &req.requirements_path)
        .map(Json)
        .map_err(workflow_error)
}

pub async fn phase_status(
    Path(phase): Path<Phase>,
    Query(query): Query<ProjectQuery>,
) -> ApiResult<Json<PhaseStatus>> {
    workflow::phase_status(phase, &query.project_root)
        .map(Json)
        .map_err(workflow_error)
}

pub async fn progress_tree(
    Path(phase): Path<Phase>,
    Query(query): Query<TreeQuery>,
) -> ApiResult<String> {
    workflow::progress_tree(phase, &query.project_root, &query.requirements_path)
        .map_err(workflow_error)
}

// ============================================================
// Artifacts
// ============================================================

fn registered(outcome: RegistrationOutcome) -> (StatusCode, Json<RegistrationResponse>) {
    let status = match outcome.upsert {
        UpsertOutcome::Created => StatusCode::CREATED,
        UpsertOutcome::Updated => StatusCode::OK,
    };
    (
        status,
        Json(RegistrationResponse {
            message: outcome.message(),
            outcome,
        }),
    )
}

pub async fn register_ui(
    Json(req): Json<RegisterUiComponentRequest>,
) -> ApiResult<(StatusCode, Json<RegistrationResponse>)> {
    workflow::register_ui(req.into())
        .map(registered)
        .map_err(workflow_error)
}

pub async fn register_api(
    Json(req): Json<RegisterApiEndpointRequest>,
) -> ApiResult<(StatusCode, Json<RegistrationResponse>)> {
    workflow::register_api(req.into())
        .map(registered)
        .map_err(workflow_error)
}

pub async fn register_function(
    Json(req): Json<RegisterBackendFunctionRequest>,
) -> ApiResult<(StatusCode, Json<RegistrationResponse>)> {
    workflow::register_function(req.into())
        .map(registered)
        .map_err(workflow_error)
}

// ============================================================
// Metadata
// ============================================================

pub async fn metadata_section(
    Json(req): Json<MetadataSectionRequest>,
) -> ApiResult<Json<MetadataSection>> {
    workflow::metadata_section(&req.project_root, &req.section_key)
        .map(Json)
        .map_err(workflow_error)
}
