//! Request and response types for MCP tools.
//!
//! Required string fields default to empty so that an omitted value reaches
//! the workflow layer and is reported as a missing input rather than a
//! deserialization failure.

use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::*;

// ============================================================
// Request Types
// ============================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct QueueRequest {
    #[serde(default)]
    #[schemars(description = "Absolute path of the project; state lives in <project_root>/artifacts")]
    pub project_root: String,
    #[serde(default)]
    #[schemars(
        description = "Path to the requirements YAML document, absolute or relative to project_root"
    )]
    pub requirements_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RegisterUiComponentRequest {
    #[serde(default)]
    #[schemars(description = "Absolute path of the project")]
    pub project_root: String,
    #[serde(default)]
    #[schemars(description = "Unique component id, e.g. 'UI-LoginForm'")]
    pub id: String,
    #[serde(default)]
    #[schemars(description = "Component file path relative to project_root")]
    pub path: String,
    #[schemars(description = "What the component renders and does")]
    pub description: Option<String>,
    #[serde(default)]
    #[schemars(description = "Id of the requirement this component was designed for")]
    pub related_req_id: String,
    #[schemars(description = "Ids of artifacts this component depends on")]
    pub upstream_ids: Option<Vec<String>>,
    #[schemars(description = "Ids of artifacts this component calls, typically API endpoints")]
    pub downstream_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RegisterApiEndpointRequest {
    #[serde(default)]
    #[schemars(description = "Absolute path of the project")]
    pub project_root: String,
    #[serde(default)]
    #[schemars(description = "Unique endpoint id, e.g. 'API-Login'")]
    pub id: String,
    #[serde(default)]
    #[schemars(description = "Handler file path relative to project_root")]
    pub path: String,
    #[serde(default)]
    #[schemars(description = "HTTP method and route, e.g. 'POST /api/v1/auth/login'")]
    pub signature: String,
    #[schemars(description = "What the endpoint does")]
    pub description: Option<String>,
    #[serde(default)]
    #[schemars(description = "Id of the requirement this endpoint was designed for")]
    pub related_req_id: String,
    #[schemars(description = "Ids of artifacts that call this endpoint")]
    pub upstream_ids: Option<Vec<String>>,
    #[schemars(description = "Ids of backend functions this endpoint calls")]
    pub downstream_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RegisterBackendFunctionRequest {
    #[serde(default)]
    #[schemars(description = "Absolute path of the project")]
    pub project_root: String,
    #[serde(default)]
    #[schemars(description = "Unique function id, e.g. 'FUNC-VerifyPassword'")]
    pub id: String,
    #[serde(default)]
    #[schemars(description = "Source file path relative to project_root")]
    pub path: String,
    #[serde(default)]
    #[schemars(description = "Function signature, e.g. 'def verify_password(plain, hashed) -> bool'")]
    pub signature: String,
    #[schemars(description = "What the function does")]
    pub description: Option<String>,
    #[serde(default)]
    #[schemars(description = "Id of the requirement this function was designed for")]
    pub related_req_id: String,
    #[schemars(description = "Ids of artifacts that call this function")]
    pub upstream_ids: Option<Vec<String>>,
    #[schemars(description = "Database tables the function reads or writes")]
    pub db_tables: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MetadataSectionRequest {
    #[serde(default)]
    #[schemars(description = "Absolute path of the project")]
    pub project_root: String,
    #[serde(default)]
    #[schemars(
        description = "Key of the section in docs/metadata_index.yaml 'sections', e.g. 'auth'"
    )]
    pub section_key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PhaseStatusRequest {
    #[serde(default)]
    #[schemars(description = "Absolute path of the project")]
    pub project_root: String,
    #[schemars(description = "Which queue to summarize: 'design' (default) or 'implementation'")]
    pub phase: Option<String>,
}

impl From<RegisterUiComponentRequest> for RegisterUiInput {
    fn from(req: RegisterUiComponentRequest) -> Self {
        Self {
            project_root: req.project_root,
            id: req.id,
            path: req.path,
            description: req.description,
            related_req_id: req.related_req_id,
            upstream_ids: req.upstream_ids,
            downstream_ids: req.downstream_ids,
        }
    }
}

impl From<RegisterApiEndpointRequest> for RegisterApiInput {
    fn from(req: RegisterApiEndpointRequest) -> Self {
        Self {
            project_root: req.project_root,
            id: req.id,
            path: req.path,
            signature: req.signature,
            description: req.description,
            related_req_id: req.related_req_id,
            upstream_ids: req.upstream_ids,
            downstream_ids: req.downstream_ids,
        }
    }
}

impl From<RegisterBackendFunctionRequest> for RegisterFunctionInput {
    fn from(req: RegisterBackendFunctionRequest) -> Self {
        Self {
            project_root: req.project_root,
            id: req.id,
            path: req.path,
            signature: req.signature,
            description: req.description,
            related_req_id: req.related_req_id,
            upstream_ids: req.upstream_ids,
            db_tables: req.db_tables,
        }
    }
}

// ============================================================
// Response Types
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InitResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: InitOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistrationResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: RegistrationOutcome,
}

/// A registration either lands or is rejected by the project's constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationReply {
    Registered(RegistrationResponse),
    Rejected(String),
}
