//! MCP server exposing the two-phase requirement queue as tools.

mod types;

use std::str::FromStr;

pub use types::*;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Serialize;

use crate::error::WorkflowError;
use crate::models::*;
use crate::sections::MetadataSection;
use crate::workflow;

#[derive(Clone)]
pub struct McpServer {
    tool_router: ToolRouter<Self>,
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a workflow failure onto the protocol error it is reported as.
fn to_mcp_error(err: WorkflowError) -> McpError {
    match err {
        WorkflowError::MissingInput(_) | WorkflowError::NotFound(_) => {
            McpError::invalid_params(err.to_string(), None)
        }
        other => {
            tracing::error!("Tool failed: {}", other);
            McpError::internal_error(other.to_string(), None)
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn registration_result(reply: RegistrationReply) -> Result<CallToolResult, McpError> {
    match reply {
        RegistrationReply::Registered(response) => json_result(&response),
        RegistrationReply::Rejected(message) => {
            Ok(CallToolResult::error(vec![Content::text(message)]))
        }
    }
}

impl McpServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    // ============================================================
    // Tool logic, shared by the tools below and by tests
    // ============================================================

    pub fn init_queue(&self, phase: Phase, req: QueueRequest) -> Result<InitResponse, McpError> {
        let outcome = workflow::init_phase(phase, &req.project_root, &req.requirements_path)
            .map_err(to_mcp_error)?;
        Ok(InitResponse {
            message: outcome.message(),
            outcome,
        })
    }

    pub fn reset_queue(&self, req: QueueRequest) -> Result<InitResponse, McpError> {
        let outcome = workflow::reset_design(&req.project_root, &req.requirements_path)
            .map_err(to_mcp_error)?;
        Ok(InitResponse {
            message: outcome.message(),
            outcome,
        })
    }

    pub fn pop_queue(&self, phase: Phase, req: QueueRequest) -> Result<PopOutcome, McpError> {
        workflow::pop_task(phase, &req.project_root, &req.requirements_path).map_err(to_mcp_error)
    }

    /// Register an artifact. Constraint violations come back as
    /// [`RegistrationReply::Rejected`], not as protocol errors.
    pub fn register(
        &self,
        registration: ArtifactRegistration,
    ) -> Result<RegistrationReply, McpError> {
        match workflow::register_artifact(registration) {
            Ok(outcome) => Ok(RegistrationReply::Registered(RegistrationResponse {
                message: outcome.message(),
                outcome,
            })),
            Err(err @ WorkflowError::Validation(_)) => {
                tracing::warn!("Registration rejected: {}", err);
                Ok(RegistrationReply::Rejected(err.to_string()))
            }
            Err(err) => Err(to_mcp_error(err)),
        }
    }

    pub fn metadata_section(
        &self,
        req: MetadataSectionRequest,
    ) -> Result<MetadataSection, McpError> {
        workflow::metadata_section(&req.project_root, &req.section_key).map_err(to_mcp_error)
    }

    pub fn phase_status(&self, req: PhaseStatusRequest) -> Result<PhaseStatus, McpError> {
        let phase = match req.phase.as_deref() {
            Some(phase) => {
                Phase::from_str(phase).map_err(|e| McpError::invalid_params(e, None))?
            }
            None => Phase::Design,
        };
        workflow::phase_status(phase, &req.project_root).map_err(to_mcp_error)
    }
}

#[tool_router]
impl McpServer {
    // ============================================================
    // Phase 1 - top-down design
    // ============================================================

    #[tool(
        description = "Initialize the Phase 1 (design) queue from a requirements YAML document. Requirements are queued top-down: every parent before its children. Idempotent: if the queue already exists for the same document, nothing changes. If it was built from a different document, the old queue and all registered artifacts are discarded and rebuilt. Call this FIRST, before pop_req_to_design."
    )]
    async fn init_top_down_queue(
        &self,
        params: Parameters<QueueRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&self.init_queue(Phase::Design, params.0)?)
    }

    #[tool(
        description = "Discard all Phase 1 state (queue, meta record and the UI, API and function registries) and rebuild the design queue from the given requirements document. Use only to restart design from scratch."
    )]
    async fn reset_top_down_queue(
        &self,
        params: Parameters<QueueRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&self.reset_queue(params.0)?)
    }

    #[tool(
        description = "Get the next requirement to design and mark it processed. Returns the requirement with its direct children (no grandchildren), progress as 'position/total', base64 images referenced in its description, and the parent's name, description and already-registered interfaces. Returns status 'completed' once every requirement has been handed out. Register the UI components, API endpoints and backend functions you design for it before popping again."
    )]
    async fn pop_req_to_design(
        &self,
        params: Parameters<QueueRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&self.pop_queue(Phase::Design, params.0)?)
    }

    #[tool(
        description = "Register (or update) a UI component designed for a requirement. Re-registering the same id merges upstream_ids and downstream_ids and keeps existing values for empty fields. The path is checked against the frontend directories and allowed extensions in docs/metadata_index.yaml; a violation returns an error result starting with 'ValidationError:' and nothing is written. Side effect: links the id to the requirement's Phase 1 record."
    )]
    async fn register_ui_component(
        &self,
        params: Parameters<RegisterUiComponentRequest>,
    ) -> Result<CallToolResult, McpError> {
        let input: RegisterUiInput = params.0.into();
        registration_result(self.register(input.into())?)
    }

    #[tool(
        description = "Register (or update) an API endpoint designed for a requirement. The signature is 'METHOD /route'; when api_prefix is configured the route must start with it. The path must be under the backend endpoints directory with an allowed backend extension. Violations return an error result starting with 'ValidationError:'. Side effect: links the id to the requirement's Phase 1 record."
    )]
    async fn register_api_endpoint(
        &self,
        params: Parameters<RegisterApiEndpointRequest>,
    ) -> Result<CallToolResult, McpError> {
        let input: RegisterApiInput = params.0.into();
        registration_result(self.register(input.into())?)
    }

    #[tool(
        description = "Register (or update) a backend function designed for a requirement. Re-registering the same id merges upstream_ids and db_tables. The path must be under the backend root with an allowed backend extension; violations return an error result starting with 'ValidationError:'. Side effect: links the id to the requirement's Phase 1 record."
    )]
    async fn register_backend_function(
        &self,
        params: Parameters<RegisterBackendFunctionRequest>,
    ) -> Result<CallToolResult, McpError> {
        let input: RegisterFunctionInput = params.0.into();
        registration_result(self.register(input.into())?)
    }

    // ============================================================
    // Phase 2 - bottom-up implementation
    // ============================================================

    #[tool(
        description = "Initialize the Phase 2 (implementation) queue from the same requirements document. Requirements are queued bottom-up: leaves before the parents that depend on them. Idempotent for the same document. Never touches the Phase 1 queue or the artifact registries."
    )]
    async fn init_bottom_up_queue(
        &self,
        params: Parameters<QueueRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&self.init_queue(Phase::Implementation, params.0)?)
    }

    #[tool(
        description = "Get the next requirement to implement and mark it processed. Same payload as pop_req_to_design plus requirement_interfaces: the full UI, API and function records registered for this requirement during design. Returns status 'completed' when done."
    )]
    async fn pop_req_to_implement(
        &self,
        params: Parameters<QueueRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&self.pop_queue(Phase::Implementation, params.0)?)
    }

    // ============================================================
    // Project context
    // ============================================================

    #[tool(
        description = "Fetch one section of the project metadata document. section_key is looked up in the 'sections' map of docs/metadata_index.yaml to find the heading title; returns the text from that '## ' heading up to the next one, with 1-based start_line and exclusive end_line."
    )]
    async fn get_metadata_section(
        &self,
        params: Parameters<MetadataSectionRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&self.metadata_section(params.0)?)
    }

    #[tool(
        description = "Summarize a phase queue without changing it: total, processed and remaining counts, the id the next pop will return, and the source document."
    )]
    async fn get_phase_status(
        &self,
        params: Parameters<PhaseStatusRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&self.phase_status(params.0)?)
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "architect-manager".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            instructions: Some(
                r#"Architect Manager walks a hierarchical requirements document in two resumable passes.
All state is kept under <project_root>/artifacts, so work can stop and resume at any time.

PHASE 1 - DESIGN (top-down):
1. Call init_top_down_queue with project_root and requirements_path
2. Call pop_req_to_design to receive the next requirement (parents come before children)
3. Design the interfaces it needs and register each one:
   - register_ui_component for frontend components
   - register_api_endpoint for HTTP endpoints ('METHOD /route')
   - register_backend_function for services and helpers
   Always pass related_req_id = the popped requirement's id.
4. Repeat from step 2 until the status is 'completed'

PHASE 2 - IMPLEMENTATION (bottom-up):
1. Call init_bottom_up_queue with the same requirements_path
2. Call pop_req_to_implement; leaves come before their parents, and
   requirement_interfaces lists everything designed for the requirement
3. Implement those interfaces, then pop again until 'completed'

PROJECT CONTEXT:
- get_metadata_section returns one '## ' section of the project metadata document
  (keys are listed under 'sections' in docs/metadata_index.yaml)
- get_phase_status shows how far a phase has progressed

VALIDATION:
Registrations are checked against docs/metadata_index.yaml (directories, extensions, api_prefix).
A result starting with 'ValidationError:' means nothing was saved: fix the path or signature and retry.
Without a metadata index every registration is accepted.

IMPORTANT:
- A pop marks the requirement processed immediately; it is never handed out again
- reset_top_down_queue deletes every registered artifact"#
                    .into(),
            ),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server() -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = McpServer::new();
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
