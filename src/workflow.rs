//! The externally visible operations of the two-phase queue.
//!
//! Each function takes the project root explicitly, validates its inputs
//! before touching any file, and delegates to a [`ProjectStore`] opened for
//! that call. Both transports (MCP tools and the HTTP API) go through here.

use std::path::Path;

use crate::error::{require, Result};
use crate::models::*;
use crate::sections::{self, MetadataSection};
use crate::store::{self, ProjectStore};
use crate::tree_render;
use crate::validation;

fn open_source(
    project_root: &str,
    requirements_path: &str,
) -> Result<(ProjectStore, store::SourceDocument)> {
    let project_root = require("project_root", project_root)?;
    let requirements_path = require("requirements_path", requirements_path)?;
    let store = ProjectStore::open(project_root);
    let source = store.source_document(requirements_path);
    Ok((store, source))
}

/// Build the queue for `phase`, or report that it already exists for this document.
pub fn init_phase(phase: Phase, project_root: &str, requirements_path: &str) -> Result<InitOutcome> {
    tracing::debug!(
        "init_phase: phase={}, project_root={}, requirements_path={}",
        phase.as_str(),
        project_root,
        requirements_path
    );
    let (store, source) = open_source(project_root, requirements_path)?;
    store.initialize_phase(phase, &source)
}

/// Discard all design state (queue, meta and artifact stores) and rebuild.
pub fn reset_design(project_root: &str, requirements_path: &str) -> Result<InitOutcome> {
    tracing::debug!(
        "reset_design: project_root={}, requirements_path={}",
        project_root,
        requirements_path
    );
    let (store, source) = open_source(project_root, requirements_path)?;
    store.reset_phase(Phase::Design, &source)
}

/// Hand out the next unprocessed requirement of `phase`.
///
/// Implementation tasks also carry every artifact registered against the
/// requirement during design.
pub fn pop_task(phase: Phase, project_root: &str, requirements_path: &str) -> Result<PopOutcome> {
    tracing::debug!(
        "pop_task: phase={}, project_root={}, requirements_path={}",
        phase.as_str(),
        project_root,
        requirements_path
    );
    let (store, source) = open_source(project_root, requirements_path)?;
    let mut outcome = store.pop_next(phase, &source)?;

    if phase == Phase::Implementation {
        if let PopOutcome::Success(task) = &mut outcome {
            if let Some(id) = task.requirement.id.clone() {
                task.requirement_interfaces = Some(store.collect_by_requirement(&id));
            }
        }
    }

    Ok(outcome)
}

/// Validate, upsert and link an artifact.
///
/// Validation runs before any write; a rejected artifact leaves every file
/// untouched. Linking to an unknown requirement is reported in the outcome
/// but does not fail the registration.
pub fn register_artifact(registration: ArtifactRegistration) -> Result<RegistrationOutcome> {
    let ArtifactRegistration {
        category,
        project_root,
        id,
        related_req_id,
        mut record,
    } = registration;

    let project_root = require("project_root", &project_root)?;
    let id = require("id", &id)?;
    let file_path = require("path", record.path.as_deref().unwrap_or_default())?.to_string();
    let related_req_id = require("related_req_id", &related_req_id)?;
    let signature = match category {
        ArtifactCategory::Ui => None,
        ArtifactCategory::Api | ArtifactCategory::Function => Some(
            require("signature", record.signature.as_deref().unwrap_or_default())?.to_string(),
        ),
    };

    tracing::debug!(
        "register_artifact: category={}, id={}, path={}, related_req_id={}",
        category.as_str(),
        id,
        file_path,
        related_req_id
    );

    let store = ProjectStore::open(project_root);
    let metadata = store.load_metadata();
    validate(category, store.root(), metadata.as_ref(), &file_path, signature.as_deref())?;

    record.path = Some(file_path);
    record.signature = signature;
    record.related_req_id = Some(RelatedReq::One(related_req_id.to_string()));

    let upsert = store.upsert_artifact(category, id, record, category.mergeable_fields())?;
    let link = store.link_artifact(related_req_id, category, id)?;

    Ok(RegistrationOutcome {
        category,
        id: id.to_string(),
        related_req_id: related_req_id.to_string(),
        upsert,
        link,
    })
}

fn validate(
    category: ArtifactCategory,
    project_root: &Path,
    metadata: Option<&ProjectMetadata>,
    file_path: &str,
    signature: Option<&str>,
) -> Result<()> {
    match category {
        ArtifactCategory::Ui => {
            validation::validate_ui_registration(project_root, metadata, file_path)?
        }
        ArtifactCategory::Api => {
            validation::validate_api_registration(project_root, metadata, file_path, signature)?
        }
        ArtifactCategory::Function => {
            validation::validate_function_registration(project_root, metadata, file_path)?
        }
    }
    Ok(())
}

pub fn register_ui(input: RegisterUiInput) -> Result<RegistrationOutcome> {
    register_artifact(input.into())
}

pub fn register_api(input: RegisterApiInput) -> Result<RegistrationOutcome> {
    register_artifact(input.into())
}

pub fn register_function(input: RegisterFunctionInput) -> Result<RegistrationOutcome> {
    register_artifact(input.into())
}

/// Slice the companion metadata document for `section_key`.
pub fn metadata_section(project_root: &str, section_key: &str) -> Result<MetadataSection> {
    let project_root = require("project_root", project_root)?;
    let section_key = require("section_key", section_key)?;
    tracing::debug!(
        "metadata_section: project_root={}, section_key={}",
        project_root,
        section_key
    );
    sections::load_section(&ProjectStore::open(project_root), section_key)
}

/// Read-only summary of a phase queue.
pub fn phase_status(phase: Phase, project_root: &str) -> Result<PhaseStatus> {
    let project_root = require("project_root", project_root)?;
    ProjectStore::open(project_root).phase_status(phase)
}

/// Render the requirements document annotated with `phase` progress.
///
/// A phase that was never initialized renders every node as not queued.
pub fn progress_tree(phase: Phase, project_root: &str, requirements_path: &str) -> Result<String> {
    let (store, source) = open_source(project_root, requirements_path)?;
    let doc = store::load_requirements(&source.absolute)?;
    let queue = store.load_progress(phase).unwrap_or_default();
    Ok(tree_render::render_progress_tree(&doc, &queue))
}
