use std::path::{Path, PathBuf};

use chrono::Utc;

use super::{load_requirements, load_yaml, remove_if_exists, save_yaml, ProjectStore};
use crate::error::{Result, WorkflowError};
use crate::models::*;
use crate::{images, tree};

/// A requirements document as the caller named it and as resolved on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub given: String,
    pub absolute: PathBuf,
}

impl SourceDocument {
    /// Directory that relative image references are resolved against.
    pub fn base_dir(&self) -> &Path {
        self.absolute.parent().unwrap_or_else(|| Path::new("."))
    }
}

impl ProjectStore {
    pub fn source_document(&self, requirements_path: &str) -> SourceDocument {
        SourceDocument {
            given: requirements_path.to_string(),
            absolute: self.resolve(requirements_path),
        }
    }

    // ============================================================
    // Queue persistence
    // ============================================================

    /// The persisted queue for `phase`, or `None` if it is missing or malformed.
    pub fn load_progress(&self, phase: Phase) -> Option<Vec<ProgressRecord>> {
        load_yaml(&self.progress_path(phase))
    }

    pub fn save_progress(&self, phase: Phase, queue: &[ProgressRecord]) -> Result<()> {
        save_yaml(&self.progress_path(phase), queue)
    }

    pub fn load_meta(&self, phase: Phase) -> Option<PhaseMeta> {
        load_yaml(&self.meta_path(phase))
    }

    /// Whether the existing queue for `phase` was built from `source`.
    fn built_from(&self, phase: Phase, source: &SourceDocument) -> bool {
        let Some(meta) = self.load_meta(phase) else {
            return false;
        };
        let stored = match meta.source_document_absolute_path {
            Some(absolute) => PathBuf::from(absolute),
            None => self.resolve(&meta.source_document_path),
        };
        stored == source.absolute
    }

    // ============================================================
    // Initialization
    // ============================================================

    /// Build the queue for `phase` unless one already exists for the same
    /// source document. A queue built from a different document is discarded
    /// together with the rest of the phase's state.
    ///
    /// Only the resolved path is compared: edits to the same file are not
    /// detected. A queue file that no longer parses counts as stale.
    pub fn initialize_phase(&self, phase: Phase, source: &SourceDocument) -> Result<InitOutcome> {
        let usable = self.load_progress(phase).is_some();
        if usable && self.built_from(phase, source) {
            return Ok(InitOutcome::AlreadyInitialized {
                phase,
                source_document: source.given.clone(),
            });
        }

        let doc = load_requirements(&source.absolute)?;
        if self.progress_path(phase).exists() {
            if usable {
                tracing::info!(
                    "{} queue was built from a different requirements file; rebuilding",
                    phase.label()
                );
            } else {
                tracing::warn!("{} queue is unreadable; rebuilding", phase.label());
            }
            self.discard_phase(phase);
        }
        self.build_queue(phase, &doc, source, false)
    }

    /// Discard all state of `phase` and rebuild its queue from `source`.
    pub fn reset_phase(&self, phase: Phase, source: &SourceDocument) -> Result<InitOutcome> {
        let doc = load_requirements(&source.absolute)?;
        self.discard_phase(phase);
        self.build_queue(phase, &doc, source, true)
    }

    /// Remove the queue and meta record of `phase`, and the artifact stores
    /// when the phase owns them.
    pub fn discard_phase(&self, phase: Phase) {
        remove_if_exists(&self.progress_path(phase));
        remove_if_exists(&self.meta_path(phase));
        if phase.owns_artifact_stores() {
            for category in ArtifactCategory::ALL {
                remove_if_exists(&self.store_path(category));
            }
        }
    }

    fn build_queue(
        &self,
        phase: Phase,
        doc: &RequirementDoc,
        source: &SourceDocument,
        reset: bool,
    ) -> Result<InitOutcome> {
        let queue = tree::flatten(doc, phase.traversal());
        self.save_progress(phase, &queue)?;
        save_yaml(
            &self.meta_path(phase),
            &PhaseMeta {
                source_document_path: source.given.clone(),
                source_document_absolute_path: Some(source.absolute.display().to_string()),
                created_at: Utc::now(),
                reset,
            },
        )?;

        tracing::info!(
            "{} queue built with {} items from {}",
            phase.label(),
            queue.len(),
            source.absolute.display()
        );

        Ok(InitOutcome::Initialized {
            phase,
            queue_length: queue.len(),
            source_document: source.given.clone(),
            reset,
        })
    }

    // ============================================================
    // Consumption
    // ============================================================

    /// Mark the first unprocessed record processed and return its requirement.
    ///
    /// Returns [`PopOutcome::Completed`] without writing anything once every
    /// record is processed.
    pub fn pop_next(&self, phase: Phase, source: &SourceDocument) -> Result<PopOutcome> {
        let progress_path = self.progress_path(phase);
        let mut queue = self.load_progress(phase).ok_or_else(|| {
            WorkflowError::NotFound(format!(
                "Progress file not found at {}. Please run the init tool first.",
                progress_path.display()
            ))
        })?;

        let Some(index) = queue.iter().position(|record| !record.is_processed()) else {
            return Ok(PopOutcome::completed());
        };
        let id = queue[index].id.clone();
        tracing::debug!("Processing {} task ID: {}", phase.as_str(), id);

        let doc = load_requirements(&source.absolute)?;
        let node = tree::find_by_id(&doc, &id).ok_or_else(|| {
            WorkflowError::NotFound(format!(
                "Requirement ID {} found in queue but not in source document.",
                id
            ))
        })?;

        queue[index].mark_processed();
        self.save_progress(phase, &queue)?;

        let images = images::extract_images(source.base_dir(), node.description.as_deref());

        // Links are only ever recorded in the design queue.
        let design_queue = match phase {
            Phase::Design => None,
            Phase::Implementation => self.load_progress(Phase::Design),
        };
        let link_source = design_queue.as_deref().unwrap_or(&queue);

        let parent = tree::find_parent(&doc, &id).map(|parent| {
            let links = parent
                .id
                .as_deref()
                .and_then(|parent_id| link_source.iter().find(|r| r.id == parent_id))
                .map(|record| record.artifacts.clone())
                .unwrap_or_default();
            ParentInfo {
                name: parent.name.clone(),
                description: parent.description.clone(),
                interfaces: self.collect_by_ids(&links),
            }
        });

        Ok(PopOutcome::Success(Box::new(TaskPayload {
            progress: format!("{}/{}", index + 1, queue.len()),
            requirement: node.with_direct_children(),
            parent,
            images,
            requirement_interfaces: None,
        })))
    }

    // ============================================================
    // Linkage
    // ============================================================

    /// Record `artifact_id` against requirement `req_id` in the design queue.
    ///
    /// An unknown requirement or a missing queue is logged and reported, not
    /// treated as a failure.
    pub fn link_artifact(
        &self,
        req_id: &str,
        category: ArtifactCategory,
        artifact_id: &str,
    ) -> Result<LinkOutcome> {
        let Some(mut queue) = self.load_progress(Phase::Design) else {
            tracing::warn!(
                "Could not link {} to {}: design progress file not found",
                artifact_id,
                req_id
            );
            return Ok(LinkOutcome::NoQueue);
        };

        let Some(record) = queue.iter_mut().find(|r| r.id == req_id) else {
            tracing::warn!(
                "Could not link artifact {} to req {}: req not found in progress",
                artifact_id,
                req_id
            );
            return Ok(LinkOutcome::UnknownRequirement);
        };

        if !record.artifacts.link(category, artifact_id) {
            return Ok(LinkOutcome::AlreadyLinked);
        }

        tracing::debug!(
            "Linked {} to {} as {}",
            artifact_id,
            req_id,
            category.as_str()
        );
        self.save_progress(Phase::Design, &queue)?;
        Ok(LinkOutcome::Linked)
    }

    pub fn phase_status(&self, phase: Phase) -> Result<PhaseStatus> {
        let queue = self.load_progress(phase).ok_or_else(|| {
            WorkflowError::NotFound(format!(
                "{} has not been initialized for {}",
                phase.label(),
                self.root().display()
            ))
        })?;
        let meta = self.load_meta(phase);
        Ok(PhaseStatus::from_queue(phase, &queue, meta.as_ref()))
    }
}
