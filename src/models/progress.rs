use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{requirement::scalar_id, ArtifactCategory};
use crate::tree::TraversalOrder;

/// One of the two traversals over the requirements tree.
///
/// - `Design`: top-down (pre-order), parents before children
/// - `Implementation`: bottom-up (post-order), leaves before their parents
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Design,
    Implementation,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Design => "design",
            Self::Implementation => "implementation",
        }
    }

    /// Human label used in tool messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Design => "Phase 1",
            Self::Implementation => "Phase 2",
        }
    }

    pub fn traversal(&self) -> TraversalOrder {
        match self {
            Self::Design => TraversalOrder::PreOrder,
            Self::Implementation => TraversalOrder::PostOrder,
        }
    }

    pub fn progress_file(&self) -> &'static str {
        match self {
            Self::Design => "phase_one_progress.yaml",
            Self::Implementation => "phase_two_progress.yaml",
        }
    }

    pub fn meta_file(&self) -> &'static str {
        match self {
            Self::Design => "phase_one_meta.yaml",
            Self::Implementation => "phase_two_meta.yaml",
        }
    }

    /// The artifact stores are produced during design; only that phase may
    /// discard them.
    pub fn owns_artifact_stores(&self) -> bool {
        matches!(self, Self::Design)
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "design" | "one" | "1" => Ok(Self::Design),
            "implementation" | "two" | "2" => Ok(Self::Implementation),
            other => Err(format!(
                "Invalid phase '{}'. Must be: design or implementation",
                other
            )),
        }
    }
}

/// Processing status of a queued requirement. Only ever moves forward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Unprocessed,
    Processed,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unprocessed => "unprocessed",
            Self::Processed => "processed",
        }
    }
}

/// One queue entry: a requirement id, its status and the artifacts linked to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressRecord {
    #[serde(deserialize_with = "required_id")]
    pub id: String,
    pub status: ProgressStatus,
    #[serde(default, skip_serializing_if = "LinkedArtifacts::is_empty")]
    pub artifacts: LinkedArtifacts,
}

impl ProgressRecord {
    pub fn unprocessed(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: ProgressStatus::Unprocessed,
            artifacts: LinkedArtifacts::default(),
        }
    }

    pub fn is_processed(&self) -> bool {
        self.status == ProgressStatus::Processed
    }

    pub fn mark_processed(&mut self) {
        self.status = ProgressStatus::Processed;
    }
}

fn required_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    scalar_id(deserializer)?.ok_or_else(|| serde::de::Error::custom("progress record without id"))
}

/// Artifact ids linked to a requirement, one duplicate-free list per category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkedArtifacts {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ui_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub api_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub func_ids: Vec<String>,
}

impl LinkedArtifacts {
    pub fn is_empty(&self) -> bool {
        self.ui_ids.is_empty() && self.api_ids.is_empty() && self.func_ids.is_empty()
    }

    pub fn ids(&self, category: ArtifactCategory) -> &[String] {
        match category {
            ArtifactCategory::Ui => &self.ui_ids,
            ArtifactCategory::Api => &self.api_ids,
            ArtifactCategory::Function => &self.func_ids,
        }
    }

    fn ids_mut(&mut self, category: ArtifactCategory) -> &mut Vec<String> {
        match category {
            ArtifactCategory::Ui => &mut self.ui_ids,
            ArtifactCategory::Api => &mut self.api_ids,
            ArtifactCategory::Function => &mut self.func_ids,
        }
    }

    /// Append `artifact_id` unless already present. Returns whether it was added.
    pub fn link(&mut self, category: ArtifactCategory, artifact_id: &str) -> bool {
        let ids = self.ids_mut(category);
        if ids.iter().any(|existing| existing == artifact_id) {
            return false;
        }
        ids.push(artifact_id.to_string());
        true
    }
}

/// What happened when an artifact was linked into the design queue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LinkOutcome {
    Linked,
    AlreadyLinked,
    /// The requirement id is not in the queue; nothing was written.
    UnknownRequirement,
    /// The design queue has not been initialized; nothing was written.
    NoQueue,
}

/// Records which requirements document a phase queue was built from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseMeta {
    /// The path exactly as the caller supplied it.
    #[serde(alias = "requirements_path")]
    pub source_document_path: String,
    #[serde(
        default,
        alias = "requirements_abs_path",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_document_absolute_path: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reset: bool,
}

/// Read-only summary of a phase queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseStatus {
    pub phase: Phase,
    pub total: usize,
    pub processed: usize,
    pub remaining: usize,
    /// Id of the record the next pop will return.
    pub next_id: Option<String>,
    pub source_document: Option<String>,
}

impl PhaseStatus {
    pub fn from_queue(phase: Phase, queue: &[ProgressRecord], meta: Option<&PhaseMeta>) -> Self {
        let processed = queue.iter().filter(|r| r.is_processed()).count();
        Self {
            phase,
            total: queue.len(),
            processed,
            remaining: queue.len() - processed,
            next_id: queue
                .iter()
                .find(|r| !r.is_processed())
                .map(|r| r.id.clone()),
            source_document: meta.map(|m| m.source_document_path.clone()),
        }
    }
}
