use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{InterfaceRefs, Phase, RequirementInterfaces, RequirementView};

/// The next requirement handed to the consumer of a phase queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskPayload {
    /// `position/total`, 1-based.
    pub progress: String,
    /// The requirement with its direct children only.
    pub requirement: RequirementView,
    /// Present when the requirement has a parent in the tree.
    pub parent: Option<ParentInfo>,
    /// Images referenced by the description: relative path to base64 bytes.
    #[serde(default)]
    pub images: IndexMap<String, String>,
    /// Artifacts registered against this requirement (implementation phase only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement_interfaces: Option<RequirementInterfaces>,
}

/// Context about the parent of a popped requirement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParentInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Interfaces already linked to the parent during design.
    pub interfaces: InterfaceRefs,
}

/// Result of popping a phase queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PopOutcome {
    Success(Box<TaskPayload>),
    Completed { message: String },
}

impl PopOutcome {
    pub fn completed() -> Self {
        Self::Completed {
            message: "All requirements in this phase are completed.".to_string(),
        }
    }

    pub fn task(&self) -> Option<&TaskPayload> {
        match self {
            Self::Success(payload) => Some(payload),
            Self::Completed { .. } => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Result of initializing or resetting a phase queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InitOutcome {
    Initialized {
        phase: Phase,
        queue_length: usize,
        source_document: String,
        reset: bool,
    },
    /// The queue already exists for the same source document; nothing changed.
    AlreadyInitialized {
        phase: Phase,
        source_document: String,
    },
}

impl InitOutcome {
    pub fn message(&self) -> String {
        match self {
            Self::Initialized {
                phase,
                queue_length,
                source_document,
                reset,
            } => format!(
                "{} {} queue with {} items for requirements file: {}",
                if *reset { "Reset" } else { "Initialized" },
                phase.label(),
                queue_length,
                source_document
            ),
            Self::AlreadyInitialized {
                phase,
                source_document,
            } => format!(
                "{} is already initialized for requirements file: {}",
                phase.label(),
                source_document
            ),
        }
    }
}
