mod progress;
mod registry;

pub use progress::SourceDocument;

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Result, WorkflowError};
use crate::models::*;
use crate::paths;

/// Directory under the project root that holds every persisted file.
pub const ARTIFACTS_DIR: &str = "artifacts";

/// Location of the metadata index, relative to the project root.
pub const METADATA_INDEX: &str = "docs/metadata_index.yaml";

/// File-backed state of one project.
///
/// Holds only the project root. Each operation loads the files it needs and
/// rewrites in full what it mutates, so no state survives between calls.
/// There is no locking: concurrent callers on the same root race and the last
/// writer wins.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    root: PathBuf,
}

impl ProjectStore {
    pub fn open(root: impl AsRef<Path>) -> Self {
        Self {
            root: paths::absolute(root.as_ref()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a project-relative path; absolute paths are kept.
    pub fn resolve(&self, path: &str) -> PathBuf {
        paths::resolve_in(&self.root, path)
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.root.join(ARTIFACTS_DIR)
    }

    pub fn progress_path(&self, phase: Phase) -> PathBuf {
        self.artifacts_dir().join(phase.progress_file())
    }

    pub fn meta_path(&self, phase: Phase) -> PathBuf {
        self.artifacts_dir().join(phase.meta_file())
    }

    pub fn store_path(&self, category: ArtifactCategory) -> PathBuf {
        self.artifacts_dir().join(category.store_file())
    }

    pub fn metadata_index_path(&self) -> PathBuf {
        self.root.join(METADATA_INDEX)
    }

    /// The project metadata index, or `None` when absent or malformed.
    pub fn load_metadata(&self) -> Option<ProjectMetadata> {
        let metadata = load_yaml(&self.metadata_index_path());
        if metadata.is_none() {
            tracing::warn!(
                "metadata_index.yaml not found or invalid at {}",
                self.metadata_index_path().display()
            );
        }
        metadata
    }
}

// ============================================================
// YAML persistence
// ============================================================

/// Read and parse a YAML file. Missing files yield `None`; unreadable or
/// malformed files are logged and also yield `None`.
pub(crate) fn load_yaml<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_yaml::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Failed to parse YAML at {}: {}", path.display(), e);
            None
        }
    }
}

/// Serialize `value` and overwrite `path`, creating parent directories.
pub(crate) fn save_yaml<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| WorkflowError::io(parent, e))?;
    }
    let content = serde_yaml::to_string(value).map_err(|source| WorkflowError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, content).map_err(|e| WorkflowError::io(path, e))
}

/// Delete `path` if it exists. Failures are logged, never returned.
pub(crate) fn remove_if_exists(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!("Removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to delete file {}: {}", path.display(), e),
    }
}

/// Load the requirements document at `path`.
pub fn load_requirements(path: &Path) -> Result<RequirementDoc> {
    load_yaml(path).ok_or_else(|| {
        WorkflowError::NotFound(format!(
            "Failed to load requirements file at {}",
            path.display()
        ))
    })
}
