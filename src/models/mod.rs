//! Domain models for Architect Manager.
//!
//! # Core Concepts
//!
//! ## Read-only input
//!
//! - [`RequirementDoc`]: the hierarchical requirements document, either a single
//!   [`RequirementNode`] or a sequence of them.
//! - [`ProjectMetadata`]: project layout and constraints used for validation.
//!
//! ## Persisted state
//!
//! These live under `<project_root>/artifacts/` and are rewritten in full on
//! every mutation:
//!
//! - [`ProgressRecord`]: one entry of a phase queue, with its status and the
//!   artifacts linked to it.
//! - [`PhaseMeta`]: which requirements document a phase queue was built from.
//! - [`ArtifactRecord`]: a registered UI component, API endpoint or backend
//!   function, keyed by id within its [`ArtifactCategory`] store.

mod artifact;
mod metadata;
mod progress;
mod requirement;
mod task;

pub use artifact::*;
pub use metadata::*;
pub use progress::*;
pub use requirement::*;
pub use task::*;
