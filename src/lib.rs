//! Architect Manager: a resumable, file-persisted task queue that drives a
//! two-phase (design, then implementation) workflow over a hierarchical
//! requirements document.
//!
//! All state lives in YAML files under `<project_root>/artifacts/`. Every
//! operation reloads what it needs and rewrites what it mutates; nothing is
//! cached between calls.

pub mod api;
pub mod error;
pub mod images;
pub mod mcp;
pub mod models;
pub mod paths;
pub mod sections;
pub mod store;
pub mod tree;
pub mod tree_render;
pub mod validation;
pub mod workflow;

pub use error::{Result, WorkflowError};
