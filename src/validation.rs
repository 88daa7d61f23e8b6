//! Advisory checks of artifact paths and signatures against project metadata.
//!
//! Every check is a pure function returning `Ok(())` or a
//! [`ValidationFailure`] with a human-readable message. When the metadata, or
//! the section a check needs, is absent the check passes: partially configured
//! projects must still be able to register artifacts.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::ProjectMetadata;
use crate::paths;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationFailure {
    pub message: String,
}

impl ValidationFailure {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type Validation = Result<(), ValidationFailure>;

/// `.ext` of the final path component, or an empty string.
fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Fails when `path`'s extension is not in `allowed`. An absent or empty
/// allow-list accepts everything. Entries may omit the leading dot.
pub fn check_extension(path: &Path, allowed: Option<&[String]>) -> Validation {
    let Some(allowed) = allowed.filter(|list| !list.is_empty()) else {
        return Ok(());
    };

    let ext = dotted_extension(path);
    let permitted = allowed
        .iter()
        .any(|candidate| candidate == &ext || format!(".{}", candidate) == ext);
    if permitted {
        Ok(())
    } else {
        Err(ValidationFailure::new(format!(
            "File {} uses unsupported extension {}",
            path.display(),
            if ext.is_empty() { "(none)" } else { ext.as_str() }
        )))
    }
}

/// Whether `target` is `dir` or lies beneath it.
///
/// Both are made absolute and normalised first; the comparison is by whole
/// path components, so `/p/ab.ts` is not inside `/p/a`.
pub fn is_within_dir(target: &Path, dir: &Path) -> bool {
    paths::absolute(target).starts_with(paths::absolute(dir))
}

fn project_dir(project_root: &Path, configured: Option<&String>) -> Option<PathBuf> {
    configured
        .filter(|dir| !dir.trim().is_empty())
        .map(|dir| paths::resolve_in(project_root, dir))
}

/// UI components must use a frontend extension and live under the frontend
/// root, the components directory or the views directory.
pub fn validate_ui_registration(
    project_root: &Path,
    metadata: Option<&ProjectMetadata>,
    file_path: &str,
) -> Validation {
    let Some(metadata) = metadata else {
        return Ok(());
    };
    let (Some(frontend), Some(constraints)) = (&metadata.frontend, &metadata.constraints) else {
        return Ok(());
    };

    let target = paths::resolve_in(project_root, file_path);
    check_extension(&target, constraints.allowed_frontend_ext.as_deref())?;

    let candidates: Vec<PathBuf> = [
        &frontend.root,
        &frontend.components_dir,
        &frontend.views_dir,
    ]
    .into_iter()
    .filter_map(|dir| project_dir(project_root, dir.as_ref()))
    .collect();

    if candidates.is_empty() || candidates.iter().any(|dir| is_within_dir(&target, dir)) {
        Ok(())
    } else {
        Err(ValidationFailure::new(format!(
            "UI component path {} is outside allowed frontend directories",
            file_path
        )))
    }
}

/// The route of a `METHOD /route` signature, if the second token looks like a path.
pub fn signature_route(signature: &str) -> Option<&str> {
    signature
        .split_whitespace()
        .nth(1)
        .filter(|token| token.starts_with('/'))
}

/// API endpoints must use a backend extension, live under the endpoints
/// directory (or the backend root when none is configured), and declare a
/// route starting with `api_prefix` when one is configured.
pub fn validate_api_registration(
    project_root: &Path,
    metadata: Option<&ProjectMetadata>,
    file_path: &str,
    signature: Option<&str>,
) -> Validation {
    let Some(metadata) = metadata else {
        return Ok(());
    };
    let (Some(backend), Some(constraints)) = (&metadata.backend, &metadata.constraints) else {
        return Ok(());
    };

    let target = paths::resolve_in(project_root, file_path);
    check_extension(&target, constraints.allowed_backend_ext.as_deref())?;

    let endpoints_dir = project_dir(project_root, backend.endpoints_dir.as_ref())
        .or_else(|| project_dir(project_root, backend.root.as_ref()));
    if let Some(dir) = endpoints_dir {
        if !is_within_dir(&target, &dir) {
            return Err(ValidationFailure::new(format!(
                "API endpoint path {} is outside allowed backend endpoint directories",
                file_path
            )));
        }
    }

    let prefix = metadata.api_prefix.as_deref().filter(|p| !p.is_empty());
    if let (Some(prefix), Some(route)) = (prefix, signature.and_then(signature_route)) {
        if !route.starts_with(prefix) {
            return Err(ValidationFailure::new(format!(
                "API signature path {} must start with prefix {}",
                route, prefix
            )));
        }
    }

    Ok(())
}

/// Backend functions must use a backend extension and live under the backend root.
pub fn validate_function_registration(
    project_root: &Path,
    metadata: Option<&ProjectMetadata>,
    file_path: &str,
) -> Validation {
    let Some(metadata) = metadata else {
        return Ok(());
    };
    let (Some(backend), Some(constraints)) = (&metadata.backend, &metadata.constraints) else {
        return Ok(());
    };

    let target = paths::resolve_in(project_root, file_path);
    check_extension(&target, constraints.allowed_backend_ext.as_deref())?;

    let Some(backend_root) = project_dir(project_root, backend.root.as_ref()) else {
        return Ok(());
    };
    if is_within_dir(&target, &backend_root) {
        Ok(())
    } else {
        Err(ValidationFailure::new(format!(
            "Backend function path {} is outside backend root {}",
            file_path,
            backend.root.as_deref().unwrap_or_default()
        )))
    }
}
