use indexmap::IndexMap;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

/// Default location of the companion metadata document, relative to the project root.
pub const DEFAULT_METADATA_FILE: &str = "docs/metadata.md";

/// Project-wide layout and constraints, read from `docs/metadata_index.yaml`.
///
/// Every section is optional. Validation treats a missing section as "no
/// constraint" rather than as an error. A field of the wrong shape is logged
/// and read as missing; the remaining fields still apply.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectMetadata {
    /// Section key to heading title in the metadata document.
    #[serde(deserialize_with = "lenient")]
    pub sections: Option<IndexMap<String, String>>,
    #[serde(deserialize_with = "lenient")]
    pub frontend: Option<FrontendLayout>,
    #[serde(deserialize_with = "lenient")]
    pub backend: Option<BackendLayout>,
    #[serde(deserialize_with = "lenient")]
    pub constraints: Option<Constraints>,
    /// Required prefix for endpoint routes, e.g. `/api/v1`.
    #[serde(deserialize_with = "lenient")]
    pub api_prefix: Option<String>,
    /// Metadata document path relative to the project root.
    #[serde(deserialize_with = "lenient")]
    pub metadata_file: Option<String>,
}

impl ProjectMetadata {
    pub fn metadata_file(&self) -> &str {
        self.metadata_file
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(DEFAULT_METADATA_FILE)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FrontendLayout {
    #[serde(deserialize_with = "lenient")]
    pub root: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub components_dir: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub views_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendLayout {
    #[serde(deserialize_with = "lenient")]
    pub root: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub endpoints_dir: Option<String>,
}

/// File extension allow-lists, written with the leading dot (e.g. `.vue`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Constraints {
    #[serde(deserialize_with = "lenient")]
    pub allowed_frontend_ext: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient")]
    pub allowed_backend_ext: Option<Vec<String>>,
}

/// Read an optional field, mapping a value of the wrong type to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_yaml::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_yaml::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            tracing::warn!("Ignoring malformed field in metadata_index.yaml: {}", e);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrongly_typed_fields_are_dropped_one_at_a_time() {
        let yaml = "frontend:\n  root: frontend/src\n  views_dir: [a, b]\nconstraints:\n  allowed_frontend_ext: .vue\n  allowed_backend_ext: [\".py\"]\napi_prefix: {v: 1}\n";

        let metadata: ProjectMetadata = serde_yaml::from_str(yaml).unwrap();

        let frontend = metadata.frontend.expect("frontend kept");
        assert_eq!(frontend.root.as_deref(), Some("frontend/src"));
        assert_eq!(frontend.views_dir, None);
        let constraints = metadata.constraints.expect("constraints kept");
        assert_eq!(constraints.allowed_frontend_ext, None);
        assert_eq!(constraints.allowed_backend_ext, Some(vec![".py".to_string()]));
        assert_eq!(metadata.api_prefix, None);
    }

    #[test]
    fn scalar_section_reads_as_missing() {
        let metadata: ProjectMetadata =
            serde_yaml::from_str("frontend: web\nmetadata_file: docs/arch.md\n").unwrap();

        assert_eq!(metadata.frontend, None);
        assert_eq!(metadata.metadata_file(), "docs/arch.md");
    }
}
