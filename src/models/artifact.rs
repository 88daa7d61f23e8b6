use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::LinkOutcome;

/// The three independent artifact stores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactCategory {
    /// UI components (frontend files)
    Ui,
    /// API endpoints (backend route handlers)
    Api,
    /// Backend functions (services, helpers, data access)
    Function,
}

impl ArtifactCategory {
    pub const ALL: [ArtifactCategory; 3] = [Self::Ui, Self::Api, Self::Function];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ui => "ui",
            Self::Api => "api",
            Self::Function => "function",
        }
    }

    /// Label used in tool messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ui => "UI",
            Self::Api => "API",
            Self::Function => "Function",
        }
    }

    pub fn store_file(&self) -> &'static str {
        match self {
            Self::Ui => "ui_interface.yaml",
            Self::Api => "api_interface.yaml",
            Self::Function => "func_interface.yaml",
        }
    }

    /// List fields unioned (not replaced) on re-registration.
    pub fn mergeable_fields(&self) -> &'static [ListField] {
        match self {
            Self::Ui | Self::Api => &[ListField::UpstreamIds, ListField::DownstreamIds],
            Self::Function => &[ListField::UpstreamIds, ListField::DbTables],
        }
    }
}

/// Array-valued artifact fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListField {
    UpstreamIds,
    DownstreamIds,
    DbTables,
}

/// The requirement(s) an artifact was created for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RelatedReq {
    One(String),
    Many(Vec<String>),
}

impl RelatedReq {
    pub fn contains(&self, req_id: &str) -> bool {
        match self {
            Self::One(id) => id == req_id,
            Self::Many(ids) => ids.iter().any(|id| id == req_id),
        }
    }
}

/// A registered UI component, API endpoint or backend function.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArtifactRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// "METHOD /path" for endpoints, a function signature for functions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_req_id: Option<RelatedReq>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downstream_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_tables: Option<Vec<String>>,
}

impl ArtifactRecord {
    pub fn list(&self, field: ListField) -> Option<&Vec<String>> {
        match field {
            ListField::UpstreamIds => self.upstream_ids.as_ref(),
            ListField::DownstreamIds => self.downstream_ids.as_ref(),
            ListField::DbTables => self.db_tables.as_ref(),
        }
    }

    fn list_mut(&mut self, field: ListField) -> &mut Option<Vec<String>> {
        match field {
            ListField::UpstreamIds => &mut self.upstream_ids,
            ListField::DownstreamIds => &mut self.downstream_ids,
            ListField::DbTables => &mut self.db_tables,
        }
    }

    /// Fold a re-registration into this record.
    ///
    /// Scalars are overwritten only by non-empty values. Each field in
    /// `mergeable` becomes the union of the stored list followed by the new
    /// elements, de-duplicated; lists never shrink. `related_req_id` keeps the
    /// value from the first registration.
    pub fn merge_from(&mut self, incoming: ArtifactRecord, mergeable: &[ListField]) {
        overwrite_if_present(&mut self.path, incoming.path.clone());
        overwrite_if_present(&mut self.description, incoming.description.clone());
        overwrite_if_present(&mut self.signature, incoming.signature.clone());

        for &field in mergeable {
            let Some(new_items) = incoming.list(field) else {
                continue;
            };
            let merged = self.list_mut(field).get_or_insert_with(Vec::new);
            for item in new_items {
                if !merged.contains(item) {
                    merged.push(item.clone());
                }
            }
        }
    }

    pub fn is_related_to(&self, req_id: &str) -> bool {
        self.related_req_id
            .as_ref()
            .is_some_and(|related| related.contains(req_id))
    }
}

fn overwrite_if_present(slot: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        *slot = Some(value);
    }
}

/// A category store as persisted: artifact id to record, in insertion order.
pub type ArtifactStore = IndexMap<String, ArtifactRecord>;

/// Whether an upsert inserted a new record or merged into an existing one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Result of a successful registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationOutcome {
    pub category: ArtifactCategory,
    pub id: String,
    pub related_req_id: String,
    pub upsert: UpsertOutcome,
    pub link: LinkOutcome,
}

impl RegistrationOutcome {
    pub fn message(&self) -> String {
        format!(
            "Success: Registered {} {} and linked to {}",
            self.category.label(),
            self.id,
            self.related_req_id
        )
    }
}

/// An artifact id with its file path, `None` when the id is unknown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterfaceRef {
    pub id: String,
    pub path: Option<String>,
}

/// Interfaces linked to a requirement, resolved to their paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterfaceRefs {
    pub ui: Vec<InterfaceRef>,
    pub api: Vec<InterfaceRef>,
    pub func: Vec<InterfaceRef>,
}

/// A full artifact record tagged with its id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactEntry {
    pub id: String,
    #[serde(flatten)]
    pub record: ArtifactRecord,
}

/// Every artifact whose `related_req_id` names a given requirement.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RequirementInterfaces {
    pub ui: Vec<ArtifactEntry>,
    pub api: Vec<ArtifactEntry>,
    pub func: Vec<ArtifactEntry>,
}

// ============================================================
// Registration inputs
// ============================================================

/// Input for registering a UI component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterUiInput {
    pub project_root: String,
    pub id: String,
    pub path: String,
    #[serde(default)]
    pub description: Option<String>,
    pub related_req_id: String,
    #[serde(default)]
    pub upstream_ids: Option<Vec<String>>,
    #[serde(default)]
    pub downstream_ids: Option<Vec<String>>,
}

/// Input for registering an API endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterApiInput {
    pub project_root: String,
    pub id: String,
    pub path: String,
    /// Method and route, e.g. `POST /api/v1/auth/login`.
    pub signature: String,
    #[serde(default)]
    pub description: Option<String>,
    pub related_req_id: String,
    #[serde(default)]
    pub upstream_ids: Option<Vec<String>>,
    #[serde(default)]
    pub downstream_ids: Option<Vec<String>>,
}

/// Input for registering a backend function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterFunctionInput {
    pub project_root: String,
    pub id: String,
    pub path: String,
    pub signature: String,
    #[serde(default)]
    pub description: Option<String>,
    pub related_req_id: String,
    #[serde(default)]
    pub upstream_ids: Option<Vec<String>>,
    /// Tables the function reads or writes.
    #[serde(default)]
    pub db_tables: Option<Vec<String>>,
}

/// Category-independent view of a registration request.
#[derive(Debug, Clone)]
pub struct ArtifactRegistration {
    pub category: ArtifactCategory,
    pub project_root: String,
    pub id: String,
    pub related_req_id: String,
    pub record: ArtifactRecord,
}

impl From<RegisterUiInput> for ArtifactRegistration {
    fn from(input: RegisterUiInput) -> Self {
        Self {
            category: ArtifactCategory::Ui,
            project_root: input.project_root,
            id: input.id,
            record: ArtifactRecord {
                path: Some(input.path),
                description: input.description,
                related_req_id: Some(RelatedReq::One(input.related_req_id.clone())),
                upstream_ids: input.upstream_ids,
                downstream_ids: input.downstream_ids,
                ..Default::default()
            },
            related_req_id: input.related_req_id,
        }
    }
}

impl From<RegisterApiInput> for ArtifactRegistration {
    fn from(input: RegisterApiInput) -> Self {
        Self {
            category: ArtifactCategory::Api,
            project_root: input.project_root,
            id: input.id,
            record: ArtifactRecord {
                path: Some(input.path),
                description: input.description,
                signature: Some(input.signature),
                related_req_id: Some(RelatedReq::One(input.related_req_id.clone())),
                upstream_ids: input.upstream_ids,
                downstream_ids: input.downstream_ids,
                ..Default::default()
            },
            related_req_id: input.related_req_id,
        }
    }
}

impl From<RegisterFunctionInput> for ArtifactRegistration {
    fn from(input: RegisterFunctionInput) -> Self {
        Self {
            category: ArtifactCategory::Function,
            project_root: input.project_root,
            id: input.id,
            record: ArtifactRecord {
                path: Some(input.path),
                description: input.description,
                signature: Some(input.signature),
                related_req_id: Some(RelatedReq::One(input.related_req_id.clone())),
                upstream_ids: input.upstream_ids,
                db_tables: input.db_tables,
                ..Default::default()
            },
            related_req_id: input.related_req_id,
        }
    }
}
