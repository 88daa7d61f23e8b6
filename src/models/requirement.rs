use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A node of the hierarchical requirements document.
///
/// Requirements are read-only input: they are loaded fresh on every operation
/// and never written back. Fields beyond `id`, `name`, `description` and
/// `children` are kept in `extra` so they can be echoed back to the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RequirementNode {
    /// Unique across the whole document. Nodes without an id are never queued.
    #[serde(
        default,
        deserialize_with = "scalar_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free text; may embed relative image references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable_children",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<RequirementNode>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RequirementNode {
    /// A copy of this node with its direct children, each stripped of its own
    /// children. Grandchildren are never handed to the consumer.
    pub fn with_direct_children(&self) -> RequirementView {
        RequirementView {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            extra: self.extra.clone(),
            children: self
                .children
                .iter()
                .map(|child| RequirementNode {
                    children: Vec::new(),
                    ..child.clone()
                })
                .collect(),
        }
    }
}

/// The document root: either a single node or a sequence of nodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RequirementDoc {
    Many(Vec<RequirementNode>),
    Single(RequirementNode),
}

impl RequirementDoc {
    /// Top-level nodes, regardless of which root form the document used.
    pub fn roots(&self) -> &[RequirementNode] {
        match self {
            Self::Many(nodes) => nodes,
            Self::Single(node) => std::slice::from_ref(node),
        }
    }
}

/// A requirement as returned by a pop: own fields plus direct children only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequirementView {
    #[serde(
        default,
        deserialize_with = "scalar_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub children: Vec<RequirementNode>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Ids may be written as strings or bare numbers in YAML.
pub(crate) fn scalar_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn nullable_children<'de, D>(deserializer: D) -> Result<Vec<RequirementNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<RequirementNode>>::deserialize(deserializer)?.unwrap_or_default())
}
