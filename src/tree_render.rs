//! ASCII tree rendering of a requirements document with queue progress.

use std::collections::HashMap;

use crate::models::{ProgressRecord, ProgressStatus, RequirementDoc, RequirementNode};

const PROCESSED: char = '●';
const UNPROCESSED: char = '○';
const NOT_QUEUED: char = '·';

fn status_symbol(status: Option<ProgressStatus>) -> char {
    match status {
        Some(ProgressStatus::Processed) => PROCESSED,
        Some(ProgressStatus::Unprocessed) => UNPROCESSED,
        None => NOT_QUEUED,
    }
}

/// `id name`, or whichever of the two is present.
fn node_label(node: &RequirementNode) -> String {
    match (node.id.as_deref(), node.name.as_deref()) {
        (Some(id), Some(name)) => format!("{} {}", id, name),
        (Some(id), None) => id.to_string(),
        (None, Some(name)) => name.to_string(),
        (None, None) => "(unnamed)".to_string(),
    }
}

/// Render the document as ASCII art, marking each node with its status in `queue`.
///
/// Example output:
/// ```text
/// ● R1 Authentication
/// ├── ● R1.1 Password Login
/// ├── ○ R1.2 OAuth
/// │   └── ○ R1.2.1 Google Provider
/// └── · Notes
/// ```
pub fn render_progress_tree(doc: &RequirementDoc, queue: &[ProgressRecord]) -> String {
    let statuses: HashMap<&str, ProgressStatus> = queue
        .iter()
        .map(|record| (record.id.as_str(), record.status))
        .collect();

    let mut output = String::new();
    for node in doc.roots() {
        render_node(&mut output, node, &statuses, "", None);
    }
    output
}

/// Recursively render a node and its children. `is_last` is `None` for roots.
fn render_node(
    output: &mut String,
    node: &RequirementNode,
    statuses: &HashMap<&str, ProgressStatus>,
    prefix: &str,
    is_last: Option<bool>,
) {
    let status = node
        .id
        .as_deref()
        .and_then(|id| statuses.get(id).copied());

    output.push_str(prefix);
    if let Some(is_last) = is_last {
        output.push_str(if is_last { "└── " } else { "├── " });
    }
    output.push(status_symbol(status));
    output.push(' ');
    output.push_str(&node_label(node));
    output.push('\n');

    let child_prefix = match is_last {
        None => String::new(),
        Some(true) => format!("{}    ", prefix),
        Some(false) => format!("{}│   ", prefix),
    };

    for (i, child) in node.children.iter().enumerate() {
        let child_is_last = i == node.children.len() - 1;
        render_node(output, child, statuses, &child_prefix, Some(child_is_last));
    }
}
