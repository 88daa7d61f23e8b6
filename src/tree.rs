//! Lookup and flattening over a requirements document.
//!
//! Every function accepts a [`RequirementDoc`], so single-node and sequence
//! roots are handled the same way. Search order is document order: a node
//! before its children, children left to right.

use crate::models::{ProgressRecord, RequirementDoc, RequirementNode};

/// Order in which a phase queue visits the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOrder {
    /// Node before its children (design phase).
    PreOrder,
    /// Children before the node (implementation phase).
    PostOrder,
}

/// First node whose id equals `id`.
pub fn find_by_id<'a>(doc: &'a RequirementDoc, id: &str) -> Option<&'a RequirementNode> {
    doc.roots().iter().find_map(|root| find_in(root, id))
}

fn find_in<'a>(node: &'a RequirementNode, id: &str) -> Option<&'a RequirementNode> {
    if node.id.as_deref() == Some(id) {
        return Some(node);
    }
    node.children.iter().find_map(|child| find_in(child, id))
}

/// The node whose direct children include a node with id `child_id`.
///
/// Top-level nodes have no parent, so looking one up returns `None`.
pub fn find_parent<'a>(doc: &'a RequirementDoc, child_id: &str) -> Option<&'a RequirementNode> {
    doc.roots()
        .iter()
        .find_map(|root| find_parent_in(root, child_id))
}

fn find_parent_in<'a>(node: &'a RequirementNode, child_id: &str) -> Option<&'a RequirementNode> {
    for child in &node.children {
        if child.id.as_deref() == Some(child_id) {
            return Some(node);
        }
        if let Some(found) = find_parent_in(child, child_id) {
            return Some(found);
        }
    }
    None
}

/// Seed records for a phase queue, all unprocessed.
///
/// Nodes without an id are not queued, but their children still are.
pub fn flatten(doc: &RequirementDoc, order: TraversalOrder) -> Vec<ProgressRecord> {
    let mut queue = Vec::new();
    for root in doc.roots() {
        flatten_into(root, order, &mut queue);
    }
    queue
}

fn flatten_into(node: &RequirementNode, order: TraversalOrder, queue: &mut Vec<ProgressRecord>) {
    let push_self = |queue: &mut Vec<ProgressRecord>| {
        if let Some(id) = node.id.as_deref().filter(|id| !id.is_empty()) {
            queue.push(ProgressRecord::unprocessed(id));
        }
    };

    if order == TraversalOrder::PreOrder {
        push_self(queue);
    }
    for child in &node.children {
        flatten_into(child, order, queue);
    }
    if order == TraversalOrder::PostOrder {
        push_self(queue);
    }
}
