//! Lookup indexes built from listings.

use std::collections::HashMap;

use allocheck_model::{Namespace, NodeSummary};

/// Nodes keyed by id.
pub type NodeIndex = HashMap<String, NodeSummary>;

/// Namespaces keyed by name.
pub type NamespaceIndex = HashMap<String, Namespace>;

/// Index nodes by id. A duplicate id silently replaces the earlier entry.
pub fn index_nodes(nodes: Vec<NodeSummary>) -> NodeIndex {
    index_by(nodes, |n| n.id.clone())
}

/// Index namespaces by name. A duplicate name silently replaces the earlier entry.
pub fn index_namespaces(namespaces: Vec<Namespace>) -> NamespaceIndex {
    index_by(namespaces, |ns| ns.name.clone())
}

fn index_by<T, F>(items: Vec<T>, key: F) -> HashMap<String, T>
where
    F: Fn(&T) -> String,
{
    let mut index = HashMap::with_capacity(items.len());
    for item in items {
        index.insert(key(&item), item);
    }
    index
}
