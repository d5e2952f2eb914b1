//! Node records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Node reachability status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Initializing,
    Ready,
    Down,
    Disconnected,
    #[default]
    #[serde(other)]
    Other,
}

impl NodeStatus {
    /// Returns true if the node is marked unreachable.
    pub fn is_down(&self) -> bool {
        matches!(self, Self::Down)
    }
}

/// Listing view of a worker node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct NodeSummary {
    #[serde(rename = "ID")]
    pub id: String,

    pub name: String,

    pub address: String,

    pub datacenter: String,

    pub node_class: String,

    pub node_pool: String,

    pub drain: bool,

    pub scheduling_eligibility: String,

    pub status: NodeStatus,

    pub status_description: String,

    #[serde(deserialize_with = "crate::null_as_default")]
    pub attributes: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub drivers: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_drain: Option<serde_json::Value>,

    pub create_index: u64,

    pub modify_index: u64,
}

/// Full node record, fetched lazily for nodes referenced by flagged allocations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeDetail {
    #[serde(flatten)]
    pub summary: NodeSummary,

    #[serde(rename = "HTTPAddr", default, skip_serializing_if = "String::is_empty")]
    pub http_addr: String,

    #[serde(
        default,
        deserialize_with = "crate::null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub meta: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_resources: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_resources: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<serde_json::Value>,
}

impl NodeDetail {
    pub fn id(&self) -> &str {
        &self.summary.id
    }
}

impl From<NodeSummary> for NodeDetail {
    fn from(summary: NodeSummary) -> Self {
        Self {
            summary,
            ..Default::default()
        }
    }
}
