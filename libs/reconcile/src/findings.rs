//! Findings produced by one reconciliation run.

use std::collections::BTreeMap;

use allocheck_model::{AllocationDetail, NodeDetail};
use serde::{Deserialize, Serialize};

/// Output of one run.
///
/// Namespace fields are `None` (and omitted from the encoded report) when
/// the snapshot had no namespace listing and namespace checks were skipped.
/// A `None` value in `allocs` or `nodes` records a detail fetch that was
/// attempted and failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Findings {
    /// False unless the run reached the end of enrichment.
    pub complete: bool,

    pub allocs_total: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespaces_total: Option<usize>,

    pub nodes_total: usize,

    /// Allocations skipped because their client status is terminal.
    pub allocs_client_terminal: usize,

    pub allocs_pending_too_long: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocs_missing_namespace: Option<Vec<String>>,

    pub allocs_missing_node: Vec<String>,

    pub allocs_down_node: Vec<String>,

    /// Distinct namespace names referenced but not found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespaces_missing: Option<Vec<String>>,

    pub allocs: BTreeMap<String, Option<AllocationDetail>>,

    pub nodes: BTreeMap<String, Option<NodeDetail>>,
}

impl Findings {
    /// Empty findings for a new run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if namespace checks ran.
    pub fn namespaces_checked(&self) -> bool {
        self.allocs_missing_namespace.is_some()
    }

    /// Flagged allocation ids in enrichment order: pending-too-long,
    /// missing-node, down-node, then missing-namespace. Ids flagged by more
    /// than one bucket appear more than once.
    pub fn flagged_allocation_ids(&self) -> Vec<String> {
        let missing_namespace = self.allocs_missing_namespace.as_deref().unwrap_or_default();
        self.allocs_pending_too_long
            .iter()
            .chain(&self.allocs_missing_node)
            .chain(&self.allocs_down_node)
            .chain(missing_namespace)
            .cloned()
            .collect()
    }

    /// Total entries across all allocation buckets.
    pub fn flagged_count(&self) -> usize {
        self.allocs_pending_too_long.len()
            + self.allocs_missing_node.len()
            + self.allocs_down_node.len()
            + self.allocs_missing_namespace.as_ref().map_or(0, Vec::len)
    }
}
