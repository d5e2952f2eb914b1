//! Deferred enrichment of flagged allocations.

use std::collections::HashSet;

use allocheck_snapshot::SnapshotSource;

use crate::findings::Findings;
use crate::observer::{error_chain, AuditEvent, AuditObserver};

/// Ids whose full records have already been requested.
///
/// Threaded through the enrichment pass so each allocation and node is
/// fetched at most once, however many buckets reference it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchLedger {
    allocations: HashSet<String>,
    nodes: HashSet<String>,
}

impl FetchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the detail maps of earlier findings.
    pub fn from_findings(findings: &Findings) -> Self {
        Self {
            allocations: findings.allocs.keys().cloned().collect(),
            nodes: findings.nodes.keys().cloned().collect(),
        }
    }

    /// Mark an allocation as fetched. Returns false if it already was.
    pub fn claim_allocation(&mut self, id: &str) -> bool {
        !self.allocations.contains(id) && self.allocations.insert(id.to_string())
    }

    /// Mark a node as fetched. Returns false if it already was.
    pub fn claim_node(&mut self, id: &str) -> bool {
        !self.nodes.contains(id) && self.nodes.insert(id.to_string())
    }
}

/// Counters for one enrichment pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichStats {
    pub allocations_fetched: usize,
    pub allocations_failed: usize,
    pub nodes_fetched: usize,
    pub nodes_failed: usize,
}

/// Fetches full records for flagged allocations and their nodes.
pub struct Enricher<'a> {
    source: &'a dyn SnapshotSource,
    observer: &'a dyn AuditObserver,
}

impl<'a> Enricher<'a> {
    pub fn new(source: &'a dyn SnapshotSource, observer: &'a dyn AuditObserver) -> Self {
        Self { source, observer }
    }

    /// Enrich every flagged allocation not yet in `ledger`.
    ///
    /// Fetch failures are reported to the observer and recorded as `None`
    /// detail entries; they never abort the pass. Allocations whose node was
    /// absent from the node listing get no node fetch.
    pub async fn enrich(&self, findings: &mut Findings, ledger: &mut FetchLedger) -> EnrichStats {
        let mut stats = EnrichStats::default();
        let on_missing_node: HashSet<String> =
            findings.allocs_missing_node.iter().cloned().collect();

        for alloc_id in findings.flagged_allocation_ids() {
            if !ledger.claim_allocation(&alloc_id) {
                continue;
            }

            let detail = match self.source.get_allocation(&alloc_id).await {
                Ok(detail) => detail,
                Err(err) => {
                    self.observer.observe(&AuditEvent::AllocationFetchFailed {
                        alloc_id: alloc_id.clone(),
                        error: error_chain(&err),
                    });
                    stats.allocations_failed += 1;
                    findings.allocs.insert(alloc_id, None);
                    continue;
                }
            };
            stats.allocations_fetched += 1;

            let node_id = detail.node_id().to_string();
            findings.allocs.insert(alloc_id.clone(), Some(detail));

            if node_id.is_empty()
                || on_missing_node.contains(&alloc_id)
                || !ledger.claim_node(&node_id)
            {
                continue;
            }

            match self.source.get_node(&node_id).await {
                Ok(node) => {
                    stats.nodes_fetched += 1;
                    findings.nodes.insert(node_id, Some(node));
                }
                Err(err) => {
                    self.observer.observe(&AuditEvent::NodeFetchFailed {
                        node_id: node_id.clone(),
                        alloc_id,
                        error: error_chain(&err),
                    });
                    stats.nodes_failed += 1;
                    findings.nodes.insert(node_id, None);
                }
            }
        }

        stats
    }
}
