//! Classification pass over the allocation listing.

use std::time::Duration;

use allocheck_model::{AllocationSummary, ClientStatus};
use chrono::{DateTime, Utc};

use crate::findings::Findings;
use crate::index::{NamespaceIndex, NodeIndex};
use crate::observer::{AuditEvent, AuditObserver};

/// Allocations pending since strictly before this instant are flagged.
///
/// A threshold too large to represent yields the earliest instant, so
/// nothing is flagged.
pub fn pending_cutoff(now: DateTime<Utc>, threshold: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(threshold)
        .ok()
        .and_then(|threshold| now.checked_sub_signed(threshold))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Classifies allocations against read-only indexes.
pub struct Classifier<'a> {
    nodes: &'a NodeIndex,
    namespaces: Option<&'a NamespaceIndex>,
    cutoff: DateTime<Utc>,
    observer: &'a dyn AuditObserver,
}

impl<'a> Classifier<'a> {
    /// Create a classifier. Pass `None` for `namespaces` to skip namespace
    /// checks.
    pub fn new(
        nodes: &'a NodeIndex,
        namespaces: Option<&'a NamespaceIndex>,
        cutoff: DateTime<Utc>,
        observer: &'a dyn AuditObserver,
    ) -> Self {
        Self {
            nodes,
            namespaces,
            cutoff,
            observer,
        }
    }

    /// Classify every allocation once, in listing order.
    pub fn classify(&self, allocs: &[AllocationSummary], findings: &mut Findings) {
        if self.namespaces.is_some() {
            findings.allocs_missing_namespace.get_or_insert_with(Vec::new);
            findings.namespaces_missing.get_or_insert_with(Vec::new);
        }

        for alloc in allocs {
            self.classify_one(alloc, findings);
        }
    }

    fn classify_one(&self, alloc: &AllocationSummary, findings: &mut Findings) {
        if alloc.client_status.is_terminal() {
            findings.allocs_client_terminal += 1;
            return;
        }

        if let Some(namespaces) = self.namespaces {
            if !namespaces.contains_key(&alloc.namespace) {
                self.observer.observe(&AuditEvent::MissingNamespace {
                    alloc_id: alloc.id.clone(),
                    job_id: alloc.job_id.clone(),
                    namespace: alloc.namespace.clone(),
                });
                findings
                    .allocs_missing_namespace
                    .get_or_insert_with(Vec::new)
                    .push(alloc.id.clone());

                let missing = findings.namespaces_missing.get_or_insert_with(Vec::new);
                if !missing.contains(&alloc.namespace) {
                    missing.push(alloc.namespace.clone());
                }
            }
        }

        let modified = alloc.modified_at();
        if alloc.client_status == ClientStatus::Pending && modified < self.cutoff {
            self.observer.observe(&AuditEvent::PendingTooLong {
                alloc_id: alloc.id.clone(),
                modified,
            });
            findings.allocs_pending_too_long.push(alloc.id.clone());
        }

        match self.nodes.get(&alloc.node_id) {
            None => {
                self.observer.observe(&AuditEvent::MissingNode {
                    alloc_id: alloc.id.clone(),
                    node_id: alloc.node_id.clone(),
                });
                findings.allocs_missing_node.push(alloc.id.clone());
            }
            Some(node) if node.status.is_down() => {
                self.observer.observe(&AuditEvent::DownNode {
                    alloc_id: alloc.id.clone(),
                    node_id: alloc.node_id.clone(),
                });
                findings.allocs_down_node.push(alloc.id.clone());
            }
            Some(_) => {}
        }
    }
}
