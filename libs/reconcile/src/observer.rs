//! Observer handle for classification and enrichment events.
//!
//! The engine never logs through a global; it reports to whatever observer
//! the caller injects. [`TracingObserver`] forwards to `tracing`,
//! [`RecordingObserver`] keeps events for inspection.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::enrich::EnrichStats;
use crate::run::RunState;

/// Something the engine noticed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEvent {
    /// The run advanced to a new state.
    StateChanged(RunState),

    /// A non-terminal allocation references a namespace that does not exist.
    MissingNamespace {
        alloc_id: String,
        job_id: String,
        namespace: String,
    },

    /// A pending allocation has not been modified within the threshold.
    PendingTooLong {
        alloc_id: String,
        modified: DateTime<Utc>,
    },

    /// A non-terminal allocation references a node that does not exist.
    MissingNode { alloc_id: String, node_id: String },

    /// A non-terminal allocation is bound to a node marked down.
    DownNode { alloc_id: String, node_id: String },

    /// Fetching an allocation's full record failed.
    AllocationFetchFailed { alloc_id: String, error: String },

    /// Fetching a node's full record failed.
    NodeFetchFailed {
        node_id: String,
        alloc_id: String,
        error: String,
    },

    /// The enrichment pass finished.
    EnrichmentFinished(EnrichStats),
}

/// Receives engine events.
pub trait AuditObserver: Send + Sync {
    fn observe(&self, event: &AuditEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl AuditObserver for TracingObserver {
    fn observe(&self, event: &AuditEvent) {
        match event {
            AuditEvent::StateChanged(state) => {
                info!(state = %state, "{}", state.describe());
            }
            AuditEvent::MissingNamespace {
                alloc_id,
                job_id,
                namespace,
            } => {
                warn!(
                    job = %job_id,
                    alloc = %alloc_id,
                    ns = %namespace,
                    "Non-terminal allocation's namespace missing"
                );
            }
            AuditEvent::PendingTooLong { alloc_id, modified } => {
                warn!(
                    alloc = %alloc_id,
                    modified = %modified,
                    "Allocation has been pending for too long"
                );
            }
            AuditEvent::MissingNode { alloc_id, node_id } => {
                warn!(alloc = %alloc_id, node = %node_id, "Non-terminal allocation's node missing");
            }
            AuditEvent::DownNode { alloc_id, node_id } => {
                warn!(alloc = %alloc_id, node = %node_id, "Non-terminal allocation's node down");
            }
            AuditEvent::AllocationFetchFailed { alloc_id, error } => {
                error!(alloc = %alloc_id, error = %error, "Error fetching alloc");
            }
            AuditEvent::NodeFetchFailed {
                node_id,
                alloc_id,
                error,
            } => {
                error!(
                    node = %node_id,
                    alloc = %alloc_id,
                    error = %error,
                    "Error fetching node for alloc"
                );
            }
            AuditEvent::EnrichmentFinished(stats) => {
                let failed = stats.allocations_failed + stats.nodes_failed;
                if failed > 0 {
                    warn!(
                        allocs_fetched = stats.allocations_fetched,
                        allocs_failed = stats.allocations_failed,
                        nodes_fetched = stats.nodes_fetched,
                        nodes_failed = stats.nodes_failed,
                        "Some details could not be fetched"
                    );
                } else {
                    info!(
                        allocs_fetched = stats.allocations_fetched,
                        nodes_fetched = stats.nodes_fetched,
                        "Fetched details"
                    );
                }
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.lock().clone()
    }

    /// Number of events matching a predicate.
    pub fn count(&self, predicate: impl Fn(&AuditEvent) -> bool) -> usize {
        self.lock().iter().filter(|e| predicate(e)).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AuditEvent>> {
        // A panic while holding the lock only happens in a failing test.
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AuditObserver for RecordingObserver {
    fn observe(&self, event: &AuditEvent) {
        self.lock().push(event.clone());
    }
}

/// Render an error with its full cause chain.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
