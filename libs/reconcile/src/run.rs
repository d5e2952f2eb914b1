//! One reconciliation run, start to finish.
//!
//! ```text
//! Started -> NodesFetched -> NamespacesFetched -> AllocationsFetched
//!         -> Classified -> Enriched -> Complete
//! ```
//!
//! A listing failure before `Classified` aborts the run with a
//! [`RunFailure`]. Once classification starts the run always completes.

use std::time::Duration;

use allocheck_snapshot::{SnapshotSource, SourceError};
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::classify::{pending_cutoff, Classifier};
use crate::enrich::{EnrichStats, Enricher, FetchLedger};
use crate::findings::Findings;
use crate::index::{index_namespaces, index_nodes};
use crate::observer::{AuditEvent, AuditObserver};

/// Default age beyond which a pending allocation is reported.
pub const DEFAULT_PENDING_THRESHOLD: Duration = Duration::from_secs(12 * 60 * 60);

/// Run progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RunState {
    Started,
    NodesFetched,
    NamespacesFetched,
    AllocationsFetched,
    Classified,
    Enriched,
    Complete,
}

impl RunState {
    /// Human-readable note on what happens next.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Started => "Fetching all nodes...",
            Self::NodesFetched => "Fetching all namespaces...",
            Self::NamespacesFetched => "Fetching all allocations...",
            Self::AllocationsFetched => "Checking allocations...",
            Self::Classified => "Fetching details for flagged allocations...",
            Self::Enriched => "Finalizing results...",
            Self::Complete => "Reconciliation complete",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Started => "started",
            Self::NodesFetched => "nodes_fetched",
            Self::NamespacesFetched => "namespaces_fetched",
            Self::AllocationsFetched => "allocations_fetched",
            Self::Classified => "classified",
            Self::Enriched => "enriched",
            Self::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// A run aborted before classification.
///
/// Carries the last state reached and the partial findings, which are
/// always flagged incomplete.
#[derive(Debug, Error)]
#[error("reconciliation aborted after state {state}")]
pub struct RunFailure {
    pub state: RunState,
    pub findings: Box<Findings>,
    #[source]
    pub source: SourceError,
}

/// Run settings.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Pending allocations unmodified for longer than this are reported.
    pub pending_threshold: Duration,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            pending_threshold: DEFAULT_PENDING_THRESHOLD,
        }
    }
}

/// Drives a snapshot source through classification and enrichment.
pub struct Auditor<'a> {
    source: &'a dyn SnapshotSource,
    observer: &'a dyn AuditObserver,
    config: AuditConfig,
}

impl<'a> Auditor<'a> {
    pub fn new(
        source: &'a dyn SnapshotSource,
        observer: &'a dyn AuditObserver,
        config: AuditConfig,
    ) -> Self {
        Self {
            source,
            observer,
            config,
        }
    }

    /// Run against the current time.
    pub async fn run(&self) -> Result<Findings, RunFailure> {
        self.run_at(Utc::now()).await
    }

    /// Run as if the current time were `now`.
    // TODO: accept a cancellation token checked between allocations so a
    // signal can return partial findings.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<Findings, RunFailure> {
        let mut findings = Findings::new();
        let mut state = RunState::Started;
        self.enter(state);

        let nodes = match self.source.list_nodes().await {
            Ok(nodes) => nodes,
            Err(source) => return Err(abort(state, findings, source)),
        };
        findings.nodes_total = nodes.len();
        let node_index = index_nodes(nodes);
        state = RunState::NodesFetched;
        self.enter(state);

        let namespaces = match self.source.list_namespaces().await {
            Ok(namespaces) => namespaces,
            Err(source) => return Err(abort(state, findings, source)),
        };
        findings.namespaces_total = namespaces.as_ref().map(Vec::len);
        let namespace_index = namespaces.map(index_namespaces);
        state = RunState::NamespacesFetched;
        self.enter(state);

        let allocs = match self.source.list_allocations().await {
            Ok(allocs) => allocs,
            Err(source) => return Err(abort(state, findings, source)),
        };
        findings.allocs_total = allocs.len();
        state = RunState::AllocationsFetched;
        self.enter(state);

        let cutoff = pending_cutoff(now, self.config.pending_threshold);
        Classifier::new(&node_index, namespace_index.as_ref(), cutoff, self.observer)
            .classify(&allocs, &mut findings);
        self.enter(RunState::Classified);

        let stats = self.enrich(&mut findings).await;
        self.observer.observe(&AuditEvent::EnrichmentFinished(stats));
        self.enter(RunState::Enriched);

        findings.complete = true;
        self.enter(RunState::Complete);
        Ok(findings)
    }

    /// Enrich findings, skipping anything already present in their detail maps.
    pub async fn enrich(&self, findings: &mut Findings) -> EnrichStats {
        let mut ledger = FetchLedger::from_findings(findings);
        Enricher::new(self.source, self.observer)
            .enrich(findings, &mut ledger)
            .await
    }

    fn enter(&self, state: RunState) {
        self.observer.observe(&AuditEvent::StateChanged(state));
    }
}

fn abort(state: RunState, mut findings: Findings, source: SourceError) -> RunFailure {
    findings.complete = false;
    RunFailure {
        state,
        findings: Box::new(findings),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_are_ordered() {
        assert!(RunState::Started < RunState::NodesFetched);
        assert!(RunState::AllocationsFetched < RunState::Classified);
        assert!(RunState::Enriched < RunState::Complete);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(RunState::NamespacesFetched.to_string(), "namespaces_fetched");
        assert_eq!(RunState::Complete.describe(), "Reconciliation complete");
    }

    #[test]
    fn test_default_threshold_is_twelve_hours() {
        assert_eq!(
            AuditConfig::default().pending_threshold,
            Duration::from_secs(43_200)
        );
    }
}
