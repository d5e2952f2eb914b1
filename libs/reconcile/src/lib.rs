//! Allocation reconciliation.
//!
//! Cross-references allocations against the nodes and namespaces they
//! reference and surfaces drift the scheduler does not report:
//!
//! - **Index**: node-by-id and namespace-by-name lookups, built once per run.
//! - **Classify**: one pass over every allocation, filling finding buckets.
//! - **Enrich**: full records fetched only for flagged allocations and their
//!   nodes, at most once per id.
//! - **Run**: drives a snapshot source through the above and reports how far
//!   it got.
//!
//! # Invariants
//!
//! - Terminal allocations are counted and never classified further
//! - Indexes are never mutated once classification starts
//! - Every flagged allocation id has a detail entry attempted exactly once

mod classify;
mod enrich;
mod findings;
mod index;
mod observer;
mod run;

pub use classify::{pending_cutoff, Classifier};
pub use enrich::{EnrichStats, Enricher, FetchLedger};
pub use findings::Findings;
pub use index::{index_namespaces, index_nodes, NamespaceIndex, NodeIndex};
pub use observer::{AuditEvent, AuditObserver, RecordingObserver, TracingObserver};
pub use run::{AuditConfig, Auditor, RunFailure, RunState, DEFAULT_PENDING_THRESHOLD};
