//! Snapshot sources for allocheck.
//!
//! A snapshot source hands the reconciliation engine read-only listings of
//! allocations, nodes, and namespaces, plus full records on demand:
//!
//! - **Live**: each call is a round-trip to the orchestration service's HTTP API.
//! - **Static**: listings decoded once from files captured earlier.
//!
//! The engine only sees the [`SnapshotSource`] trait; which variant backs a
//! run is decided once at startup.

mod error;
mod live;
mod static_source;

use allocheck_model::{AllocationDetail, AllocationSummary, Namespace, NodeDetail, NodeSummary};
use async_trait::async_trait;

pub use error::{SourceError, SourceResult, StatusError};
pub use live::{LiveSource, LiveSourceConfig, DEFAULT_ADDRESS, DEFAULT_REQUEST_TIMEOUT};
pub use static_source::{StaticSource, StaticSourceConfig};

/// Read-only view of cluster listings for one run.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Short name of the backing variant, for logs.
    fn kind(&self) -> &'static str;

    /// List every allocation across all namespaces.
    async fn list_allocations(&self) -> SourceResult<Vec<AllocationSummary>>;

    /// List every node.
    async fn list_nodes(&self) -> SourceResult<Vec<NodeSummary>>;

    /// List every namespace.
    ///
    /// Returns `None` when the source has no namespace snapshot, in which
    /// case namespace checks are skipped for the whole run.
    async fn list_namespaces(&self) -> SourceResult<Option<Vec<Namespace>>>;

    /// Fetch the full record for one allocation.
    async fn get_allocation(&self, id: &str) -> SourceResult<AllocationDetail>;

    /// Fetch the full record for one node.
    async fn get_node(&self, id: &str) -> SourceResult<NodeDetail>;
}
