//! Instrumented in-memory snapshot source.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use allocheck_model::{AllocationDetail, AllocationSummary, Namespace, NodeDetail, NodeSummary};
use allocheck_snapshot::{SnapshotSource, SourceError, SourceResult, StaticSource, StatusError};
use async_trait::async_trait;

/// Wraps a [`StaticSource`], counting calls and injecting failures.
pub struct MockSource {
    inner: StaticSource,
    failing_lists: HashSet<&'static str>,
    failing_allocations: HashSet<String>,
    failing_nodes: HashSet<String>,
    calls: Mutex<HashMap<String, usize>>,
}

impl MockSource {
    /// Build from records. Panics if the records would be rejected by a
    /// static source (empty allocation list).
    pub fn new(
        allocations: Vec<AllocationSummary>,
        nodes: Vec<NodeSummary>,
        namespaces: Option<Vec<Namespace>>,
    ) -> Self {
        let inner = StaticSource::from_records(allocations, nodes, namespaces)
            .expect("mock source records must be non-empty");
        Self {
            inner,
            failing_lists: HashSet::new(),
            failing_allocations: HashSet::new(),
            failing_nodes: HashSet::new(),
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Make the named list call (`allocations`, `nodes`, `namespaces`) fail.
    pub fn fail_list(mut self, resource: &'static str) -> Self {
        self.failing_lists.insert(resource);
        self
    }

    /// Make detail fetches for this allocation id fail with a server error.
    pub fn fail_allocation(mut self, id: &str) -> Self {
        self.failing_allocations.insert(id.to_string());
        self
    }

    /// Make detail fetches for this node id fail with a server error.
    pub fn fail_node(mut self, id: &str) -> Self {
        self.failing_nodes.insert(id.to_string());
        self
    }

    /// Number of calls recorded under a key such as `get_allocation:a1`
    /// or `list_nodes`.
    pub fn calls(&self, key: &str) -> usize {
        self.calls.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    /// Total detail fetches of either kind.
    pub fn detail_fetches(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key.starts_with("get_"))
            .map(|(_, count)| count)
            .sum()
    }

    fn record(&self, key: String) {
        *self.calls.lock().unwrap().entry(key).or_insert(0) += 1;
    }

    fn check_list(&self, resource: &'static str) -> SourceResult<()> {
        self.record(format!("list_{resource}"));
        if self.failing_lists.contains(resource) {
            return Err(SourceError::ListFailure {
                resource,
                source: Box::new(server_error()),
            });
        }
        Ok(())
    }
}

fn server_error() -> StatusError {
    StatusError {
        status: 500,
        body: "injected failure".to_string(),
    }
}

#[async_trait]
impl SnapshotSource for MockSource {
    fn kind(&self) -> &'static str {
        "mock"
    }

    async fn list_allocations(&self) -> SourceResult<Vec<AllocationSummary>> {
        self.check_list("allocations")?;
        self.inner.list_allocations().await
    }

    async fn list_nodes(&self) -> SourceResult<Vec<NodeSummary>> {
        self.check_list("nodes")?;
        self.inner.list_nodes().await
    }

    async fn list_namespaces(&self) -> SourceResult<Option<Vec<Namespace>>> {
        self.check_list("namespaces")?;
        self.inner.list_namespaces().await
    }

    async fn get_allocation(&self, id: &str) -> SourceResult<AllocationDetail> {
        self.record(format!("get_allocation:{id}"));
        if self.failing_allocations.contains(id) {
            return Err(SourceError::FetchFailed {
                kind: "alloc",
                id: id.to_string(),
                source: Box::new(server_error()),
            });
        }
        self.inner.get_allocation(id).await
    }

    async fn get_node(&self, id: &str) -> SourceResult<NodeDetail> {
        self.record(format!("get_node:{id}"));
        if self.failing_nodes.contains(id) {
            return Err(SourceError::FetchFailed {
                kind: "node",
                id: id.to_string(),
                source: Box::new(server_error()),
            });
        }
        self.inner.get_node(id).await
    }
}
