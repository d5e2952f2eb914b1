//! Record builders.

use std::io::Write;
use std::path::Path;

use allocheck_model::{AllocationSummary, ClientStatus, Namespace, NodeStatus, NodeSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Start building an allocation. Defaults: namespace `default`, node `n1`,
/// status running, modified at the Unix epoch.
pub fn alloc(id: &str) -> AllocationBuilder {
    AllocationBuilder {
        inner: AllocationSummary {
            id: id.to_string(),
            name: format!("{id}.web[0]"),
            namespace: "default".to_string(),
            node_id: "n1".to_string(),
            job_id: "web".to_string(),
            task_group: "web".to_string(),
            desired_status: "run".to_string(),
            client_status: ClientStatus::Running,
            ..Default::default()
        },
    }
}

/// Builder for [`AllocationSummary`].
#[derive(Debug, Clone)]
pub struct AllocationBuilder {
    inner: AllocationSummary,
}

impl AllocationBuilder {
    pub fn namespace(mut self, namespace: &str) -> Self {
        self.inner.namespace = namespace.to_string();
        self
    }

    pub fn node(mut self, node_id: &str) -> Self {
        self.inner.node_id = node_id.to_string();
        self
    }

    pub fn status(mut self, status: ClientStatus) -> Self {
        self.inner.client_status = status;
        self
    }

    pub fn modified(mut self, at: DateTime<Utc>) -> Self {
        self.inner.modify_time = at.timestamp_nanos_opt().unwrap_or(i64::MAX);
        self
    }

    pub fn build(self) -> AllocationSummary {
        self.inner
    }
}

/// A node with the given status.
pub fn node(id: &str, status: NodeStatus) -> NodeSummary {
    NodeSummary {
        id: id.to_string(),
        name: format!("worker-{id}"),
        datacenter: "dc1".to_string(),
        node_class: "compute".to_string(),
        node_pool: "default".to_string(),
        scheduling_eligibility: "eligible".to_string(),
        status,
        ..Default::default()
    }
}

/// Namespaces with the given names.
pub fn namespaces(names: &[&str]) -> Vec<Namespace> {
    names.iter().map(|name| Namespace::new(*name)).collect()
}

/// Write records as concatenated JSON objects, one per line.
pub fn write_json_lines<T: Serialize>(path: &Path, records: &[T]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    for record in records {
        serde_json::to_writer(&mut file, record)?;
        file.write_all(b"\n")?;
    }
    file.flush()
}
