//! Snapshot source backed by listings captured to files.
//!
//! Allocation and node files hold a stream of JSON objects (one per line in
//! practice, but any whitespace separation decodes). The namespace file is a
//! single JSON array and is optional.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use allocheck_model::{AllocationDetail, AllocationSummary, Namespace, NodeDetail, NodeSummary};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{SnapshotSource, SourceError, SourceResult};

/// Paths for a file-backed snapshot.
#[derive(Debug, Clone)]
pub struct StaticSourceConfig {
    pub allocations_path: PathBuf,
    pub nodes_path: PathBuf,
    pub namespaces_path: Option<PathBuf>,
}

/// In-memory snapshot decoded once at construction.
#[derive(Debug, Clone)]
pub struct StaticSource {
    allocations: Vec<AllocationSummary>,
    nodes: Vec<NodeSummary>,
    namespaces: Option<Vec<Namespace>>,
}

impl StaticSource {
    /// Open and decode the configured files.
    pub fn open(config: &StaticSourceConfig) -> SourceResult<Self> {
        let allocations = open_file("allocations", &config.allocations_path)?;
        let namespaces = config
            .namespaces_path
            .as_deref()
            .map(|path| open_file("namespaces", path))
            .transpose()?;
        let nodes = open_file("nodes", &config.nodes_path)?;

        let source = Self::from_readers(allocations, nodes, namespaces)?;
        debug!(
            allocations = source.allocations.len(),
            nodes = source.nodes.len(),
            namespaces = source.namespaces.as_ref().map(Vec::len),
            "Decoded static snapshot"
        );
        Ok(source)
    }

    /// Decode a snapshot from already-open streams.
    pub fn from_readers<A, N, S>(
        allocations: A,
        nodes: N,
        namespaces: Option<S>,
    ) -> SourceResult<Self>
    where
        A: Read,
        N: Read,
        S: Read,
    {
        let allocations = decode_stream("allocations", allocations)?;
        if allocations.is_empty() {
            return Err(SourceError::Empty {
                resource: "allocations",
            });
        }

        let namespaces = namespaces
            .map(|reader| decode_array::<Namespace, _>("namespaces", reader))
            .transpose()?;

        let nodes = decode_stream("nodes", nodes)?;

        Self::from_records(allocations, nodes, namespaces)
    }

    /// Build a snapshot from records already in memory.
    ///
    /// Enforces the same emptiness rules as the file-backed constructors.
    pub fn from_records(
        allocations: Vec<AllocationSummary>,
        nodes: Vec<NodeSummary>,
        namespaces: Option<Vec<Namespace>>,
    ) -> SourceResult<Self> {
        if allocations.is_empty() {
            return Err(SourceError::Empty {
                resource: "allocations",
            });
        }
        // An empty namespace snapshot would flag every allocation.
        if namespaces.as_ref().is_some_and(Vec::is_empty) {
            return Err(SourceError::Empty {
                resource: "namespaces",
            });
        }

        Ok(Self {
            allocations,
            nodes,
            namespaces,
        })
    }
}

fn open_file(resource: &'static str, path: &Path) -> SourceResult<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| SourceError::unavailable(resource, path.display().to_string(), e))
}

fn decode_stream<T, R>(resource: &'static str, reader: R) -> SourceResult<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    serde_json::Deserializer::from_reader(reader)
        .into_iter::<T>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| SourceError::Decode { resource, source })
}

fn decode_array<T, R>(resource: &'static str, reader: R) -> SourceResult<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    serde_json::from_reader(reader).map_err(|source| SourceError::Decode { resource, source })
}

#[async_trait]
impl SnapshotSource for StaticSource {
    fn kind(&self) -> &'static str {
        "static"
    }

    async fn list_allocations(&self) -> SourceResult<Vec<AllocationSummary>> {
        Ok(self.allocations.clone())
    }

    async fn list_nodes(&self) -> SourceResult<Vec<NodeSummary>> {
        Ok(self.nodes.clone())
    }

    async fn list_namespaces(&self) -> SourceResult<Option<Vec<Namespace>>> {
        Ok(self.namespaces.clone())
    }

    async fn get_allocation(&self, id: &str) -> SourceResult<AllocationDetail> {
        self.allocations
            .iter()
            .find(|a| a.id == id)
            .map(|a| AllocationDetail::from(a.clone()))
            .ok_or_else(|| SourceError::not_found("alloc", id))
    }

    async fn get_node(&self, id: &str) -> SourceResult<NodeDetail> {
        self.nodes
            .iter()
            .find(|n| n.id == id)
            .map(|n| NodeDetail::from(n.clone()))
            .ok_or_else(|| SourceError::not_found("node", id))
    }
}
