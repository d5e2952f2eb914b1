//! # allocheck-model
//!
//! Records describing a cluster's scheduling state as the orchestration
//! service reports it.
//!
//! Field names follow the service's JSON encoding (PascalCase with `ID`
//! acronyms), so listings captured from the live API decode unchanged when
//! replayed from files.
//!
//! - Allocations (`AllocationSummary`, `AllocationDetail`)
//! - Nodes (`NodeSummary`, `NodeDetail`)
//! - Namespaces (`Namespace`)

mod alloc;
mod namespace;
mod node;

pub use alloc::{AllocationDetail, AllocationSummary, ClientStatus};
pub use namespace::Namespace;
pub use node::{NodeDetail, NodeStatus, NodeSummary};

use serde::{Deserialize, Deserializer};

/// The service encodes empty collections as `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
