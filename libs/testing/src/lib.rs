//! Test support for allocheck crates.
//!
//! - Builders for allocation, node, and namespace records
//! - [`MockSource`], an in-memory snapshot source that counts detail fetches
//!   and can be told to fail specific calls
//! - Helpers for writing static snapshot files

mod fixtures;
mod mock_source;

pub use fixtures::{alloc, namespaces, node, write_json_lines, AllocationBuilder};
pub use mock_source::MockSource;
