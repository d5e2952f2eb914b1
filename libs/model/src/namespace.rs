//! Namespace records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A logical partition scoping allocations. Only the name matters for
/// existence checks; the rest is carried for completeness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Namespace {
    pub name: String,

    pub description: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub quota: String,

    #[serde(
        deserialize_with = "crate::null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub meta: BTreeMap<String, String>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
