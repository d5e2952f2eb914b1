//! Error types for snapshot sources.

use thiserror::Error;

/// Result type for snapshot source operations.
pub type SourceResult<T> = Result<T, SourceError>;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while building or querying a snapshot source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The backing file or service could not be reached.
    #[error("{resource} source unavailable at {target}")]
    Unavailable {
        resource: &'static str,
        target: String,
        #[source]
        source: BoxError,
    },

    /// A required listing decoded to zero records.
    #[error("no {resource} found")]
    Empty { resource: &'static str },

    /// A record in a static listing failed to parse.
    #[error("error decoding {resource}")]
    Decode {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A detail fetch found no record with the given id.
    #[error("{kind} id {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// A live list call failed after the service was reached.
    #[error("error listing {resource}")]
    ListFailure {
        resource: &'static str,
        #[source]
        source: BoxError,
    },

    /// A live detail fetch failed for a reason other than a missing record.
    #[error("error fetching {kind} {id}")]
    FetchFailed {
        kind: &'static str,
        id: String,
        #[source]
        source: BoxError,
    },
}

impl SourceError {
    pub(crate) fn unavailable(
        resource: &'static str,
        target: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Unavailable {
            resource,
            target: target.into(),
            source: source.into(),
        }
    }

    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Returns true for a detail fetch that found nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Non-success HTTP response from the orchestration service.
#[derive(Debug, Error)]
#[error("unexpected status {status}: {body}")]
pub struct StatusError {
    pub status: u16,
    pub body: String,
}
