//! Error reporting for fatal failures.

use allocheck_snapshot::SourceError;
use colored::Colorize;
use tracing::error;

/// Log a fatal error with its cause chain and print an operator hint when
/// one applies.
pub fn report(context: &str, err: &anyhow::Error) {
    error!(error = %format!("{err:#}"), "{}", context);

    if let Some(hint) = hint(err) {
        eprintln!("{}", format!("Hint: {hint}").as_str().yellow());
    }
}

fn hint(err: &anyhow::Error) -> Option<&'static str> {
    // A run failure's source is the listing error, so it is in the chain too.
    let source = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<SourceError>())?;

    match source {
        SourceError::Unavailable { target, .. } if target.starts_with("http") => {
            Some("Check NOMAD_ADDR (or --address) and that the service is reachable.")
        }
        SourceError::Unavailable { .. } => Some("Check that the snapshot file paths exist."),
        SourceError::Empty { .. } => {
            Some("The snapshot file holds no records; capture the listing again.")
        }
        SourceError::Decode { .. } => {
            Some("Snapshot files must hold JSON objects (allocations, nodes) or a JSON array (namespaces).")
        }
        SourceError::ListFailure { .. } => {
            Some("Check that NOMAD_TOKEN grants read access to all namespaces and nodes.")
        }
        SourceError::NotFound { .. } | SourceError::FetchFailed { .. } => None,
    }
}
