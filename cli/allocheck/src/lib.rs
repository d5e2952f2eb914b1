//! allocheck library surface.
//!
//! The binary is a thin wrapper over [`run`], which tests drive directly.

pub mod cli;
pub mod config;
pub mod error;
pub mod exit;
pub mod logging;
pub mod report;

use allocheck_reconcile::{AuditConfig, Auditor, TracingObserver};
use allocheck_snapshot::{LiveSource, SnapshotSource, StaticSource};
use anyhow::Context;
use tracing::info;

pub use config::{RunConfig, SourceConfig};
pub use exit::ExitStatus;

use report::ReportFile;

/// Run one audit and return the process exit status.
pub async fn run(config: RunConfig) -> ExitStatus {
    let mut output = match ReportFile::create(&config.output_path) {
        Ok(output) => output,
        Err(err) => {
            error::report("error creating output file", &err);
            return ExitStatus::OutputCreate;
        }
    };

    let source = match open_source(&config.source) {
        Ok(source) => source,
        Err(err) => {
            error::report("error opening snapshot source", &err);
            output.discard();
            return ExitStatus::SourceConstruction;
        }
    };

    let observer = TracingObserver;
    let auditor = Auditor::new(
        source.as_ref(),
        &observer,
        AuditConfig {
            pending_threshold: config.pending_threshold,
        },
    );

    let findings = match auditor.run().await {
        Ok(findings) => findings,
        Err(failure) => {
            error::report("check failed", &anyhow::Error::new(failure));
            output.discard();
            return ExitStatus::Reconcile;
        }
    };

    info!(
        allocs = findings.allocs_total,
        nodes = findings.nodes_total,
        namespaces = findings.namespaces_total,
        terminal = findings.allocs_client_terminal,
        pending_too_long = findings.allocs_pending_too_long.len(),
        missing_node = findings.allocs_missing_node.len(),
        down_node = findings.allocs_down_node.len(),
        missing_namespace = findings.allocs_missing_namespace.as_ref().map(Vec::len),
        "Checked allocations"
    );

    if let Err(err) = output.write(&findings) {
        error::report("error encoding results", &err);
        return ExitStatus::Encode;
    }

    if let Err(err) = output.close() {
        error::report("error closing output file", &err);
        return ExitStatus::OutputClose;
    }

    info!(results = %config.output_path.display(), "Completed");

    if config.print_summary {
        report::print_summary(&findings);
    }

    ExitStatus::Success
}

/// Build the snapshot source selected by the configuration.
pub fn open_source(source: &SourceConfig) -> anyhow::Result<Box<dyn SnapshotSource>> {
    let source: Box<dyn SnapshotSource> = match source {
        SourceConfig::Live(live) => {
            info!(address = %live.address, "Using HTTP API");
            Box::new(LiveSource::new(live).context("error creating client")?)
        }
        SourceConfig::Static(files) => {
            info!(
                allocs = %files.allocations_path.display(),
                namespaces = ?files.namespaces_path,
                nodes = %files.nodes_path.display(),
                "Using files"
            );
            Box::new(StaticSource::open(files).context("error opening files")?)
        }
    };
    info!(kind = source.kind(), "Snapshot source ready");
    Ok(source)
}
