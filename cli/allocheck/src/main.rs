//! allocheck - audit allocations against the nodes and namespaces they reference.
//!
//! Runs a single reconciliation pass against either the live orchestration
//! service or a set of captured listing files, writes the findings as JSON,
//! and exits. The exit code tells which stage failed.

use std::process::ExitCode;

use allocheck::cli::Cli;
use allocheck::{logging, ExitStatus};
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version land here too.
            let _ = err.print();
            return if err.use_stderr() {
                ExitStatus::Usage.into()
            } else {
                ExitStatus::Success.into()
            };
        }
    };

    logging::init(cli.log_format);

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(err) => {
            allocheck::error::report("invalid source options", &anyhow::Error::new(err));
            return ExitStatus::SourceConstruction.into();
        }
    };

    allocheck::run(config).await.into()
}
