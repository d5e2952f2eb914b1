//! Command-line options.

use std::path::PathBuf;
use std::time::Duration;

use allocheck_snapshot::{LiveSourceConfig, DEFAULT_ADDRESS};
use clap::{Parser, ValueEnum};

use crate::config::{parse_duration, select_source, ConfigError, RunConfig, DEFAULT_OUTPUT_PATH};

/// Audit allocations against the nodes and namespaces they reference.
///
/// Reads listings from the live service unless --allocs and --nodes point
/// at captured files.
#[derive(Debug, Parser)]
#[command(name = "allocheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// How long an allocation may stay pending before it is reported (e.g. 12h, 90m, 1h30m).
    #[arg(long, env = "ALLOCHECK_PENDING", default_value = "12h", value_parser = parse_duration)]
    pub pending: Duration,

    /// File name for writing results.
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub out: PathBuf,

    /// Allocation listing file (JSON objects, one per line).
    #[arg(long)]
    pub allocs: Option<PathBuf>,

    /// Node listing file (JSON objects, one per line).
    #[arg(long)]
    pub nodes: Option<PathBuf>,

    /// Namespace listing file (a JSON array). Namespace checks are skipped without it.
    #[arg(long)]
    pub namespaces: Option<PathBuf>,

    /// Service address for the live source.
    #[arg(long, env = "NOMAD_ADDR", default_value = DEFAULT_ADDRESS)]
    pub address: String,

    /// ACL token for the live source.
    #[arg(long, env = "NOMAD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Region to query with the live source.
    #[arg(long, env = "NOMAD_REGION")]
    pub region: Option<String>,

    /// Per-request timeout for the live source, in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Print a table of finding counts once the report is written.
    #[arg(long)]
    pub summary: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl Cli {
    /// Resolve options into a run configuration.
    pub fn into_config(self) -> Result<RunConfig, ConfigError> {
        let live = LiveSourceConfig {
            address: self.address,
            token: self.token.filter(|t| !t.is_empty()),
            region: self.region.filter(|r| !r.is_empty()),
            timeout: Duration::from_secs(self.timeout),
        };
        let source = select_source(self.allocs, self.nodes, self.namespaces, live)?;

        Ok(RunConfig {
            pending_threshold: self.pending,
            output_path: self.out,
            source,
            print_summary: self.summary,
        })
    }
}
