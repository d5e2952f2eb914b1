//! Run configuration.
//!
//! Handles:
//! - Pending threshold parsing (Go-style durations such as `1h30m`)
//! - Choosing between the live and static snapshot sources

use std::path::PathBuf;
use std::time::Duration;

use allocheck_snapshot::{LiveSourceConfig, StaticSourceConfig};
use thiserror::Error;

/// Report file name used when none is given.
pub const DEFAULT_OUTPUT_PATH: &str = "allocheck.json";

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Pending allocations unmodified for longer than this are reported.
    pub pending_threshold: Duration,

    /// Where the report is written.
    pub output_path: PathBuf,

    /// Which snapshot source backs the run.
    pub source: SourceConfig,

    /// Print a findings table to stdout once the report is written.
    pub print_summary: bool,
}

/// Snapshot source selection, decided once per run.
#[derive(Debug, Clone)]
pub enum SourceConfig {
    Live(LiveSourceConfig),
    Static(StaticSourceConfig),
}

/// Invalid source option combinations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--{given} requires --{missing} when reading from files")]
    IncompleteStaticPaths {
        given: &'static str,
        missing: &'static str,
    },

    #[error("--namespaces requires --allocs and --nodes")]
    NamespacesWithoutStatic,
}

/// Pick the snapshot source. Supplying the allocation and node paths selects
/// the static source; supplying neither selects the live one.
pub fn select_source(
    allocations: Option<PathBuf>,
    nodes: Option<PathBuf>,
    namespaces: Option<PathBuf>,
    live: LiveSourceConfig,
) -> Result<SourceConfig, ConfigError> {
    match (allocations, nodes) {
        (Some(allocations_path), Some(nodes_path)) => Ok(SourceConfig::Static(StaticSourceConfig {
            allocations_path,
            nodes_path,
            namespaces_path: namespaces,
        })),
        (Some(_), None) => Err(ConfigError::IncompleteStaticPaths {
            given: "allocs",
            missing: "nodes",
        }),
        (None, Some(_)) => Err(ConfigError::IncompleteStaticPaths {
            given: "nodes",
            missing: "allocs",
        }),
        (None, None) if namespaces.is_some() => Err(ConfigError::NamespacesWithoutStatic),
        (None, None) => Ok(SourceConfig::Live(live)),
    }
}

/// Parse a duration such as `12h`, `90m`, `1h30m`, `1.5h`, or `500ms`.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut nanos = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        if number.is_empty() {
            return Err(format!("invalid duration {input:?}: expected a number"));
        }
        let value: f64 = number
            .parse()
            .map_err(|_| format!("invalid duration {input:?}: bad number {number:?}"))?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let scale = match unit {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60.0 * 1e9,
            "h" => 3600.0 * 1e9,
            "" => return Err(format!("invalid duration {input:?}: missing unit")),
            other => return Err(format!("invalid duration {input:?}: unknown unit {other:?}")),
        };

        nanos += value * scale;
        rest = tail;
    }

    if !nanos.is_finite() || nanos > u64::MAX as f64 {
        return Err(format!("invalid duration {input:?}: out of range"));
    }
    Ok(Duration::from_nanos(nanos.round() as u64))
}
