//! Report output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use allocheck_reconcile::Findings;
use anyhow::{Context, Result};
use colored::Colorize;
use tabled::{Table, Tabled};
use tracing::warn;

/// Output file for one run's findings.
///
/// Created before the snapshot is read so an unwritable path fails fast.
pub struct ReportFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ReportFile {
    /// Create (or truncate) the output file.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    /// Encode findings as two-space indented JSON followed by a newline.
    pub fn write(&mut self, findings: &Findings) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, findings)
            .with_context(|| format!("Failed to encode results to {}", self.path.display()))?;
        self.writer
            .write_all(b"\n")
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    /// Flush buffered output and sync the file to disk.
    ///
    /// Dropping a `File` swallows close errors, so this syncs explicitly and
    /// reports any failure to persist the report.
    pub fn close(self) -> Result<()> {
        let path = self.path;
        let file = self
            .writer
            .into_inner()
            .map_err(|e| e.into_error())
            .with_context(|| format!("Failed to flush {}", path.display()))?;
        file.sync_all()
            .with_context(|| format!("Failed to close {}", path.display()))
    }

    /// Remove the file after a fatal failure so no empty report is left behind.
    pub fn discard(self) {
        let Self { path, writer } = self;
        drop(writer);
        if let Err(e) = std::fs::remove_file(&path) {
            warn!(path = %path.display(), error = %e, "Failed to remove output file");
        }
    }
}

/// One row of the summary table.
#[derive(Debug, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Check")]
    check: &'static str,

    #[tabled(rename = "Count")]
    count: String,
}

fn summary_rows(findings: &Findings) -> Vec<SummaryRow> {
    let optional = |value: Option<usize>| {
        value
            .map(|v| v.to_string())
            .unwrap_or_else(|| "skipped".to_string())
    };

    vec![
        SummaryRow {
            check: "Allocations",
            count: findings.allocs_total.to_string(),
        },
        SummaryRow {
            check: "Nodes",
            count: findings.nodes_total.to_string(),
        },
        SummaryRow {
            check: "Namespaces",
            count: optional(findings.namespaces_total),
        },
        SummaryRow {
            check: "Client terminal",
            count: findings.allocs_client_terminal.to_string(),
        },
        SummaryRow {
            check: "Pending too long",
            count: findings.allocs_pending_too_long.len().to_string(),
        },
        SummaryRow {
            check: "Missing node",
            count: findings.allocs_missing_node.len().to_string(),
        },
        SummaryRow {
            check: "Down node",
            count: findings.allocs_down_node.len().to_string(),
        },
        SummaryRow {
            check: "Missing namespace",
            count: optional(findings.allocs_missing_namespace.as_ref().map(Vec::len)),
        },
    ]
}

/// Print finding counts to stdout.
pub fn print_summary(findings: &Findings) {
    println!("{}", Table::new(summary_rows(findings)));

    if let Some(missing) = findings
        .namespaces_missing
        .as_ref()
        .filter(|names| !names.is_empty())
    {
        println!("{} {}", "Missing namespaces:".yellow().bold(), missing.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_is_pretty_with_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        let mut findings = Findings::new();
        findings.complete = true;
        findings.allocs_total = 2;

        let mut report = ReportFile::create(&path).unwrap();
        report.write(&findings).unwrap();
        report.close().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("{\n  \"Complete\": true,\n  \"AllocsTotal\": 2,"));
        assert!(contents.ends_with("}\n"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_close_reports_unpersisted_output() {
        let path = Path::new("/dev/full");
        if !path.exists() {
            return;
        }

        let mut report = ReportFile::create(path).unwrap();
        report.write(&Findings::new()).unwrap();

        let err = report.close().unwrap_err();
        assert!(format!("{err:#}").contains("/dev/full"));
    }

    #[test]
    fn test_discard_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        ReportFile::create(&path).unwrap().discard();
        assert!(!path.exists());
    }

    #[test]
    fn test_create_fails_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        assert!(ReportFile::create(&path).is_err());
    }

    #[test]
    fn test_summary_marks_skipped_namespace_checks() {
        let rows = summary_rows(&Findings::new());
        let namespaces = rows.iter().find(|r| r.check == "Namespaces").unwrap();
        assert_eq!(namespaces.count, "skipped");

        let table = Table::new(rows).to_string();
        assert!(table.contains("Pending too long"));
    }
}
