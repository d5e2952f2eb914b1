//! File-backed static source tests.

use std::io::Write;
use std::path::PathBuf;

use allocheck_snapshot::{SnapshotSource, SourceError, StaticSource, StaticSourceConfig};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn fixture_dir() -> (TempDir, StaticSourceConfig) {
    let dir = TempDir::new().unwrap();
    let allocations_path = write(
        &dir,
        "allocs.json",
        concat!(
            r#"{"ID":"a1","Namespace":"default","NodeID":"n1","ClientStatus":"running","JobID":"web"}"#,
            "\n",
            r#"{"ID":"a2","Namespace":"prod","NodeID":"n2","ClientStatus":"pending","JobID":"batch"}"#,
            "\n",
        ),
    );
    let nodes_path = write(
        &dir,
        "nodes.json",
        concat!(
            r#"{"ID":"n1","Name":"worker-1","Datacenter":"dc1","Status":"ready"}"#,
            "\n",
            r#"{"ID":"n2","Name":"worker-2","Datacenter":"dc1","Status":"down"}"#,
            "\n",
        ),
    );
    let namespaces_path = write(
        &dir,
        "namespaces.json",
        r#"[{"Name":"default"},{"Name":"prod"}]"#,
    );

    let config = StaticSourceConfig {
        allocations_path,
        nodes_path,
        namespaces_path: Some(namespaces_path),
    };
    (dir, config)
}

#[tokio::test]
async fn test_open_lists_every_record() {
    let (_dir, config) = fixture_dir();
    let source = StaticSource::open(&config).unwrap();

    assert_eq!(source.kind(), "static");
    assert_eq!(source.list_allocations().await.unwrap().len(), 2);
    assert_eq!(source.list_nodes().await.unwrap().len(), 2);
    assert_eq!(source.list_namespaces().await.unwrap().unwrap().len(), 2);
}

#[tokio::test]
async fn test_without_namespace_file_namespaces_are_absent() {
    let (_dir, mut config) = fixture_dir();
    config.namespaces_path = None;

    let source = StaticSource::open(&config).unwrap();
    assert!(source.list_namespaces().await.unwrap().is_none());
}

#[tokio::test]
async fn test_detail_lookups_scan_listings() {
    let (_dir, config) = fixture_dir();
    let source = StaticSource::open(&config).unwrap();

    let alloc = source.get_allocation("a2").await.unwrap();
    assert_eq!(alloc.summary.job_id, "batch");
    assert!(alloc.job.is_none());

    let node = source.get_node("n2").await.unwrap();
    assert_eq!(node.summary.name, "worker-2");
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let (_dir, config) = fixture_dir();
    let source = StaticSource::open(&config).unwrap();

    let err = source.get_allocation("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "alloc id missing not found");

    let err = source.get_node("missing").await.unwrap_err();
    assert_eq!(err.to_string(), "node id missing not found");
}

#[test]
fn test_empty_allocation_file_fails() {
    let (dir, mut config) = fixture_dir();
    config.allocations_path = write(&dir, "empty.json", "");

    let err = StaticSource::open(&config).unwrap_err();
    assert!(matches!(
        err,
        SourceError::Empty {
            resource: "allocations"
        }
    ));
}

#[test]
fn test_missing_file_is_unavailable() {
    let (dir, mut config) = fixture_dir();
    config.nodes_path = dir.path().join("does-not-exist.json");

    let err = StaticSource::open(&config).unwrap_err();
    match err {
        SourceError::Unavailable {
            resource, target, ..
        } => {
            assert_eq!(resource, "nodes");
            assert!(target.ends_with("does-not-exist.json"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
