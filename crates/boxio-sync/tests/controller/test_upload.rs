//! Upload sequence: ordering, per-path isolation, acknowledgment

use std::path::{Path, PathBuf};
use std::sync::Arc;

use boxio_core::domain::TransferTask;
use boxio_sync::SyncController;

use crate::fake::{self, Failure, FakeStorage, RecordingSleeper};

async fn upload(storage: &FakeStorage, paths: Vec<PathBuf>) -> bool {
    SyncController::new(Arc::new(storage.clone()), fake::credentials())
        .with_sleeper(Arc::new(RecordingSleeper::default()))
        .with_progress(false)
        .run(TransferTask::Upload { paths })
        .await
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn uploaded_names(storage: &FakeStorage) -> Vec<String> {
    storage.uploaded().into_iter().map(|(name, _)| name).collect()
}

#[tokio::test]
async fn test_upload_each_file_under_base_name() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("nested");
    std::fs::create_dir(&nested).unwrap();
    let paths = vec![
        write(dir.path(), "one.txt", "1"),
        write(&nested, "two.txt", "22"),
        write(dir.path(), "three.txt", "333"),
    ];

    let storage = FakeStorage::new();
    assert!(upload(&storage, paths).await);
    assert_eq!(
        storage.uploaded(),
        [
            ("one.txt".to_string(), b"1".to_vec()),
            ("two.txt".to_string(), b"22".to_vec()),
            ("three.txt".to_string(), b"333".to_vec()),
        ]
    );
    assert_eq!(storage.remaining(), ["one.txt", "two.txt", "three.txt"]);
}

#[tokio::test]
async fn test_upload_skips_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FakeStorage::new();
    let paths = vec![
        write(dir.path(), "a.txt", "a"),
        dir.path().join("missing.txt"),
        write(dir.path(), "b.txt", "b"),
    ];

    assert!(upload(&storage, paths).await);
    assert_eq!(uploaded_names(&storage), ["a.txt", "b.txt"]);
}

#[tokio::test]
async fn test_upload_skips_directories_and_nameless_paths() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FakeStorage::new();
    let paths = vec![
        dir.path().to_path_buf(),
        dir.path().join(".."),
        write(dir.path(), "only.txt", "x"),
    ];

    assert!(upload(&storage, paths).await);
    assert_eq!(uploaded_names(&storage), ["only.txt"]);
}

#[tokio::test]
async fn test_upload_unacknowledged_short_circuits() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FakeStorage::new().fail_upload("a.txt", Failure::NoAck);
    let paths = vec![
        write(dir.path(), "a.txt", "a"),
        write(dir.path(), "b.txt", "b"),
    ];

    assert!(!upload(&storage, paths).await);
    assert!(storage.uploaded().is_empty());
}

#[tokio::test]
async fn test_upload_remote_error_skips_path() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FakeStorage::new().fail_upload("a.txt", Failure::Remote);
    let paths = vec![
        write(dir.path(), "a.txt", "a"),
        write(dir.path(), "b.txt", "b"),
    ];

    assert!(upload(&storage, paths).await);
    assert_eq!(uploaded_names(&storage), ["b.txt"]);
    assert_eq!(storage.connects(), 1);
}

#[tokio::test]
async fn test_upload_transient_error_reconnects() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FakeStorage::new().fail_upload("a.txt", Failure::Transient);
    let paths = vec![
        write(dir.path(), "a.txt", "a"),
        write(dir.path(), "b.txt", "b"),
    ];

    assert!(upload(&storage, paths).await);
    assert_eq!(storage.connects(), 2);
    assert_eq!(uploaded_names(&storage), ["b.txt"]);
}

#[tokio::test]
async fn test_upload_failed_reconnect_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FakeStorage::new()
        .fail_upload("a.txt", Failure::Transient)
        .connect_outcomes(&[true, false]);
    let paths = vec![
        write(dir.path(), "a.txt", "a"),
        write(dir.path(), "b.txt", "b"),
    ];

    assert!(!upload(&storage, paths).await);
    assert!(storage.uploaded().is_empty());
}
