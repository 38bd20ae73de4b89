//! Integration tests for download, upload and delete

use std::io::Write;

use boxio_core::domain::{RemoteId, RemoteItem, TransferError};
use boxio_core::ports::RemoteStorage;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

fn item(id: &str, name: &str, size: u64) -> RemoteItem {
    RemoteItem::file(RemoteId::new(id.to_string()).unwrap(), name, Some(size))
}

async fn temp_source(content: &[u8]) -> (tempfile::NamedTempFile, tokio::fs::File, u64) {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content).unwrap();
    file.flush().unwrap();
    let source = tokio::fs::File::open(file.path()).await.unwrap();
    (file, source, content.len() as u64)
}

// ============================================================================
// Download tests
// ============================================================================

#[tokio::test]
async fn test_download_streams_content_into_sink() {
    let (server, storage) = common::setup_box_mock().await;
    let content = b"Hello, Box! This is test content.";
    common::mount_download(&server, "701", content).await;

    let session = common::connect(&storage).await;
    let mut sink: Vec<u8> = Vec::new();
    let mut samples = Vec::new();
    let mut record = |done: u64, total: u64| samples.push((done, total));

    storage
        .download(&session, &item("701", "hello.txt", 33), &mut sink, &mut record)
        .await
        .expect("download failed");

    assert_eq!(sink, content);
    assert_eq!(samples.first(), Some(&(0, content.len() as u64)));
    assert_eq!(
        samples.last(),
        Some(&(content.len() as u64, content.len() as u64))
    );
}

#[tokio::test]
async fn test_download_large_file_progress_is_monotonic() {
    let (server, storage) = common::setup_box_mock().await;
    let content: Vec<u8> = (0..1_048_576).map(|i| (i % 256) as u8).collect();
    common::mount_download(&server, "702", &content).await;

    let session = common::connect(&storage).await;
    let mut sink: Vec<u8> = Vec::new();
    let mut samples: Vec<(u64, u64)> = Vec::new();
    let mut record = |done: u64, total: u64| samples.push((done, total));

    storage
        .download(
            &session,
            &item("702", "big.bin", 1_048_576),
            &mut sink,
            &mut record,
        )
        .await
        .unwrap();

    assert_eq!(sink.len(), 1_048_576);
    assert!(samples.windows(2).all(|w| w[0].0 <= w[1].0));
    assert!(samples.iter().all(|(done, total)| done <= total));
}

#[tokio::test]
async fn test_download_empty_file() {
    let (server, storage) = common::setup_box_mock().await;
    common::mount_download(&server, "703", &[]).await;

    let session = common::connect(&storage).await;
    let mut sink: Vec<u8> = Vec::new();
    let mut samples = Vec::new();
    let mut record = |done: u64, total: u64| samples.push((done, total));

    storage
        .download(&session, &item("703", "empty", 0), &mut sink, &mut record)
        .await
        .unwrap();

    assert!(sink.is_empty());
    assert_eq!(samples.last(), Some(&(0, 0)));
}

#[tokio::test]
async fn test_download_missing_item_is_transient() {
    let (server, storage) = common::setup_box_mock().await;
    Mock::given(method("GET"))
        .and(path("/files/404/content"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "code": "not_found",
            "message": "Item is trashed"
        })))
        .mount(&server)
        .await;

    let session = common::connect(&storage).await;
    let mut sink: Vec<u8> = Vec::new();
    let err = storage
        .download(&session, &item("404", "gone", 1), &mut sink, &mut |_, _| {})
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::Transient(_)), "got {err:?}");
}

#[tokio::test]
async fn test_download_forbidden_is_remote_error() {
    let (server, storage) = common::setup_box_mock().await;
    Mock::given(method("GET"))
        .and(path("/files/403/content"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let session = common::connect(&storage).await;
    let mut sink: Vec<u8> = Vec::new();
    let err = storage
        .download(&session, &item("403", "locked", 1), &mut sink, &mut |_, _| {})
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::Remote { status: 403, .. }), "got {err:?}");
}

// ============================================================================
// Upload tests
// ============================================================================

#[tokio::test]
async fn test_upload_returns_created_item() {
    let (server, storage) = common::setup_box_mock().await;
    Mock::given(method("POST"))
        .and(path("/files/content"))
        .and(header(
            "authorization",
            format!("Bearer {}", common::ACCESS_TOKEN).as_str(),
        ))
        .and(body_string_contains(r#""parent":{"id":"4242"}"#))
        .and(body_string_contains("report contents"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "total_count": 1,
            "entries": [common::file_entry("9001", "report.txt", 15)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = common::connect(&storage).await;
    let (_guard, source, len) = temp_source(b"report contents").await;
    let mut samples = Vec::new();
    let mut record = |done: u64, total: u64| samples.push((done, total));

    let created = storage
        .upload(&session, source, len, "report.txt", &mut record)
        .await
        .expect("upload failed")
        .expect("upload acknowledged");

    assert_eq!(created.id.as_str(), "9001");
    assert_eq!(created.name, "report.txt");
    assert_eq!(samples.first(), Some(&(0, len)));
    assert_eq!(samples.last(), Some(&(len, len)));
}

#[tokio::test]
async fn test_upload_without_entries_is_unacknowledged() {
    let (server, storage) = common::setup_box_mock().await;
    Mock::given(method("POST"))
        .and(path("/files/content"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "total_count": 0,
            "entries": []
        })))
        .mount(&server)
        .await;

    let session = common::connect(&storage).await;
    let (_guard, source, len) = temp_source(b"abc").await;

    let result = storage
        .upload(&session, source, len, "a.txt", &mut |_, _| {})
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_upload_name_conflict_is_remote_error() {
    let (server, storage) = common::setup_box_mock().await;
    Mock::given(method("POST"))
        .and(path("/files/content"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "code": "item_name_in_use",
            "message": "Item with the same name already exists"
        })))
        .mount(&server)
        .await;

    let session = common::connect(&storage).await;
    let (_guard, source, len) = temp_source(b"abc").await;

    let err = storage
        .upload(&session, source, len, "a.txt", &mut |_, _| {})
        .await
        .unwrap_err();

    match err {
        TransferError::Remote { status, message } => {
            assert_eq!(status, 409);
            assert!(message.contains("item_name_in_use"));
        }
        other => panic!("expected Remote, got {other:?}"),
    }
}

// ============================================================================
// Delete tests
// ============================================================================

#[tokio::test]
async fn test_delete_item() {
    let (server, storage) = common::setup_box_mock().await;
    Mock::given(method("DELETE"))
        .and(path("/files/801"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let session = common::connect(&storage).await;
    storage
        .delete(&session, &item("801", "done.txt", 1))
        .await
        .expect("delete failed");
}

#[tokio::test]
async fn test_delete_already_gone_is_transient() {
    let (server, storage) = common::setup_box_mock().await;
    Mock::given(method("DELETE"))
        .and(path("/files/802"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let session = common::connect(&storage).await;
    let err = storage
        .delete(&session, &item("802", "gone.txt", 1))
        .await
        .unwrap_err();
    assert!(err.is_transient());
}
