//! Integration tests for authentication and folder binding

use boxio_api::client::BoxClient;
use boxio_api::provider::BoxStorage;
use boxio_core::domain::ConnectionError;
use boxio_core::ports::RemoteStorage;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_connect_binds_folder() {
    let (_server, storage) = common::setup_box_mock().await;

    let session = common::connect(&storage).await;

    assert_eq!(session.folder_id().as_str(), common::FOLDER_ID);
    assert_eq!(session.folder_name(), "Inbox");
    assert_eq!(session.token().as_str(), common::ACCESS_TOKEN);
    assert!(!session.token().is_expired());
}

#[tokio::test]
async fn test_connect_sends_bearer_token_to_folder_lookup() {
    let server = MockServer::start().await;
    common::mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("/folders/{}", common::FOLDER_ID)))
        .and(header(
            "authorization",
            format!("Bearer {}", common::ACCESS_TOKEN).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": common::FOLDER_ID,
            "name": "Shared"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = BoxStorage::new(BoxClient::with_base_url(server.uri()));
    let session = common::connect(&storage).await;
    assert_eq!(session.folder_name(), "Shared");
}

#[tokio::test]
async fn test_connect_rejected_by_token_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Signature verification error"
        })))
        .mount(&server)
        .await;

    let storage = BoxStorage::new(BoxClient::with_base_url(server.uri()));
    let err = storage
        .connect(&common::test_credentials())
        .await
        .unwrap_err();

    match err {
        ConnectionError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("Signature verification"));
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connect_unknown_folder() {
    let server = MockServer::start().await;
    common::mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("/folders/{}", common::FOLDER_ID)))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "type": "error",
            "status": 404,
            "code": "not_found",
            "message": "Not Found"
        })))
        .mount(&server)
        .await;

    let storage = BoxStorage::new(BoxClient::with_base_url(server.uri()));
    let err = storage
        .connect(&common::test_credentials())
        .await
        .unwrap_err();

    assert!(
        matches!(err, ConnectionError::FolderUnavailable { ref folder, .. } if folder == common::FOLDER_ID),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_connect_unreachable_host() {
    // Nothing listens on the discard port.
    let storage = BoxStorage::new(BoxClient::with_base_url("http://127.0.0.1:9"));
    let err = storage
        .connect(&common::test_credentials())
        .await
        .unwrap_err();

    assert!(matches!(err, ConnectionError::Unreachable(_)), "got {err:?}");
}
