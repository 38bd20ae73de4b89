//! Shared test helpers for Box API integration tests
//!
//! Each helper mounts the endpoints a scenario needs on a wiremock server
//! and returns a storage adapter pointing at it.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use boxio_api::client::BoxClient;
use boxio_api::provider::BoxStorage;
use boxio_core::domain::{Credentials, Session};
use boxio_core::ports::RemoteStorage;

pub const TEST_KEY: &str = include_str!("../fixtures/test_key.pem");
pub const FOLDER_ID: &str = "4242";
pub const ACCESS_TOKEN: &str = "test-access-token";

/// Credentials signed with the fixture key, bound to [`FOLDER_ID`]
pub fn test_credentials() -> Credentials {
    let props: HashMap<String, String> = [
        ("private_key", STANDARD.encode(TEST_KEY)),
        ("public_key_id", "kid-test".to_string()),
        ("private_key_password", "test-pass".to_string()),
        ("user_id", "31337".to_string()),
        ("client_id", "client-abc".to_string()),
        ("client_secret", "secret-xyz".to_string()),
        ("folder_id", FOLDER_ID.to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    Credentials::from_properties(&props).expect("fixture credentials are valid")
}

/// Mounts a token endpoint that accepts any JWT bearer assertion
pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant-type%3Ajwt-bearer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": ACCESS_TOKEN,
            "expires_in": 3600,
            "token_type": "bearer"
        })))
        .mount(server)
        .await;
}

/// Mounts `GET /folders/{FOLDER_ID}`
pub async fn mount_folder(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/folders/{FOLDER_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "type": "folder",
            "id": FOLDER_ID,
            "name": name
        })))
        .mount(server)
        .await;
}

/// Starts a server with token and folder endpoints mounted
pub async fn setup_box_mock() -> (MockServer, BoxStorage) {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_folder(&server, "Inbox").await;

    let storage = BoxStorage::new(BoxClient::with_base_url(server.uri()));
    (server, storage)
}

/// Connects `storage` and returns the live session
pub async fn connect(storage: &BoxStorage) -> Session {
    storage
        .connect(&test_credentials())
        .await
        .expect("connect against mock server")
}

/// Mounts one page of `GET /folders/{FOLDER_ID}/items` at `offset`
pub async fn mount_items_page(
    server: &MockServer,
    offset: u64,
    total_count: u64,
    entries: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path(format!("/folders/{FOLDER_ID}/items")))
        .and(query_param("offset", offset.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total_count": total_count,
            "entries": entries,
            "offset": offset,
            "limit": 100
        })))
        .mount(server)
        .await;
}

/// Mounts `GET /files/{id}/content` returning `content`
pub async fn mount_download(server: &MockServer, id: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/files/{id}/content")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}

/// JSON for a file entry as the API lists it
pub fn file_entry(id: &str, name: &str, size: u64) -> serde_json::Value {
    serde_json::json!({ "type": "file", "id": id, "name": name, "size": size })
}
