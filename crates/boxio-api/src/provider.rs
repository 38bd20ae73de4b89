//! Box implementation of the [`RemoteStorage`] port

use async_trait::async_trait;
use boxio_core::domain::{ConnectionError, Credentials, RemoteItem, Session, TransferError};
use boxio_core::ports::{ItemStream, ProgressFn, RemoteStorage};
use reqwest::Method;
use serde::Deserialize;
use tokio::io::AsyncWrite;
use tracing::info;

use crate::client::BoxClient;
use crate::{auth, listing, transfer, BoxApiError};

/// Subset of `GET /folders/{id}` used to confirm the bound folder
#[derive(Debug, Deserialize)]
struct FolderInfo {
    #[serde(default)]
    name: String,
}

/// [`RemoteStorage`] backed by the Box content and upload APIs
#[derive(Debug, Clone)]
pub struct BoxStorage {
    client: BoxClient,
}

impl BoxStorage {
    pub fn new(client: BoxClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteStorage for BoxStorage {
    #[tracing::instrument(skip_all, fields(folder = %credentials.folder_id()))]
    async fn connect(&self, credentials: &Credentials) -> Result<Session, ConnectionError> {
        let token = auth::authenticate(&self.client, credentials).await?;

        let folder_id = credentials.folder_id().clone();
        let path = format!("/folders/{folder_id}");
        let response = self
            .client
            .execute_with_retry("get_folder", || {
                self.client
                    .request(Method::GET, &path, &token)
                    .query(&[("fields", "id,name")])
            })
            .await
            .map_err(|e| match e {
                BoxApiError::NetworkError(e) if e.status().is_none() => {
                    ConnectionError::Unreachable(e.to_string())
                }
                other => ConnectionError::FolderUnavailable {
                    folder: folder_id.to_string(),
                    message: other.to_string(),
                },
            })?;

        let folder: FolderInfo = response
            .json()
            .await
            .map_err(|e| ConnectionError::Unreachable(format!("invalid folder response: {e}")))?;

        info!(name = %folder.name, "Bound to remote folder");
        Ok(Session::new(token, folder_id, folder.name))
    }

    fn enumerate<'a>(&'a self, session: &Session) -> ItemStream<'a> {
        listing::folder_items(&self.client, session.clone())
    }

    async fn download(
        &self,
        session: &Session,
        item: &RemoteItem,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
        on_progress: ProgressFn<'_>,
    ) -> Result<(), TransferError> {
        transfer::download(&self.client, session, item, sink, on_progress).await
    }

    async fn delete(&self, session: &Session, item: &RemoteItem) -> Result<(), TransferError> {
        transfer::delete(&self.client, session, item).await
    }

    async fn upload(
        &self,
        session: &Session,
        source: tokio::fs::File,
        len: u64,
        name: &str,
        on_progress: ProgressFn<'_>,
    ) -> Result<Option<RemoteItem>, TransferError> {
        transfer::upload(&self.client, session, source, len, name, on_progress).await
    }
}
