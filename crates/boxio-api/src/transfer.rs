//! Single-item transfers
//!
//! - [`download`] - `GET /files/{id}/content`, streamed chunk by chunk
//! - [`upload`] - multipart `POST /files/content` on the upload host
//! - [`delete`] - `DELETE /files/{id}`
//!
//! Progress callbacks are invoked with `(0, total)` before the first byte,
//! with intermediate samples while bytes flow, and with `(n, n)` once the
//! transfer is complete.

use boxio_core::domain::{RemoteItem, Session, TransferError};
use boxio_core::ports::ProgressFn;
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method};
use serde::Deserialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::client::BoxClient;
use crate::listing::BoxEntry;
use crate::BoxApiError;

/// Response of a successful upload
#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    entries: Vec<BoxEntry>,
}

/// Streams the content of `item` into `sink`
#[tracing::instrument(skip_all, fields(id = %item.id, name = %item.name))]
pub async fn download(
    client: &BoxClient,
    session: &Session,
    item: &RemoteItem,
    sink: &mut (dyn AsyncWrite + Unpin + Send),
    on_progress: ProgressFn<'_>,
) -> Result<(), TransferError> {
    let path = format!("/files/{}/content", item.id);
    let response = client
        .execute_with_retry("download", || {
            client.request(Method::GET, &path, session.token())
        })
        .await?;

    let total = response.content_length().or(item.size).unwrap_or(0);
    on_progress(0, total);

    let local_io = |e| TransferError::local_io(&item.name, e);
    let mut done: u64 = 0;
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(BoxApiError::from)?;
        sink.write_all(&chunk).await.map_err(local_io)?;
        done += chunk.len() as u64;
        if done < total {
            on_progress(done, total);
        }
    }
    sink.flush().await.map_err(local_io)?;

    on_progress(done, done);
    debug!(bytes = done, "Download complete");
    Ok(())
}

/// Uploads `len` bytes from `source` into the bound folder as `name`
///
/// Returns `Ok(None)` if the service answered with no created entry.
#[tracing::instrument(skip_all, fields(name = %name, len))]
pub async fn upload(
    client: &BoxClient,
    session: &Session,
    source: tokio::fs::File,
    len: u64,
    name: &str,
    on_progress: ProgressFn<'_>,
) -> Result<Option<RemoteItem>, TransferError> {
    let attributes = serde_json::json!({
        "name": name,
        "parent": { "id": session.folder_id().as_str() },
    });

    // The body stream must be 'static, so byte counts travel back over a channel.
    let (sent_tx, mut sent_rx) = tokio::sync::mpsc::unbounded_channel::<u64>();
    let body = ReaderStream::new(source).map(move |chunk| {
        if let Ok(bytes) = &chunk {
            let _ = sent_tx.send(bytes.len() as u64);
        }
        chunk
    });

    let part = Part::stream_with_length(Body::wrap_stream(body), len)
        .file_name(name.to_string())
        .mime_str("application/octet-stream")
        .map_err(BoxApiError::from)?;
    let form = Form::new()
        .text("attributes", attributes.to_string())
        .part("file", part);

    on_progress(0, len);
    let request = client
        .upload_request("/files/content", session.token())
        .multipart(form)
        .send();
    tokio::pin!(request);

    let mut sent: u64 = 0;
    let response = loop {
        tokio::select! {
            result = &mut request => break result.map_err(BoxApiError::from)?,
            Some(n) = sent_rx.recv() => {
                sent += n;
                if sent < len {
                    on_progress(sent, len);
                }
            }
        }
    };

    if !response.status().is_success() {
        return Err(BoxApiError::from_response(response).await.into());
    }

    let uploaded: UploadResponse = response
        .json()
        .await
        .map_err(|e| BoxApiError::InvalidResponse(format!("upload response: {e}")))?;
    on_progress(len, len);

    match uploaded.entries.into_iter().next() {
        Some(entry) => {
            let item = entry.into_item()?;
            info!(id = %item.id, "Upload acknowledged");
            Ok(Some(item))
        }
        None => Ok(None),
    }
}

/// Removes `item` from the remote folder
#[tracing::instrument(skip_all, fields(id = %item.id))]
pub async fn delete(
    client: &BoxClient,
    session: &Session,
    item: &RemoteItem,
) -> Result<(), TransferError> {
    let path = format!("/files/{}", item.id);
    client
        .execute_with_retry("delete", || {
            client.request(Method::DELETE, &path, session.token())
        })
        .await?;
    debug!("Deleted remote item");
    Ok(())
}
