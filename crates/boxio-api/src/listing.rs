//! Folder enumeration
//!
//! Box lists folder contents in offset-paginated pages:
//! `GET /folders/{id}/items?offset=&limit=&fields=`. [`folder_items`] turns
//! that into a lazy stream that only requests the next page once the
//! current one has been consumed, so a caller that stops early never pays
//! for the remaining pages.

use std::collections::VecDeque;

use boxio_core::domain::{ItemKind, RemoteId, RemoteItem, Session, TransferError};
use boxio_core::ports::ItemStream;
use futures_util::{stream, StreamExt};
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::client::BoxClient;
use crate::BoxApiError;

/// Fields requested for each folder entry
const ITEM_FIELDS: &str = "id,type,name,size";

/// One page of `GET /folders/{id}/items`
#[derive(Debug, Deserialize)]
pub(crate) struct ItemPage {
    total_count: u64,
    #[serde(default)]
    entries: Vec<BoxEntry>,
}

/// A folder entry as returned by the API
#[derive(Debug, Deserialize)]
pub(crate) struct BoxEntry {
    #[serde(rename = "type")]
    pub(crate) kind: ItemKind,
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) name: String,
    pub(crate) size: Option<u64>,
}

impl BoxEntry {
    pub(crate) fn into_item(self) -> Result<RemoteItem, BoxApiError> {
        let id = RemoteId::new(self.id)
            .map_err(|e| BoxApiError::InvalidResponse(e.to_string()))?;
        Ok(RemoteItem {
            id,
            name: self.name,
            kind: self.kind,
            size: self.size,
        })
    }
}

/// Fetches one page starting at `offset`
pub(crate) async fn fetch_page(
    client: &BoxClient,
    session: &Session,
    offset: u64,
) -> Result<ItemPage, BoxApiError> {
    let path = format!("/folders/{}/items", session.folder_id());
    let limit = client.page_size().to_string();
    let offset_param = offset.to_string();

    let response = client
        .execute_with_retry("list_items", || {
            client
                .request(Method::GET, &path, session.token())
                .query(&[
                    ("fields", ITEM_FIELDS),
                    ("limit", limit.as_str()),
                    ("offset", offset_param.as_str()),
                ])
        })
        .await?;

    let page: ItemPage = response
        .json()
        .await
        .map_err(|e| BoxApiError::InvalidResponse(format!("folder items: {e}")))?;
    debug!(
        offset,
        received = page.entries.len(),
        total = page.total_count,
        "Fetched folder page"
    );
    Ok(page)
}

struct Cursor<'a> {
    client: &'a BoxClient,
    session: Session,
    offset: u64,
    buffered: VecDeque<RemoteItem>,
    exhausted: bool,
}

/// Lazily lists the bound folder of `session`
///
/// The stream ends after the last page, or right after yielding the first
/// error. Entries the API returns with malformed IDs are skipped.
pub fn folder_items(client: &BoxClient, session: Session) -> ItemStream<'_> {
    let cursor = Cursor {
        client,
        session,
        offset: 0,
        buffered: VecDeque::new(),
        exhausted: false,
    };

    stream::unfold(cursor, |mut cursor| async move {
        loop {
            if let Some(item) = cursor.buffered.pop_front() {
                return Some((Ok(item), cursor));
            }
            if cursor.exhausted {
                return None;
            }

            match fetch_page(cursor.client, &cursor.session, cursor.offset).await {
                Ok(page) => {
                    let received = page.entries.len() as u64;
                    cursor.offset += received;
                    if received == 0 || cursor.offset >= page.total_count {
                        cursor.exhausted = true;
                    }
                    for entry in page.entries {
                        match entry.into_item() {
                            Ok(item) => cursor.buffered.push_back(item),
                            Err(e) => warn!(error = %e, "Skipping malformed folder entry"),
                        }
                    }
                }
                Err(err) => {
                    cursor.exhausted = true;
                    return Some((Err(TransferError::from(err)), cursor));
                }
            }
        }
    })
    .boxed()
}
