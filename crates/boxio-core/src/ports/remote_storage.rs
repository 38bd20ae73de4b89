//! Remote storage port (driven/secondary port)
//!
//! The controller only ever talks to a storage service through this trait.
//! Every call receives the [`Session`] explicitly; implementations keep no
//! connection state of their own, so a reconnect is just a new `Session`
//! value.
//!
//! ## Design Notes
//!
//! - Uses typed errors ([`ConnectionError`], [`TransferError`]) because the
//!   controller's retry-vs-abort decisions depend on the error class.
//! - Progress callbacks receive `(bytes_done, bytes_total)` and are invoked
//!   at least once at the start and once at completion of a transfer.

use futures_util::stream::BoxStream;
use tokio::io::AsyncWrite;

use crate::domain::{ConnectionError, Credentials, RemoteItem, Session, TransferError};

/// Progress callback invoked with `(bytes_done, bytes_total)`
pub type ProgressFn<'a> = &'a mut (dyn FnMut(u64, u64) + Send);

/// Lazily paged listing of a folder; each call to `enumerate` re-queries
pub type ItemStream<'a> = BoxStream<'a, Result<RemoteItem, TransferError>>;

/// Port trait for folder-scoped cloud storage operations
#[async_trait::async_trait]
pub trait RemoteStorage: Send + Sync {
    /// Authenticates and binds the folder named in `credentials`
    async fn connect(&self, credentials: &Credentials) -> Result<Session, ConnectionError>;

    /// Lists the current contents of the bound folder in service order
    ///
    /// Pages are fetched as the stream is polled. The stream owns what it
    /// needs from `session`, so the caller may replace its session while
    /// the stream is still alive.
    fn enumerate<'a>(&'a self, session: &Session) -> ItemStream<'a>;

    /// Streams the item's bytes into `sink`
    ///
    /// The sink is flushed on success. Failures writing to it are reported
    /// as [`TransferError::LocalIo`].
    async fn download(
        &self,
        session: &Session,
        item: &RemoteItem,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
        on_progress: ProgressFn<'_>,
    ) -> Result<(), TransferError>;

    /// Removes the item from the bound folder
    async fn delete(&self, session: &Session, item: &RemoteItem) -> Result<(), TransferError>;

    /// Uploads `len` bytes read from `source` under `name`
    ///
    /// Returns `Ok(None)` when the service answered without creating an item.
    async fn upload(
        &self,
        session: &Session,
        source: tokio::fs::File,
        len: u64,
        name: &str,
        on_progress: ProgressFn<'_>,
    ) -> Result<Option<RemoteItem>, TransferError>;
}
