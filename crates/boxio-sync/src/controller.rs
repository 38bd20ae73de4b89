//! Listen and upload control loops
//!
//! ## Listen
//!
//! ```text
//! connect (one retry) -> Polling -> Sleeping -> Polling -> ... -> Terminated
//!                           |                                      ^
//!                           +---- round limit reached -------------+
//! ```
//!
//! Each poll enumerates the bound folder and, for every file in service
//! order, downloads it into the download directory, deletes the remote copy
//! and counts it. The loop stops as soon as the count reaches the round
//! limit, even in the middle of a cycle.
//!
//! ## Upload
//!
//! Paths are uploaded once, in order, under their base names. Unreadable
//! paths are logged and skipped; an upload the service does not acknowledge
//! ends the run.
//!
//! ## Failure handling
//!
//! | Error                          | Listen                      | Upload            |
//! |--------------------------------|-----------------------------|-------------------|
//! | `TransferError::Transient`     | reconnect once, next item   | reconnect once, next path |
//! | `TransferError::Remote`        | skip item                   | skip path         |
//! | `TransferError::LocalIo`       | fatal                       | skip path         |
//! | failed reconnect               | fatal                       | fatal             |

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tracing::{debug, error, info, warn};

use boxio_core::domain::{Credentials, RemoteItem, Session, TransferError, TransferTask};
use boxio_core::ports::RemoteStorage;
use boxio_core::progress::ProgressReporter;

use crate::sleeper::{Sleeper, TokioSleeper};

/// Default idle time between listen cycles
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Prefix of in-progress download files in the download directory
const PARTIAL_PREFIX: &str = ".boxio-";

// ============================================================================
// Listen state machine
// ============================================================================

/// States of the listen loop once a session is established
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListenState {
    /// Enumerate the folder and process its files
    Polling,
    /// Idle before the next poll
    Sleeping,
    /// Round limit reached
    Terminated,
    /// Unrecoverable error
    Failed,
}

// ============================================================================
// SyncController
// ============================================================================

/// Drives one [`TransferTask`] against a [`RemoteStorage`]
///
/// The controller owns the only [`Session`] of the run. It is created by the
/// initial connect and replaced wholesale on every reconnect.
pub struct SyncController {
    storage: Arc<dyn RemoteStorage>,
    credentials: Credentials,
    sleeper: Arc<dyn Sleeper>,
    poll_interval: Duration,
    download_dir: PathBuf,
    show_progress: bool,
}

impl SyncController {
    /// Creates a controller that downloads into the current directory
    pub fn new(storage: Arc<dyn RemoteStorage>, credentials: Credentials) -> Self {
        Self {
            storage,
            credentials,
            sleeper: Arc::new(TokioSleeper),
            poll_interval: DEFAULT_POLL_INTERVAL,
            download_dir: PathBuf::from("."),
            show_progress: true,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    /// Enables or disables the console progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Connects and runs `task` to completion
    ///
    /// Returns `true` when the task finished without a fatal error.
    #[tracing::instrument(skip_all, fields(mode = %task.mode()))]
    pub async fn run(self, task: TransferTask) -> bool {
        let Some(mut session) = self.connect_with_retry().await else {
            return false;
        };

        match task {
            TransferTask::Listen { round_limit } => self.listen(&mut session, round_limit).await,
            TransferTask::Upload { paths } => self.upload_all(&mut session, &paths).await,
        }
    }

    /// Initial connect, retried once
    async fn connect_with_retry(&self) -> Option<Session> {
        match self.storage.connect(&self.credentials).await {
            Ok(session) => Some(session),
            Err(first) => {
                warn!(error = %first, "Connection failed, retrying once");
                match self.storage.connect(&self.credentials).await {
                    Ok(session) => Some(session),
                    Err(err) => {
                        error!(error = %err, "Connection failed");
                        None
                    }
                }
            }
        }
    }

    /// Replaces `session` with a fresh one; false if that fails
    async fn reconnect(&self, session: &mut Session) -> bool {
        info!("Reconnecting");
        match self.storage.connect(&self.credentials).await {
            Ok(fresh) => {
                *session = fresh;
                true
            }
            Err(err) => {
                error!(error = %err, "Reconnect failed");
                false
            }
        }
    }

    fn progress_bar(&self) -> Option<ProgressReporter> {
        self.show_progress.then(ProgressReporter::stdout)
    }

    // ========================================================================
    // Listen
    // ========================================================================

    async fn listen(&self, session: &mut Session, round_limit: u32) -> bool {
        info!("Started listening to {} folder...", session.folder_name());

        let mut processed: u32 = 0;
        let mut state = ListenState::Polling;
        loop {
            state = match state {
                ListenState::Polling if processed >= round_limit => ListenState::Terminated,
                ListenState::Polling => self.poll_cycle(session, round_limit, &mut processed).await,
                ListenState::Sleeping => {
                    debug!(interval_ms = self.poll_interval.as_millis() as u64, "Idle");
                    self.sleeper.sleep(self.poll_interval).await;
                    ListenState::Polling
                }
                ListenState::Terminated => {
                    info!(processed, "Listening finished");
                    return true;
                }
                ListenState::Failed => {
                    error!(processed, "Listening aborted");
                    return false;
                }
            };
        }
    }

    /// Processes one enumeration of the folder
    async fn poll_cycle(
        &self,
        session: &mut Session,
        round_limit: u32,
        processed: &mut u32,
    ) -> ListenState {
        let mut items = self.storage.enumerate(session);

        while let Some(next) = items.next().await {
            let item = match next {
                Ok(item) => item,
                Err(err) => {
                    warn!(error = %err, "Listing folder failed");
                    return if self.reconnect(session).await {
                        ListenState::Sleeping
                    } else {
                        ListenState::Failed
                    };
                }
            };

            if !item.is_file() {
                debug!(name = %item.name, kind = ?item.kind, "Skipping non-file item");
                continue;
            }
            let Some(target) = self.target_path(&item.name) else {
                warn!(name = %item.name, "Skipping item with unusable file name");
                continue;
            };

            info!("{}. Downloading file {}", *processed + 1, item.name);
            match self.download_and_remove(session, &item, &target).await {
                Ok(()) => {
                    *processed += 1;
                    if *processed >= round_limit {
                        return ListenState::Terminated;
                    }
                }
                Err(err @ TransferError::Transient(_)) => {
                    warn!(name = %item.name, error = %err, "Transfer interrupted");
                    if !self.reconnect(session).await {
                        return ListenState::Failed;
                    }
                }
                Err(err @ TransferError::LocalIo { .. }) => {
                    error!(name = %item.name, error = %err, "Cannot write download");
                    return ListenState::Failed;
                }
                Err(err @ TransferError::Remote { .. }) => {
                    warn!(name = %item.name, error = %err, "Skipping item");
                }
            }
        }

        ListenState::Sleeping
    }

    /// Local destination for a remote name; `None` if it is not a plain file name
    fn target_path(&self, name: &str) -> Option<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(file)), None) => Some(self.download_dir.join(file)),
            _ => None,
        }
    }

    /// Downloads `item` to `target` through a temporary file, then deletes it remotely
    ///
    /// The temporary file has a short random name in the download directory,
    /// so any name valid for `target` can be written, and it is removed when
    /// dropped on an error path.
    async fn download_and_remove(
        &self,
        session: &Session,
        item: &RemoteItem,
        target: &Path,
    ) -> Result<(), TransferError> {
        let (file, partial) = tempfile::Builder::new()
            .prefix(PARTIAL_PREFIX)
            .suffix(".part")
            .tempfile_in(&self.download_dir)
            .map_err(|e| TransferError::local_io(&self.download_dir, e))?
            .into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let mut bar = self.progress_bar();
        let mut on_progress = |done: u64, total: u64| {
            if let Some(bar) = bar.as_mut() {
                if total > 0 {
                    bar.update(done, total);
                }
            }
        };

        let result = self
            .storage
            .download(session, item, &mut file, &mut on_progress)
            .await;
        drop(file);
        result?;

        partial
            .persist(target)
            .map_err(|e| TransferError::local_io(target, e.error))?;
        debug!(path = %target.display(), "Saved download");

        self.storage.delete(session, item).await?;
        debug!(id = %item.id, "Removed remote copy");
        Ok(())
    }

    // ========================================================================
    // Upload
    // ========================================================================

    async fn upload_all(&self, session: &mut Session, paths: &[PathBuf]) -> bool {
        for path in paths {
            info!("Uploading file {}", path.display());

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                error!(path = %path.display(), "Path has no usable file name, skipping");
                continue;
            };
            let (file, len) = match open_regular(path).await {
                Ok(opened) => opened,
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Cannot read local file, skipping");
                    continue;
                }
            };

            let mut bar = self.progress_bar();
            let mut on_progress = |done: u64, total: u64| {
                if let Some(bar) = bar.as_mut() {
                    if total > 0 {
                        bar.update(done, total);
                    }
                }
            };

            match self
                .storage
                .upload(session, file, len, name, &mut on_progress)
                .await
            {
                Ok(Some(created)) => {
                    info!(id = %created.id, name = %created.name, "Uploaded");
                }
                Ok(None) => {
                    error!(path = %path.display(), "Upload was not acknowledged");
                    return false;
                }
                Err(err @ TransferError::Transient(_)) => {
                    warn!(path = %path.display(), error = %err, "Upload interrupted, skipping");
                    if !self.reconnect(session).await {
                        return false;
                    }
                }
                Err(err) => {
                    error!(path = %path.display(), error = %err, "Upload failed, skipping");
                }
            }
        }

        true
    }
}

/// Opens `path` for reading, refusing anything but a regular file
async fn open_regular(path: &Path) -> std::io::Result<(tokio::fs::File, u64)> {
    let file = tokio::fs::File::open(path).await?;
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a regular file",
        ));
    }
    Ok((file, metadata.len()))
}
