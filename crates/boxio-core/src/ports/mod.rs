//! Port definitions
//!
//! - [`RemoteStorage`] - folder-scoped operations on a cloud storage service

pub mod remote_storage;

pub use remote_storage::{ItemStream, ProgressFn, RemoteStorage};
