//! boxio Sync - Listen and upload controller
//!
//! The [`controller::SyncController`] runs one [`TransferTask`] against any
//! [`RemoteStorage`] implementation:
//!
//! - **Listen**: poll the bound folder, download each file, delete the remote
//!   copy, and stop after a fixed number of processed files
//! - **Upload**: push a list of local files into the folder, once, in order
//!
//! Waiting between poll cycles goes through the [`sleeper::Sleeper`] trait so
//! tests can run the listen loop without real delays.
//!
//! [`TransferTask`]: boxio_core::domain::TransferTask
//! [`RemoteStorage`]: boxio_core::ports::RemoteStorage

pub mod controller;
pub mod sleeper;

pub use controller::SyncController;
pub use sleeper::{Sleeper, TokioSleeper};
