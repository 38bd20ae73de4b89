//! boxio Core - Domain types, ports and progress reporting
//!
//! This crate contains the ports & adapters core of boxio:
//! - **Domain types** - `Credentials`, `Session`, `RemoteItem`, `TransferTask`
//! - **Port definitions** - the `RemoteStorage` trait implemented by adapter crates
//! - **Configuration** - properties-file credentials and YAML runtime settings
//! - **Progress** - the textual progress bar driven by transfer callbacks
//!
//! # Architecture
//!
//! The domain module has no knowledge of any storage service. Adapters such
//! as `boxio-api` implement [`ports::RemoteStorage`], and the controller in
//! `boxio-sync` drives them through that trait only.

pub mod config;
pub mod domain;
pub mod ports;
pub mod progress;
