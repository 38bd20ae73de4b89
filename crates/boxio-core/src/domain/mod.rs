//! Domain entities
//!
//! - Newtypes for remote identifiers
//! - Credentials loaded from the properties file
//! - The authenticated session bound to one remote folder
//! - Remote items produced by enumeration
//! - Transfer tasks built from command-line arguments
//! - Error taxonomy shared by the controller and the adapters

pub mod credentials;
pub mod errors;
pub mod item;
pub mod newtypes;
pub mod session;
pub mod task;

pub use credentials::Credentials;
pub use errors::{ConfigError, ConnectionError, DomainError, TransferError};
pub use item::{ItemKind, RemoteItem};
pub use newtypes::{FolderId, RemoteId};
pub use session::{AccessToken, Session};
pub use task::{TransferMode, TransferTask};
