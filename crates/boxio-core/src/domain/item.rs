//! Remote items produced by folder enumeration

use serde::{Deserialize, Serialize};

use super::newtypes::RemoteId;

/// Kind of an entry in a remote folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    File,
    Folder,
    WebLink,
}

/// Handle to one object in the remote folder
///
/// Produced transiently by enumeration and not retained beyond one
/// processing pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    /// Stable identifier assigned by the service
    pub id: RemoteId,
    /// Display name, used as the local file name when downloading
    pub name: String,
    pub kind: ItemKind,
    /// Size in bytes when the listing reports it
    pub size: Option<u64>,
}

impl RemoteItem {
    /// Creates a file item
    pub fn file(id: RemoteId, name: impl Into<String>, size: Option<u64>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: ItemKind::File,
            size,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == ItemKind::File
    }
}
