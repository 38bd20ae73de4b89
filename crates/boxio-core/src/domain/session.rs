//! Authenticated session bound to one remote folder
//!
//! A session is created by `connect` and replaced wholesale on reconnect.
//! It is never mutated in place, so every storage call sees a consistent
//! token/folder pair.

use chrono::{DateTime, Utc};

use super::newtypes::FolderId;

/// Bearer token issued by the token endpoint
#[derive(Clone)]
pub struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns true if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// The live handle plus the folder it is bound to
#[derive(Debug, Clone)]
pub struct Session {
    token: AccessToken,
    folder_id: FolderId,
    folder_name: String,
}

impl Session {
    pub fn new(token: AccessToken, folder_id: FolderId, folder_name: impl Into<String>) -> Self {
        Self {
            token,
            folder_id,
            folder_name: folder_name.into(),
        }
    }

    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    pub fn folder_id(&self) -> &FolderId {
        &self.folder_id
    }

    /// Display name of the bound folder, as reported at connect time
    pub fn folder_name(&self) -> &str {
        &self.folder_name
    }
}
