//! Connection credentials
//!
//! Built once from the key/value pairs of the credentials file and never
//! mutated afterwards. Every field is required; construction fails on the
//! first one that is missing or empty.

use std::collections::HashMap;
use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::errors::ConfigError;
use super::newtypes::FolderId;

/// Keys that must be present in the credentials file
pub const REQUIRED_KEYS: [&str; 7] = [
    "private_key",
    "public_key_id",
    "private_key_password",
    "user_id",
    "client_id",
    "client_secret",
    "folder_id",
];

/// Everything needed to authenticate as an app user and bind a folder
#[derive(Clone)]
pub struct Credentials {
    /// PEM text of the encrypted private key (decoded from base64)
    private_key_pem: String,
    public_key_id: String,
    private_key_password: String,
    user_id: String,
    client_id: String,
    client_secret: String,
    folder_id: FolderId,
}

fn required<'a>(
    props: &'a HashMap<String, String>,
    key: &'static str,
) -> Result<&'a str, ConfigError> {
    props
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingKey(key))
}

impl Credentials {
    /// Validates the raw key/value pairs and builds the credentials
    ///
    /// # Errors
    /// - [`ConfigError::MissingKey`] when a required key is absent or blank
    /// - [`ConfigError::InvalidValue`] when `private_key` is not base64
    ///   encoded UTF-8, or `folder_id` is malformed
    pub fn from_properties(props: &HashMap<String, String>) -> Result<Self, ConfigError> {
        for key in REQUIRED_KEYS {
            required(props, key)?;
        }

        let encoded = required(props, "private_key")?;
        let decoded = STANDARD
            .decode(encoded)
            .map_err(|e| ConfigError::InvalidValue {
                key: "private_key",
                reason: format!("not valid base64: {e}"),
            })?;
        let private_key_pem = String::from_utf8(decoded).map_err(|_| ConfigError::InvalidValue {
            key: "private_key",
            reason: "decoded key is not UTF-8 PEM text".to_string(),
        })?;

        let folder_id = FolderId::new(required(props, "folder_id")?.to_string()).map_err(|e| {
            ConfigError::InvalidValue {
                key: "folder_id",
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            private_key_pem,
            public_key_id: required(props, "public_key_id")?.to_string(),
            private_key_password: required(props, "private_key_password")?.to_string(),
            user_id: required(props, "user_id")?.to_string(),
            client_id: required(props, "client_id")?.to_string(),
            client_secret: required(props, "client_secret")?.to_string(),
            folder_id,
        })
    }

    pub fn private_key_pem(&self) -> &str {
        &self.private_key_pem
    }

    pub fn public_key_id(&self) -> &str {
        &self.public_key_id
    }

    pub fn private_key_password(&self) -> &str {
        &self.private_key_password
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn folder_id(&self) -> &FolderId {
        &self.folder_id
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("public_key_id", &self.public_key_id)
            .field("user_id", &self.user_id)
            .field("client_id", &self.client_id)
            .field("folder_id", &self.folder_id)
            .finish_non_exhaustive()
    }
}
