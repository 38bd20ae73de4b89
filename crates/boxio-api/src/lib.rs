//! boxio API - Box Platform client
//!
//! Provides an async client for:
//! - JWT app-user authentication (RS256 assertion exchanged for a token)
//! - Paginated folder listing
//! - Streaming download and multipart upload of single files
//! - Item deletion
//!
//! ## Modules
//!
//! - [`auth`] - Key decryption, assertion signing and token exchange
//! - [`client`] - HTTP client with endpoint construction and 429 handling
//! - [`listing`] - Lazily paged folder enumeration
//! - [`transfer`] - Download, upload and delete of single items
//! - [`provider`] - [`RemoteStorage`](boxio_core::ports::RemoteStorage) implementation

pub mod auth;
pub mod client;
pub mod listing;
pub mod provider;
pub mod transfer;

use std::time::Duration;

use boxio_core::domain::TransferError;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when communicating with the Box API
#[derive(Debug, Error)]
pub enum BoxApiError {
    /// The access token is invalid or has expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions for the requested operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested item or folder does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// An item with the same name already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rate limit exceeded and retries exhausted
    #[error("Too many requests, retry after {retry_after:?}")]
    TooManyRequests { retry_after: Duration },

    /// A server-side error occurred (5xx)
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Any other non-success status
    #[error("Unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The response body could not be parsed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Error body returned by the Box API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl BoxApiError {
    /// Builds an error from a non-success response, consuming its body
    pub async fn from_response(response: Response) -> Self {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| match (b.code, b.message) {
                (Some(code), Some(message)) => Some(format!("{code}: {message}")),
                (code, message) => code.or(message),
            })
            .unwrap_or(body);
        Self::from_status(status, message)
    }

    /// Maps a status code and message to the matching variant
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::CONFLICT => Self::Conflict(message),
            s if s.is_server_error() => Self::ServerError {
                status: s.as_u16(),
                message,
            },
            s => Self::Status {
                status: s.as_u16(),
                message,
            },
        }
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Conflict(_) => Some(409),
            Self::TooManyRequests { .. } => Some(429),
            Self::ServerError { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::NetworkError(e) => e.status().map(|s| s.as_u16()),
            Self::InvalidResponse(_) => None,
        }
    }

    /// Returns true for connection-class failures that a reconnect may fix
    ///
    /// A 404 on an item we just listed, an expired token, and transport
    /// failures all fall in this class.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unauthorized(_) | Self::NotFound(_) => true,
            Self::NetworkError(e) => e.status().is_none(),
            _ => false,
        }
    }
}

impl From<BoxApiError> for TransferError {
    fn from(err: BoxApiError) -> Self {
        if err.is_transient() {
            TransferError::Transient(err.to_string())
        } else {
            TransferError::Remote {
                status: err.status().unwrap_or(0),
                message: err.to_string(),
            }
        }
    }
}
