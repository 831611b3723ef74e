//! Error types for the poll client and application shell.
//!
//! # Design
//! Every non-2xx response lands in `ApiError::Status` with the raw status
//! code and body text as fields, so callers can branch on them without
//! parsing the display string. The display string itself is
//! `"<status>: <body>"`.

use thiserror::Error;

/// Errors returned by `PollClient` and `PollApi`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a status outside 200..=299.
    ///
    /// `body` is the response text, or the canonical reason phrase when the
    /// host could not read the body.
    #[error("{status}: {body}")]
    Status { status: u16, body: String },

    /// The transport failed before a response arrived.
    #[error(transparent)]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Storing or clearing the admin token after a call failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Errors from a `KeyValueStore` backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file is not a JSON object of strings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fatal startup and locale errors raised by the application shell.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("mount anchor `{0}` not found in document")]
    AnchorNotFound(String),

    #[error("invalid locale tag `{0}`")]
    InvalidLocale(String),

    #[error("invalid message catalog: {0}")]
    Catalog(String),

    #[error("locale subsystem is disabled")]
    I18nDisabled,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Invalid `AppConfig` input.
#[derive(Debug, Error)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(#[from] pub serde_json::Error);
