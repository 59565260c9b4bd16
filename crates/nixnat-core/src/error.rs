//! Error types for nixnat.
//!
//! Errors fall into two propagation classes: configuration and authentication
//! failures are fatal to the calling operation, everything else is reported
//! per item and may be absorbed by batch operations.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the nixnat library.
#[derive(Debug, Error)]
pub enum NixnatError {
    /// Neither a session cookie nor `user:pass` credentials were available.
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Authentication failed against {url}: {message}")]
    Authentication { url: String, message: String },

    /// Non-success HTTP outcome or a malformed response envelope.
    #[error("Transport error for {uri}: {message}")]
    Transport {
        uri: String,
        message: String,
        status: Option<u16>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Failed to read DICOM header from {path}: {message}")]
    Dicom { path: PathBuf, message: String },

    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },
}

/// Result type alias for nixnat operations.
pub type Result<T> = std::result::Result<T, NixnatError>;

impl From<std::io::Error> for NixnatError {
    fn from(err: std::io::Error) -> Self {
        NixnatError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for NixnatError {
    fn from(err: serde_json::Error) -> Self {
        NixnatError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for NixnatError {
    fn from(err: reqwest::Error) -> Self {
        NixnatError::Transport {
            uri: err
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl NixnatError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        NixnatError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        NixnatError::Config {
            message: message.into(),
        }
    }

    pub fn transport(uri: impl Into<String>, message: impl Into<String>) -> Self {
        NixnatError::Transport {
            uri: uri.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Whether the error must abort the calling operation.
    ///
    /// Batch operations catch non-fatal errors per item and keep going;
    /// configuration and authentication failures always surface.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            NixnatError::Config { .. } | NixnatError::Authentication { .. }
        )
    }

    /// HTTP status attached to a transport error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            NixnatError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}
