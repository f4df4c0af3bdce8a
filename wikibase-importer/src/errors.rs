//! Error types for wikibase-importer.

use std::path::PathBuf;

/// Alias for Results returning [`ImportError`].
pub type Result<T> = std::result::Result<T, ImportError>;

/// Top-level error type for wikibase-importer.
///
/// Every variant is fatal for the entity being created when it surfaces. A
/// recovered label conflict is not an error and never appears here.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The login handshake did not produce an edit token and session cookies.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// No usable response was obtained (non-200 status or unreadable body).
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Connect/read failure reported by the HTTP stack.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response was well-formed JSON but not of the expected shape.
    #[error("Protocol failure for '{entity}': {message} (body: {body})")]
    Protocol {
        entity: String,
        message: String,
        body: String,
    },

    /// The API answered with an error payload that cannot be recovered from.
    #[error("Unknown API error for '{entity}': {code} ({error})")]
    UnknownApi {
        entity: String,
        code: String,
        error: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ImportError {
    /// Create a protocol failure with the entity label and raw body attached.
    pub(crate) fn protocol(
        entity: impl Into<String>,
        message: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        ImportError::Protocol {
            entity: entity.into(),
            message: message.into(),
            body: body.into(),
        }
    }

    /// Create an IO error with a path context.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ImportError::Io {
            path: path.into(),
            source,
        }
    }
}
