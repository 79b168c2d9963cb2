//! Error types for mediawiki-mcp and the MCP error mapping.

use mediawiki_client::ErrorKind;
use rmcp::model::ErrorData;
use serde_json::{Value, json};
use thiserror::Error;

/// Result type alias for mediawiki-mcp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running the server
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from mediawiki-client
    #[error("Client error: {0}")]
    Client(#[from] mediawiki_client::Error),

    /// Binding or serving failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The MCP transport failed to start or stopped abnormally.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid server configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Convert a wiki error into an MCP `ErrorData`.
///
/// The `data` payload carries a `kind` so callers can branch on it.
pub trait McpErrorExt {
    /// Map to the MCP error for this failure.
    fn to_mcp_error(&self) -> ErrorData;
}

impl McpErrorExt for mediawiki_client::Error {
    fn to_mcp_error(&self) -> ErrorData {
        let message = self.to_string();
        match self {
            mediawiki_client::Error::PageNotFound(title) => ErrorData::resource_not_found(
                message,
                Some(json!({"kind": ErrorKind::PageNotFound.as_str(), "title": title})),
            ),
            mediawiki_client::Error::Validation(_) => {
                ErrorData::invalid_params(message, Some(kind_data(self)))
            }
            _ => ErrorData::internal_error(message, Some(kind_data(self))),
        }
    }
}

fn kind_data(err: &mediawiki_client::Error) -> Value {
    let kind = err.kind();
    let cause = err.root_cause().kind();
    if cause == kind {
        json!({"kind": kind.as_str()})
    } else {
        json!({"kind": kind.as_str(), "cause": cause.as_str()})
    }
}
