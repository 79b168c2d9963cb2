//! Error types for mediawiki-client

use thiserror::Error;

/// Result type alias for mediawiki-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mediawiki-client
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Input rejected before any backend call.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The backend reports the page as missing.
    #[error("Page '{0}' not found")]
    PageNotFound(String),

    /// Bot login rejected by the backend.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Any other failure, wrapped at the operation boundary.
    #[error("{context}: {source}")]
    Operation {
        /// What the operation was doing.
        context: String,
        /// The underlying cause.
        #[source]
        source: Box<Error>,
    },

    /// The backend could not be reached.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an `error` object.
    #[error("MediaWiki API error [{code}]: {info}")]
    Api {
        /// MediaWiki error code (e.g. `badtoken`).
        code: String,
        /// Human readable description from the backend.
        info: String,
    },

    /// The response did not have the declared shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The configured host/path do not form a valid URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Coarse error classification callers can branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`Error::Validation`].
    Validation,
    /// See [`Error::PageNotFound`].
    PageNotFound,
    /// See [`Error::Authentication`].
    Authentication,
    /// Everything else.
    Operation,
}

impl ErrorKind {
    /// Stable snake_case name, used in MCP error payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::PageNotFound => "page_not_found",
            Self::Authentication => "authentication_error",
            Self::Operation => "wiki_operation_error",
        }
    }
}

impl Error {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Wrap this error for the operation boundary.
    ///
    /// `PageNotFound`, `Validation` and already wrapped errors are returned
    /// unchanged; every other error becomes [`Error::Operation`].
    pub fn wrap(self, context: impl Into<String>) -> Self {
        match self {
            Self::PageNotFound(_) | Self::Validation(_) | Self::Operation { .. } => self,
            other => Self::Operation {
                context: context.into(),
                source: Box::new(other),
            },
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::PageNotFound(_) => ErrorKind::PageNotFound,
            Self::Authentication(_) => ErrorKind::Authentication,
            _ => ErrorKind::Operation,
        }
    }

    /// Returns `true` if the page does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PageNotFound(_))
    }

    /// The innermost cause of a wrapped error.
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Operation { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
