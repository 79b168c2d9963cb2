//! # mediawiki-client
//!
//! MediaWiki Action API client used by the MediaWiki MCP server.
//!
//! This crate provides:
//! - [`WikiConfig`]: connection parameters (host, path, scheme, bot credentials)
//! - [`WikiSession`]: a fresh, optionally authenticated connection per operation
//! - [`WikiClient`]: the page, update, search, history and status operations
//! - [`WikiConnector`] / [`WikiConnection`]: the seam between the two and
//!   the backend, with [`HttpConnector`] as the real implementation and
//!   `fake::FakeWiki` (feature `fake`) as an in-memory one for tests
//!
//! # Example
//!
//! ```rust,no_run
//! use mediawiki_client::{WikiClient, WikiConfig, WikiSession};
//!
//! # async fn example() -> mediawiki_client::Result<()> {
//! let config = WikiConfig::new("wiki.example.org", "/w/", true)
//!     .with_bot_credentials(Some("Bot@mcp"), Some("app-password"));
//! let client = WikiClient::new(WikiSession::new(config));
//!
//! let page = client.get_page("Main Page").await?;
//! println!("{} bytes, last modified {}", page.metadata.length, page.metadata.last_modified);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod api;
pub mod backend;
pub mod client;
pub mod config;
pub mod error;
#[cfg(any(test, feature = "fake"))]
pub mod fake;
pub mod http;
pub mod session;
pub mod types;

pub use backend::{WikiConnection, WikiConnector};
pub use client::{DEFAULT_HISTORY_LIMIT, DEFAULT_SEARCH_LIMIT, LIMIT_RANGE, WikiClient};
pub use config::WikiConfig;
pub use error::{Error, ErrorKind, Result};
pub use http::HttpConnector;
pub use session::WikiSession;
pub use types::{
    ConnectionStatus, PageInfo, PageMetadata, RevisionEntry, SearchHit, SearchResult, StatusKind,
    UpdateResult, UpdateStatus,
};
