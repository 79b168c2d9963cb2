//! MCP server exposing a MediaWiki site as tools.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      mediawiki-mcp                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ToolRegistry trait: tool registration and dispatch         │
//! │  CompositeRegistry: WikiTools + StatusTools                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  WikiMcpServer: implements rmcp ServerHandler               │
//! │  stdio transport | streamable HTTP (axum) + /health         │
//! │  BearerAuthLayer: optional static token on the MCP route    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  McpErrorExt: mediawiki_client::Error → rmcp::ErrorData     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mediawiki_client::{WikiClient, WikiConfig, WikiSession};
//! use mediawiki_mcp::WikiMcpServer;
//!
//! # async fn example() -> mediawiki_mcp::Result<()> {
//! let client = Arc::new(WikiClient::new(WikiSession::new(WikiConfig::default())));
//! WikiMcpServer::for_client(client).serve_stdio().await?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod cli;
pub mod error;
pub mod http;
pub mod registry;
pub mod server;
pub mod tools;

pub use rmcp::model;

// Re-exports: registry
pub use registry::{CompositeRegistry, ToolRegistry, ToolResult};

// Re-exports: server
pub use server::{ServerConfig, WikiMcpServer};

// Re-exports: transports
pub use auth::BearerAuthLayer;
pub use http::HttpOptions;

// Re-exports: error
pub use error::{Error, McpErrorExt, Result};

// Re-exports: tools
pub use tools::{StatusTools, WikiTools};
