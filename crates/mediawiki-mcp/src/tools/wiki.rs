//! MCP tools backed by [`WikiClient`].
//!
//! Tool arguments are decoded into the `*Args` types below; results are the
//! client's normalized records, pretty-printed as JSON.

use mediawiki_client::{DEFAULT_HISTORY_LIMIT, DEFAULT_SEARCH_LIMIT, WikiClient};
use rmcp::model::Tool;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use super::{make_tool, parse_args, serialize_response};
use crate::error::McpErrorExt;
use crate::registry::{ToolRegistry, ToolResult};

const UPDATE_PAGE_DESCRIPTION: &str = "Create or edit a wiki page. Use ONLY when explicitly \
    asked to save content. Content must be MediaWiki wikitext, not Markdown. The edit is sent \
    as one request: a call cancelled while in flight may still have been saved.";

// ---------------------------------------------------------------------------
// Argument types
// ---------------------------------------------------------------------------

/// Arguments for `get_page`.
#[derive(Debug, Deserialize)]
pub struct GetPageArgs {
    /// Exact page title.
    pub title: String,
}

/// Arguments for `update_page`.
#[derive(Debug, Deserialize)]
pub struct UpdatePageArgs {
    /// Exact page title.
    pub title: String,
    /// Full wikitext of the new revision.
    pub content: String,
    /// Edit summary shown in the page history.
    pub summary: String,
    /// Preview without saving.
    #[serde(default)]
    pub dry_run: bool,
}

/// Arguments for `search_pages`.
#[derive(Debug, Deserialize)]
pub struct SearchArgs {
    /// Search query string.
    pub query: String,
    /// Maximum results, 1 to 50.
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

/// Arguments for `get_page_history`.
#[derive(Debug, Deserialize)]
pub struct HistoryArgs {
    /// Exact page title.
    pub title: String,
    /// Number of revisions, 1 to 50.
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 {
    DEFAULT_SEARCH_LIMIT
}

fn default_history_limit() -> i64 {
    DEFAULT_HISTORY_LIMIT
}

// ---------------------------------------------------------------------------
// WikiTools
// ---------------------------------------------------------------------------

/// Page, update, search and history tools.
pub struct WikiTools {
    client: Arc<WikiClient>,
}

impl WikiTools {
    /// Create wiki tools over a shared client.
    pub fn new(client: Arc<WikiClient>) -> Self {
        Self { client }
    }
}

impl ToolRegistry for WikiTools {
    fn tools(&self) -> Vec<Tool> {
        vec![
            make_tool(
                "get_page",
                "Retrieve the full content and metadata of a MediaWiki page.",
                json!({
                    "type": "object",
                    "properties": {
                        "title": {
                            "type": "string",
                            "description": "The exact title of the wiki page"
                        }
                    },
                    "required": ["title"]
                }),
            ),
            make_tool(
                "update_page",
                UPDATE_PAGE_DESCRIPTION,
                json!({
                    "type": "object",
                    "properties": {
                        "title": {
                            "type": "string",
                            "description": "The exact name of the page to update"
                        },
                        "content": {
                            "type": "string",
                            "description": "Full wikitext content (MediaWiki format, not Markdown)"
                        },
                        "summary": {
                            "type": "string",
                            "description": "Edit summary shown in the page history"
                        },
                        "dry_run": {
                            "type": "boolean",
                            "description": "If true, preview the update without saving",
                            "default": false
                        }
                    },
                    "required": ["title", "content", "summary"]
                }),
            ),
            make_tool(
                "search_pages",
                "Search wiki pages by title keyword",
                json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Search query string"
                        },
                        "limit": {
                            "type": "integer",
                            "description": "Maximum results to return",
                            "minimum": 1,
                            "maximum": 50,
                            "default": DEFAULT_SEARCH_LIMIT
                        }
                    },
                    "required": ["query"]
                }),
            ),
            make_tool(
                "get_page_history",
                "Get the revision history of a wiki page",
                json!({
                    "type": "object",
                    "properties": {
                        "title": {
                            "type": "string",
                            "description": "Page title"
                        },
                        "limit": {
                            "type": "integer",
                            "description": "Number of revisions to fetch",
                            "minimum": 1,
                            "maximum": 50,
                            "default": DEFAULT_HISTORY_LIMIT
                        }
                    },
                    "required": ["title"]
                }),
            ),
        ]
    }

    fn call(&self, name: &str, args: Value) -> Option<ToolResult> {
        let client = Arc::clone(&self.client);

        match name {
            "get_page" => Some(Box::pin(async move {
                let args: GetPageArgs = parse_args(args)?;
                let page = client
                    .get_page(&args.title)
                    .await
                    .map_err(|e| e.to_mcp_error())?;
                serialize_response(&page)
            })),

            "update_page" => Some(Box::pin(async move {
                let args: UpdatePageArgs = parse_args(args)?;
                let result = client
                    .update_page(&args.title, &args.content, &args.summary, args.dry_run)
                    .await
                    .map_err(|e| e.to_mcp_error())?;
                serialize_response(&result)
            })),

            "search_pages" => Some(Box::pin(async move {
                let args: SearchArgs = parse_args(args)?;
                let result = client
                    .search_pages(&args.query, args.limit)
                    .await
                    .map_err(|e| e.to_mcp_error())?;
                serialize_response(&result)
            })),

            "get_page_history" => Some(Box::pin(async move {
                let args: HistoryArgs = parse_args(args)?;
                let history = client
                    .get_page_history(&args.title, args.limit)
                    .await
                    .map_err(|e| e.to_mcp_error())?;
                serialize_response(&history)
            })),

            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
