//! MCP tools.
//!
//! - [`WikiTools`]: `get_page`, `update_page`, `search_pages`, `get_page_history`
//! - [`StatusTools`]: `server_status`

pub mod status;
pub mod wiki;

pub use status::StatusTools;
pub use wiki::{GetPageArgs, HistoryArgs, SearchArgs, UpdatePageArgs, WikiTools};

use rmcp::model::{CallToolResult, Content, ErrorData, Tool};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

pub(crate) fn json_schema(value: Value) -> Arc<serde_json::Map<String, Value>> {
    match value {
        Value::Object(map) => Arc::new(map),
        _ => Arc::new(serde_json::Map::new()),
    }
}

pub(crate) fn make_tool(name: &str, description: &str, schema: Value) -> Tool {
    Tool::new(
        name.to_string(),
        description.to_string(),
        json_schema(schema),
    )
}

pub(crate) fn serialize_response<T: Serialize>(value: &T) -> Result<CallToolResult, ErrorData> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Decode tool arguments. A missing argument object counts as `{}`.
pub(crate) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ErrorData> {
    let args = match args {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };
    serde_json::from_value(args).map_err(|e| ErrorData::invalid_params(e.to_string(), None))
}
