//! The `server_status` tool.
//!
//! Reports wiki connectivity. The tool never fails: an unreachable or
//! misconfigured backend produces an `error` status record.

use mediawiki_client::WikiClient;
use rmcp::model::Tool;
use serde_json::{Value, json};
use std::sync::Arc;

use super::{make_tool, serialize_response};
use crate::registry::{ToolRegistry, ToolResult};

/// A tool registry that provides `server_status`.
pub struct StatusTools {
    client: Arc<WikiClient>,
}

impl StatusTools {
    /// Create status tools over a shared client.
    pub fn new(client: Arc<WikiClient>) -> Self {
        Self { client }
    }
}

impl ToolRegistry for StatusTools {
    fn tools(&self) -> Vec<Tool> {
        vec![make_tool(
            "server_status",
            "Check the connection to the MediaWiki server",
            json!({
                "type": "object",
                "properties": {}
            }),
        )]
    }

    fn call(&self, name: &str, _args: Value) -> Option<ToolResult> {
        if name != "server_status" {
            return None;
        }

        let client = Arc::clone(&self.client);
        Some(Box::pin(async move {
            let status = client.server_status().await;
            serialize_response(&status)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediawiki_client::fake::FakeWiki;
    use mediawiki_client::{WikiConfig, WikiSession};
    use rmcp::model::RawContent;

    fn tools_for(wiki: FakeWiki) -> StatusTools {
        let session = WikiSession::with_connector(
            WikiConfig::new("wiki.example.org", "/w/", true),
            Arc::new(wiki),
        );
        StatusTools::new(Arc::new(WikiClient::new(session)))
    }

    async fn status_of(tools: &StatusTools) -> Value {
        let result = tools.call("server_status", json!({})).unwrap().await.unwrap();
        assert_eq!(result.is_error, Some(false));
        match &result.content[0].raw {
            RawContent::Text(t) => serde_json::from_str(&t.text).unwrap(),
            _ => panic!("Expected text content"),
        }
    }

    #[test]
    fn test_status_tool_info() {
        let tools = tools_for(FakeWiki::new());
        assert_eq!(tools.tool_count(), 1);
        assert!(tools.has_tool("server_status"));
        assert!(tools.call("health", json!({})).is_none());
    }

    #[tokio::test]
    async fn test_status_ok() {
        let tools = tools_for(FakeWiki::new().with_generator("MediaWiki 1.41.0"));
        let value = status_of(&tools).await;
        assert_eq!(value["status"], "ok");
        assert_eq!(value["mediawiki_version"], "MediaWiki 1.41.0");
        assert_eq!(value["logged_in"], false);
        assert_eq!(value["scheme"], "https");
    }

    #[tokio::test]
    async fn test_status_error_is_not_a_tool_failure() {
        let tools = tools_for(FakeWiki::new().unreachable("no route to host"));
        let value = status_of(&tools).await;
        assert_eq!(
            value,
            json!({
                "status": "error",
                "host": "wiki.example.org",
                "error": "Connection failed: no route to host"
            })
        );
    }
}
