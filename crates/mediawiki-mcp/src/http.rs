//! HTTP transport.
//!
//! Mounts the streamable-HTTP MCP endpoint alongside the health routes:
//!
//! - `GET /` and `GET /health`: the `server_status` record as JSON, always 200
//! - `<path>`: MCP over streamable HTTP, behind the bearer token when one is set

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use mediawiki_client::{ConnectionStatus, WikiClient};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::auth::BearerAuthLayer;
use crate::error::{Error, Result};
use crate::server::WikiMcpServer;

/// Settings for the HTTP transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpOptions {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Mount path of the MCP endpoint.
    pub path: String,
    /// Bearer token required on the MCP endpoint.
    pub auth_token: Option<String>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            path: "/mcp".to_string(),
            auth_token: None,
        }
    }
}

/// Check an MCP mount path.
///
/// The path must start with `/` and must not collide with the health routes.
pub fn validate_mount_path(path: &str) -> Result<String> {
    if !path.starts_with('/') {
        return Err(Error::config(format!(
            "MCP path must start with '/', got '{path}'"
        )));
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() || trimmed == "/health" {
        return Err(Error::config("MCP path must not be '/' or '/health'"));
    }
    Ok(trimmed.to_string())
}

/// Build the axum application.
pub fn router(
    server: WikiMcpServer,
    client: Arc<WikiClient>,
    options: &HttpOptions,
) -> Result<Router> {
    let path = validate_mount_path(&options.path)?;

    let mcp = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    let mut mcp_routes = Router::new().nest_service(&path, mcp);
    match &options.auth_token {
        Some(token) => mcp_routes = mcp_routes.layer(BearerAuthLayer::new(token.clone())),
        None => warn!("No MCP auth token configured; {path} is open to any client"),
    }

    Ok(Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .with_state(client)
        .merge(mcp_routes))
}

async fn health(State(client): State<Arc<WikiClient>>) -> Json<ConnectionStatus> {
    Json(client.server_status().await)
}

/// Serve `app` until Ctrl-C.
pub async fn serve(app: Router, options: &HttpOptions) -> Result<()> {
    let listener = TcpListener::bind((options.host.as_str(), options.port)).await?;
    info!(
        "Serving MCP on http://{}{}",
        listener.local_addr()?,
        options.path
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
