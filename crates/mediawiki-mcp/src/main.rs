//! MediaWiki MCP Server
//!
//! Standalone MCP server exposing a MediaWiki site to AI agents.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mediawiki_client::{ConnectionStatus, WikiClient, WikiSession};
use mediawiki_mcp::WikiMcpServer;
use mediawiki_mcp::cli::{Args, Transport, init_logging};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    let dotenv = dotenvy::dotenv();

    let args = Args::parse();
    init_logging(args.verbose);

    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let config = args.wiki_config();
    info!(
        transport = ?args.transport,
        "Starting mcp-mediawiki v{} with {config:?}",
        env!("CARGO_PKG_VERSION")
    );

    let client = Arc::new(WikiClient::new(WikiSession::new(config)));
    report_status(&client.session().check_connection().await);

    let server = WikiMcpServer::for_client(Arc::clone(&client));

    match args.transport {
        Transport::Stdio => server.serve_stdio().await.context("stdio transport failed")?,
        Transport::StreamableHttp => {
            let options = args.http_options();
            let app = mediawiki_mcp::http::router(server, client, &options)
                .context("invalid HTTP transport settings")?;
            mediawiki_mcp::http::serve(app, &options)
                .await
                .context("HTTP transport failed")?;
        }
    }

    Ok(())
}

fn report_status(status: &ConnectionStatus) {
    if status.is_ok() {
        info!(
            version = status.mediawiki_version.as_deref().unwrap_or("unknown"),
            logged_in = status.logged_in.unwrap_or(false),
            user = status.username.as_deref().unwrap_or(""),
            "Connected to {}",
            status.host
        );
    } else {
        warn!(
            "Wiki at {} is not reachable yet: {}",
            status.host,
            status.error.as_deref().unwrap_or("unknown error")
        );
    }
}
