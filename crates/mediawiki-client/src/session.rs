//! Per-operation connection management.
//!
//! [`WikiSession`] hands out a brand new connection on every call to
//! [`acquire_connection`](WikiSession::acquire_connection). Nothing is pooled:
//! an expired login on the backend can never leak into a later operation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, error};

use crate::backend::{WikiConnection, WikiConnector};
use crate::config::WikiConfig;
use crate::error::Result;
use crate::http::HttpConnector;
use crate::types::{ConnectionStatus, StatusKind};

/// Produces authenticated connections on demand.
pub struct WikiSession {
    config: Arc<WikiConfig>,
    connector: Arc<dyn WikiConnector>,
    connections: AtomicU64,
}

impl WikiSession {
    /// Create a session talking to the real Action API.
    pub fn new(config: WikiConfig) -> Self {
        Self::with_connector(config, Arc::new(HttpConnector))
    }

    /// Create a session with a custom connector.
    pub fn with_connector(config: WikiConfig, connector: Arc<dyn WikiConnector>) -> Self {
        Self {
            config: Arc::new(config),
            connector,
            connections: AtomicU64::new(0),
        }
    }

    /// The configuration this session connects with.
    pub fn config(&self) -> &WikiConfig {
        &self.config
    }

    /// Number of connections opened so far. Diagnostic only.
    pub fn connection_count(&self) -> u64 {
        self.connections.load(Ordering::Relaxed)
    }

    /// Open a fresh connection, logging in when bot credentials are set.
    ///
    /// A rejected login fails with
    /// [`Error::Authentication`](crate::Error::Authentication) and is not
    /// retried or downgraded to an anonymous connection.
    pub async fn acquire_connection(&self) -> Result<Box<dyn WikiConnection>> {
        let number = self.connections.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(
            connection = number,
            backend = self.connector.name(),
            "Creating MediaWiki connection #{number}"
        );

        let connection = self.connector.connect(&self.config).await?;

        if let Some((user, pass)) = self.config.bot_credentials() {
            if let Err(e) = connection.login(user, pass).await {
                error!("Login failed: {e}");
                return Err(e);
            }
            debug!("Logged in as: {user}");
        }

        Ok(connection)
    }

    /// Probe the backend. Never fails: errors land in the returned record.
    pub async fn check_connection(&self) -> ConnectionStatus {
        match self.fetch_status().await {
            Ok(status) => status,
            Err(e) => ConnectionStatus::error(self.config.host(), e.to_string()),
        }
    }

    async fn fetch_status(&self) -> Result<ConnectionStatus> {
        let connection = self.acquire_connection().await?;
        let generator = connection.generator().await?;
        let user = connection.user().await?;

        Ok(ConnectionStatus {
            status: StatusKind::Ok,
            host: self.config.host().to_string(),
            path: Some(self.config.path().to_string()),
            scheme: Some(self.config.scheme().to_string()),
            mediawiki_version: generator,
            logged_in: Some(user.logged_in),
            username: Some(user.name),
            error: None,
        })
    }
}

impl std::fmt::Debug for WikiSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WikiSession")
            .field("config", &self.config)
            .field("backend", &self.connector.name())
            .field("connections", &self.connection_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fake::{FakePage, FakeWiki};

    fn session(wiki: &FakeWiki, config: WikiConfig) -> WikiSession {
        WikiSession::with_connector(config, Arc::new(wiki.clone()))
    }

    #[tokio::test]
    async fn test_every_acquire_opens_new_connection() {
        let wiki = FakeWiki::new();
        let session = session(&wiki, WikiConfig::default());

        let _a = session.acquire_connection().await.unwrap();
        let _b = session.acquire_connection().await.unwrap();

        assert_eq!(session.connection_count(), 2);
        assert_eq!(wiki.connection_count(), 2);
    }

    #[tokio::test]
    async fn test_anonymous_when_no_credentials() {
        let wiki = FakeWiki::new();
        let session = session(&wiki, WikiConfig::default());

        let conn = session.acquire_connection().await.unwrap();
        assert!(!conn.user().await.unwrap().logged_in);
        assert_eq!(wiki.login_count(), 0);
    }

    #[tokio::test]
    async fn test_login_with_credentials() {
        let wiki = FakeWiki::new().with_bot_account("Bot", "secret");
        let config = WikiConfig::default().with_bot_credentials(Some("Bot"), Some("secret"));
        let session = session(&wiki, config);

        let conn = session.acquire_connection().await.unwrap();
        let user = conn.user().await.unwrap();
        assert!(user.logged_in);
        assert_eq!(user.name, "Bot");
        assert_eq!(wiki.login_count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_login_is_authentication_error() {
        let wiki = FakeWiki::new().with_bot_account("Bot", "secret");
        let config = WikiConfig::default().with_bot_credentials(Some("Bot"), Some("wrong"));
        let session = session(&wiki, config);

        let err = session.acquire_connection().await.err().unwrap();
        assert!(matches!(err, Error::Authentication(_)));
        assert_eq!(wiki.login_count(), 1);
    }

    #[tokio::test]
    async fn test_check_connection_ok() {
        let wiki = FakeWiki::new()
            .with_generator("FakeWiki 1.0")
            .with_page(FakePage::new("Existing", "text"));
        let session = session(&wiki, WikiConfig::new("wiki.local", "/w/", true));

        let status = session.check_connection().await;
        assert!(status.is_ok());
        assert_eq!(status.host, "wiki.local");
        assert_eq!(status.path.as_deref(), Some("/w/"));
        assert_eq!(status.scheme.as_deref(), Some("https"));
        assert_eq!(status.mediawiki_version.as_deref(), Some("FakeWiki 1.0"));
        assert_eq!(status.logged_in, Some(false));
    }

    #[tokio::test]
    async fn test_check_connection_unreachable() {
        let wiki = FakeWiki::new().unreachable("connection refused");
        let session = session(&wiki, WikiConfig::new("wiki.local", "/w/", true));

        let status = session.check_connection().await;
        assert_eq!(status.status, StatusKind::Error);
        assert_eq!(status.host, "wiki.local");
        assert!(status.error.unwrap().contains("connection refused"));
        assert!(status.mediawiki_version.is_none());
    }

    #[tokio::test]
    async fn test_check_connection_bad_login() {
        let wiki = FakeWiki::new().with_bot_account("Bot", "secret");
        let config = WikiConfig::default().with_bot_credentials(Some("Bot"), Some("nope"));
        let session = session(&wiki, config);

        let status = session.check_connection().await;
        assert_eq!(status.status, StatusKind::Error);
        assert!(status.error.unwrap().starts_with("Authentication failed"));
    }

    #[test]
    fn test_debug_output() {
        let session = session(&FakeWiki::new(), WikiConfig::default());
        let debug = format!("{session:?}");
        assert!(debug.contains("fake"));
        assert!(debug.contains("connections: 0"));
    }
}
