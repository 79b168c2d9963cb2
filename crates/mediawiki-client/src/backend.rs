//! Backend connection traits.
//!
//! A [`WikiConnector`] opens connections; a [`WikiConnection`] is one
//! session against the wiki, used for a single operation and then dropped.
//!
//! # Backends
//!
//! - `HttpConnector`: the MediaWiki Action API over reqwest
//! - `FakeWiki`: in-memory wiki for tests

use async_trait::async_trait;

use crate::config::WikiConfig;
use crate::error::Result;

/// A page as reported by the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRecord {
    /// Normalized title.
    pub title: String,
    /// Namespace number.
    pub namespace: i64,
    /// Length in bytes.
    pub length: u64,
    /// Protection entries in backend order.
    pub protection: Vec<ProtectionRecord>,
}

/// One protection rule on a page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtectionRecord {
    /// Action the rule applies to (`edit`, `move`, ...).
    pub action: String,
    /// Group level required for the action.
    pub level: String,
}

/// One revision as reported by the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct RevisionRecord {
    pub revid: u64,
    pub user: String,
    pub timestamp: String,
    pub comment: String,
}

/// One raw search hit.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct SearchRecord {
    pub title: String,
    pub snippet: Option<String>,
}

/// Who the connection is acting as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRecord {
    /// User name; an IP address for anonymous sessions.
    pub name: String,
    /// `false` for anonymous sessions.
    pub logged_in: bool,
}

/// A live session against the wiki.
///
/// Implementations don't retry and don't cache anything beyond the
/// lifetime of the connection itself.
#[async_trait]
pub trait WikiConnection: Send + Sync {
    /// Log in with bot credentials.
    ///
    /// Rejection is reported as [`Error::Authentication`](crate::Error::Authentication).
    async fn login(&self, user: &str, pass: &str) -> Result<()>;

    /// Look up a page by exact title. `None` if it does not exist.
    async fn page(&self, title: &str) -> Result<Option<PageRecord>>;

    /// Current wikitext of a page.
    async fn page_text(&self, title: &str) -> Result<String>;

    /// All categories of a page.
    async fn categories(&self, title: &str) -> Result<Vec<String>>;

    /// Up to `limit` revisions, newest first.
    async fn revisions(&self, title: &str, limit: u32) -> Result<Vec<RevisionRecord>>;

    /// Save `text` as a new revision of `title`.
    ///
    /// Only a logged-in connection may edit; an anonymous one fails instead
    /// of saving as an IP edit.
    async fn edit(&self, title: &str, text: &str, summary: &str) -> Result<()>;

    /// Search pages, capped at `limit` hits.
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchRecord>>;

    /// Software generator string, e.g. `MediaWiki 1.41.0`.
    async fn generator(&self) -> Result<Option<String>>;

    /// The user this connection is acting as.
    async fn user(&self) -> Result<UserRecord>;
}

/// Opens fresh, unauthenticated connections.
#[async_trait]
pub trait WikiConnector: Send + Sync {
    /// Open a new connection to the wiki described by `config`.
    async fn connect(&self, config: &WikiConfig) -> Result<Box<dyn WikiConnection>>;

    /// Backend name for diagnostics.
    fn name(&self) -> &str;
}
