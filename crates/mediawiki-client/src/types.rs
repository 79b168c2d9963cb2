//! Normalized response types returned by [`WikiClient`](crate::WikiClient).
//!
//! These are the shapes MCP callers see. Field names on the wire are
//! snake_case.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata for a wiki page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Canonical page URL.
    pub url: String,
    /// Timestamp of the newest revision, ISO-8601 UTC.
    pub last_modified: String,
    /// Namespace number.
    pub namespace: i64,
    /// Page length in bytes.
    pub length: u64,
    /// Action name (`edit`, `move`, ...) to required group levels.
    pub protection: BTreeMap<String, Vec<String>>,
    /// Full category titles, e.g. `Category:Physics`.
    pub categories: Vec<String>,
}

/// Full page content and metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Title as requested.
    pub title: String,
    /// Raw wikitext.
    pub content: String,
    /// Page metadata.
    pub metadata: PageMetadata,
}

/// Outcome of an update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateStatus {
    /// The revision was saved.
    #[serde(rename = "success")]
    Success,
    /// Nothing was written.
    #[serde(rename = "dry-run")]
    DryRun,
}

/// Response from [`WikiClient::update_page`](crate::WikiClient::update_page).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResult {
    /// `success` or `dry-run`.
    pub status: UpdateStatus,
    /// Page title.
    pub title: String,
    /// Page URL, on success only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Echoed content, on dry run only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Echoed summary, on dry run only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl UpdateResult {
    /// A saved update.
    pub fn success(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            status: UpdateStatus::Success,
            title: title.into(),
            url: Some(url.into()),
            content: None,
            summary: None,
        }
    }

    /// A preview that echoes its input.
    pub fn dry_run(
        title: impl Into<String>,
        content: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            status: UpdateStatus::DryRun,
            title: title.into(),
            url: None,
            content: Some(content.into()),
            summary: Some(summary.into()),
        }
    }
}

/// A single search hit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Page title.
    pub title: String,
    /// Highlighted excerpt; the backend may omit it.
    pub snippet: Option<String>,
}

/// Response from [`WikiClient::search_pages`](crate::WikiClient::search_pages).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Hits in backend order.
    pub results: Vec<SearchHit>,
    /// Number of hits returned.
    pub total: usize,
    /// The query that was executed.
    pub query: String,
}

/// One entry of a page history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionEntry {
    /// Revision id.
    pub revid: u64,
    /// Author; empty if hidden.
    pub user: String,
    /// Backend timestamp.
    pub timestamp: String,
    /// Edit summary; empty if hidden.
    pub comment: String,
}

/// `ok` or `error`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    /// Backend reachable.
    Ok,
    /// Backend unreachable or rejecting us.
    Error,
}

/// Connectivity record reported by `server_status` and the health endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// `ok` or `error`.
    pub status: StatusKind,
    /// Configured wiki host.
    pub host: String,
    /// Script path (ok only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// URL scheme (ok only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    /// Backend generator string, e.g. `MediaWiki 1.41.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mediawiki_version: Option<String>,
    /// Whether the status connection is logged in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_in: Option<bool>,
    /// Name the status connection acts as.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Failure message (error only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionStatus {
    /// Returns `true` for an `ok` record.
    pub fn is_ok(&self) -> bool {
        self.status == StatusKind::Ok
    }

    /// An `error` record for `host`.
    pub fn error(host: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: StatusKind::Error,
            host: host.into(),
            path: None,
            scheme: None,
            mediawiki_version: None,
            logged_in: None,
            username: None,
            error: Some(error.into()),
        }
    }
}
