//! The five wiki operations.
//!
//! Every operation acquires its own connection from the [`WikiSession`],
//! maps backend records into the normalized types in [`crate::types`], and
//! wraps failures with [`Error::wrap`] at the boundary.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{error, info, warn};

use crate::backend::ProtectionRecord;
use crate::config::WikiConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::session::WikiSession;
use crate::types::{
    ConnectionStatus, PageInfo, PageMetadata, RevisionEntry, SearchHit, SearchResult,
    UpdateResult,
};

/// Accepted range for `limit` arguments.
pub const LIMIT_RANGE: RangeInclusive<i64> = 1..=50;

/// Default number of search hits.
pub const DEFAULT_SEARCH_LIMIT: i64 = 10;

/// Default number of history entries.
pub const DEFAULT_HISTORY_LIMIT: i64 = 5;

/// MediaWiki operations backed by a [`WikiSession`].
#[derive(Debug)]
pub struct WikiClient {
    session: WikiSession,
}

impl WikiClient {
    /// Create a client over `session`.
    pub fn new(session: WikiSession) -> Self {
        Self { session }
    }

    /// The underlying session.
    pub fn session(&self) -> &WikiSession {
        &self.session
    }

    /// The wiki configuration.
    pub fn config(&self) -> &WikiConfig {
        self.session.config()
    }

    /// Fetch the content and metadata of `title`.
    ///
    /// # Errors
    ///
    /// [`Error::PageNotFound`] if the page does not exist,
    /// [`Error::Operation`] for any other failure.
    pub async fn get_page(&self, title: &str) -> Result<PageInfo> {
        info!("get_page called: title={title}");
        require_title(title)?;
        self.fetch_page(title)
            .await
            .map_err(boundary(format!("Failed to get page '{title}'")))
    }

    async fn fetch_page(&self, title: &str) -> Result<PageInfo> {
        let connection = self.session.acquire_connection().await?;
        let page = connection
            .page(title)
            .await?
            .ok_or_else(|| Error::PageNotFound(title.to_string()))?;

        let newest = connection
            .revisions(title, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::decode(format!("page '{title}' has no revisions")))?;
        let content = connection.page_text(title).await?;
        let categories = connection.categories(title).await?;

        Ok(PageInfo {
            title: title.to_string(),
            content,
            metadata: PageMetadata {
                url: self.config().page_url(title),
                last_modified: to_iso8601(&newest.timestamp)?,
                namespace: page.namespace,
                length: page.length,
                protection: group_protection(page.protection),
                categories,
            },
        })
    }

    /// Save `content` as a new revision of `title`.
    ///
    /// With `dry_run` the input is echoed back and no connection is opened.
    /// A write that was sent cannot be recalled: if the caller gives up
    /// while this future is pending, the edit may still land.
    ///
    /// # Errors
    ///
    /// Without bot credentials the wiki is read-only: the save fails with an
    /// [`Error::Operation`] caused by [`Error::Authentication`] and no
    /// connection is opened.
    pub async fn update_page(
        &self,
        title: &str,
        content: &str,
        summary: &str,
        dry_run: bool,
    ) -> Result<UpdateResult> {
        info!("update_page called: title={title}, summary={summary}, dry_run={dry_run}");

        if dry_run {
            return Ok(UpdateResult::dry_run(title, content, summary));
        }

        let save = async {
            if !self.config().is_auth_configured() {
                return Err(Error::Authentication(
                    "bot credentials are not configured; writes are disabled".to_string(),
                ));
            }
            let connection = self.session.acquire_connection().await?;
            connection.edit(title, content, summary).await
        };
        save.await
            .map_err(boundary(format!("Failed to update page '{title}'")))?;

        Ok(UpdateResult::success(title, self.config().page_url(title)))
    }

    /// Search pages for `query`, returning at most `limit` hits.
    ///
    /// `limit` outside [`LIMIT_RANGE`] fails with [`Error::Validation`]
    /// before any backend call.
    pub async fn search_pages(&self, query: &str, limit: i64) -> Result<SearchResult> {
        info!("search_pages called: query={query}, limit={limit}");
        let limit = validate_limit(limit)?;

        let search = async {
            let connection = self.session.acquire_connection().await?;
            connection.search(query, limit).await
        };
        let hits = search
            .await
            .map_err(boundary("Failed to search wiki".to_string()))?;

        let results: Vec<SearchHit> = hits
            .into_iter()
            .take(limit as usize)
            .map(|hit| SearchHit {
                title: hit.title,
                snippet: hit.snippet,
            })
            .collect();

        Ok(SearchResult {
            total: results.len(),
            results,
            query: query.to_string(),
        })
    }

    /// Up to `limit` most recent revisions of `title`, newest first.
    pub async fn get_page_history(&self, title: &str, limit: i64) -> Result<Vec<RevisionEntry>> {
        info!("get_page_history called: title={title}, limit={limit}");
        require_title(title)?;
        let limit = validate_limit(limit)?;

        let history = async {
            let connection = self.session.acquire_connection().await?;
            if connection.page(title).await?.is_none() {
                return Err(Error::PageNotFound(title.to_string()));
            }
            connection.revisions(title, limit).await
        };
        let revisions = history
            .await
            .map_err(boundary(format!("Failed to get page history for '{title}'")))?;

        Ok(revisions
            .into_iter()
            .map(|rev| RevisionEntry {
                revid: rev.revid,
                user: rev.user,
                timestamp: rev.timestamp,
                comment: rev.comment,
            })
            .collect())
    }

    /// Connectivity record for the backend. Never fails.
    pub async fn server_status(&self) -> ConnectionStatus {
        info!("server_status called");
        self.session.check_connection().await
    }
}

/// Check `limit` against [`LIMIT_RANGE`].
pub fn validate_limit(limit: i64) -> Result<u32> {
    if LIMIT_RANGE.contains(&limit) {
        Ok(limit as u32)
    } else {
        Err(Error::validation(format!(
            "limit must be between {} and {}, got {limit}",
            LIMIT_RANGE.start(),
            LIMIT_RANGE.end()
        )))
    }
}

fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        Err(Error::validation("title must not be empty"))
    } else {
        Ok(())
    }
}

/// Log a failure and wrap it for the operation boundary.
fn boundary(context: String) -> impl FnOnce(Error) -> Error {
    move |err| {
        match err.kind() {
            ErrorKind::PageNotFound | ErrorKind::Validation => warn!("{context}: {err}"),
            _ => error!("{context}: {err}"),
        }
        err.wrap(context)
    }
}

fn to_iso8601(timestamp: &str) -> Result<String> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|ts| {
            ts.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Secs, true)
        })
        .map_err(|e| Error::decode(format!("invalid timestamp '{timestamp}': {e}")))
}

fn group_protection(rules: Vec<ProtectionRecord>) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for rule in rules {
        grouped.entry(rule.action).or_default().push(rule.level);
    }
    grouped
}
