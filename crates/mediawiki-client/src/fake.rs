//! In-memory wiki for tests.
//!
//! [`FakeWiki`] is both the connector and the shared state behind every
//! connection it opens, and records what callers did so tests can assert
//! on backend traffic (connections, logins, writes, searches).

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::backend::{
    PageRecord, ProtectionRecord, RevisionRecord, SearchRecord, UserRecord, WikiConnection,
    WikiConnector,
};
use crate::config::WikiConfig;
use crate::error::{Error, Result};

/// A page stored in a [`FakeWiki`].
#[derive(Clone, Debug)]
pub struct FakePage {
    record: PageRecord,
    text: String,
    categories: Vec<String>,
    revisions: Vec<RevisionRecord>,
}

impl FakePage {
    /// A main-namespace page with the given text and no history.
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            record: PageRecord {
                title: title.into(),
                namespace: 0,
                length: text.len() as u64,
                protection: Vec::new(),
            },
            text,
            categories: Vec::new(),
            revisions: Vec::new(),
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: i64) -> Self {
        self.record.namespace = namespace;
        self
    }

    /// Add a category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    /// Add a protection rule.
    pub fn with_protection(mut self, action: impl Into<String>, level: impl Into<String>) -> Self {
        self.record.protection.push(ProtectionRecord {
            action: action.into(),
            level: level.into(),
        });
        self
    }

    /// Append a revision. Revisions are kept newest first, in the order added.
    pub fn with_revision(
        mut self,
        revid: u64,
        user: impl Into<String>,
        timestamp: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        self.revisions.push(RevisionRecord {
            revid,
            user: user.into(),
            timestamp: timestamp.into(),
            comment: comment.into(),
        });
        self
    }
}

#[derive(Debug, Default)]
struct FakeState {
    pages: BTreeMap<String, FakePage>,
    search_hits: Vec<SearchRecord>,
    generator: Option<String>,
    bot_account: Option<(String, String)>,
    unreachable: Option<String>,
    broken: Option<String>,
    connections: usize,
    logins: usize,
    edits: Vec<(String, String, String)>,
    searches: Vec<(String, u32)>,
}

/// Shared in-memory wiki.
#[derive(Clone, Debug, Default)]
pub struct FakeWiki {
    state: Arc<Mutex<FakeState>>,
}

impl FakeWiki {
    /// An empty wiki.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a page.
    pub fn with_page(self, page: FakePage) -> Self {
        self.lock().pages.insert(page.record.title.clone(), page);
        self
    }

    /// Hits returned by every search, before the limit is applied.
    pub fn with_search_hits(self, hits: Vec<(&str, Option<&str>)>) -> Self {
        self.lock().search_hits = hits
            .into_iter()
            .map(|(title, snippet)| SearchRecord {
                title: title.to_string(),
                snippet: snippet.map(str::to_string),
            })
            .collect();
        self
    }

    /// Generator string reported by site info.
    pub fn with_generator(self, generator: impl Into<String>) -> Self {
        self.lock().generator = Some(generator.into());
        self
    }

    /// The only credentials `login` accepts.
    pub fn with_bot_account(self, user: impl Into<String>, pass: impl Into<String>) -> Self {
        self.lock().bot_account = Some((user.into(), pass.into()));
        self
    }

    /// Make every `connect` fail with a connection error.
    pub fn unreachable(self, message: impl Into<String>) -> Self {
        self.lock().unreachable = Some(message.into());
        self
    }

    /// Connect normally but fail every request with a decode error.
    pub fn broken(self, message: impl Into<String>) -> Self {
        self.lock().broken = Some(message.into());
        self
    }

    /// Connections opened so far.
    pub fn connection_count(&self) -> usize {
        self.lock().connections
    }

    /// Login attempts so far.
    pub fn login_count(&self) -> usize {
        self.lock().logins
    }

    /// Number of saved edits.
    pub fn edit_count(&self) -> usize {
        self.lock().edits.len()
    }

    /// Saved edits as `(title, text, summary)`.
    pub fn edits(&self) -> Vec<(String, String, String)> {
        self.lock().edits.clone()
    }

    /// Searches issued as `(query, limit)`.
    pub fn searches(&self) -> Vec<(String, u32)> {
        self.lock().searches.clone()
    }

    /// Current text of a page.
    pub fn page_text(&self, title: &str) -> Option<String> {
        self.lock().pages.get(title).map(|p| p.text.clone())
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl WikiConnector for FakeWiki {
    async fn connect(&self, _config: &WikiConfig) -> Result<Box<dyn WikiConnection>> {
        let mut state = self.lock();
        state.connections += 1;
        if let Some(message) = &state.unreachable {
            return Err(Error::connection(message.clone()));
        }
        Ok(Box::new(FakeConnection {
            wiki: self.clone(),
            user: Mutex::new(None),
        }))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

struct FakeConnection {
    wiki: FakeWiki,
    user: Mutex<Option<String>>,
}

impl FakeConnection {
    fn state(&self) -> Result<MutexGuard<'_, FakeState>> {
        let state = self.wiki.lock();
        if let Some(message) = state.broken.clone() {
            return Err(Error::decode(message));
        }
        Ok(state)
    }

    fn existing<'a>(state: &'a FakeState, title: &str) -> Result<&'a FakePage> {
        state
            .pages
            .get(title)
            .ok_or_else(|| Error::PageNotFound(title.to_string()))
    }
}

#[async_trait]
impl WikiConnection for FakeConnection {
    async fn login(&self, user: &str, pass: &str) -> Result<()> {
        let accepted = {
            let mut state = self.state()?;
            state.logins += 1;
            state
                .bot_account
                .as_ref()
                .is_some_and(|(u, p)| u == user && p == pass)
        };
        if !accepted {
            return Err(Error::Authentication(
                "Incorrect username or password entered. Please try again.".to_string(),
            ));
        }
        *self.user.lock().unwrap_or_else(|p| p.into_inner()) = Some(user.to_string());
        Ok(())
    }

    async fn page(&self, title: &str) -> Result<Option<PageRecord>> {
        Ok(self.state()?.pages.get(title).map(|p| p.record.clone()))
    }

    async fn page_text(&self, title: &str) -> Result<String> {
        let state = self.state()?;
        Ok(Self::existing(&state, title)?.text.clone())
    }

    async fn categories(&self, title: &str) -> Result<Vec<String>> {
        let state = self.state()?;
        Ok(Self::existing(&state, title)?.categories.clone())
    }

    async fn revisions(&self, title: &str, limit: u32) -> Result<Vec<RevisionRecord>> {
        let state = self.state()?;
        Ok(Self::existing(&state, title)?
            .revisions
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn edit(&self, title: &str, text: &str, summary: &str) -> Result<()> {
        let mut state = self.state()?;
        // Edits assert a logged-in user, so anonymous sessions are refused.
        let user = self
            .user
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
            .ok_or_else(|| Error::Api {
                code: "assertuserfailed".to_string(),
                info: "You are no longer logged in, so the action could not be completed."
                    .to_string(),
            })?;

        state
            .edits
            .push((title.to_string(), text.to_string(), summary.to_string()));

        let next_revid = state
            .pages
            .values()
            .flat_map(|p| p.revisions.iter().map(|r| r.revid))
            .max()
            .unwrap_or(0)
            + 1;
        let page = state
            .pages
            .entry(title.to_string())
            .or_insert_with(|| FakePage::new(title, ""));
        page.text = text.to_string();
        page.record.length = text.len() as u64;
        page.revisions.insert(
            0,
            RevisionRecord {
                revid: next_revid,
                user,
                timestamp: "2024-06-01T00:00:00Z".to_string(),
                comment: summary.to_string(),
            },
        );
        Ok(())
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchRecord>> {
        let mut state = self.state()?;
        state.searches.push((query.to_string(), limit));
        Ok(state
            .search_hits
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn generator(&self) -> Result<Option<String>> {
        Ok(self.state()?.generator.clone())
    }

    async fn user(&self) -> Result<UserRecord> {
        let user = self.user.lock().unwrap_or_else(|p| p.into_inner()).clone();
        Ok(match user {
            Some(name) => UserRecord {
                name,
                logged_in: true,
            },
            None => UserRecord {
                name: "127.0.0.1".to_string(),
                logged_in: false,
            },
        })
    }
}
