//! Action API response schema (`format=json&formatversion=2`).
//!
//! Required fields are plain types and fail decoding when absent; fields
//! the backend may legitimately omit are `Option` or `#[serde(default)]`.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Decode an API body, turning an `error` object into [`Error::Api`].
pub(crate) fn parse<T: DeserializeOwned>(body: &str) -> Result<T> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| Error::decode(format!("response is not JSON: {e}")))?;

    if let Some(error) = value.get("error") {
        let error: ApiError = serde_json::from_value(error.clone())
            .map_err(|e| Error::decode(format!("malformed error object: {e}")))?;
        return Err(Error::Api {
            code: error.code,
            info: error.info,
        });
    }

    serde_json::from_value(value).map_err(|e| Error::decode(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

/// `{"query": ..., "continue": ...}`
#[derive(Debug, Deserialize)]
pub(crate) struct QueryResponse<Q> {
    pub query: Q,
    #[serde(default, rename = "continue")]
    pub continuation: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PagesQuery<P> {
    pub pages: Vec<P>,
}

impl<P> PagesQuery<P> {
    pub fn into_first(self) -> Result<P> {
        self.pages
            .into_iter()
            .next()
            .ok_or_else(|| Error::decode("no page in response"))
    }
}

/// Fields shared by every `prop=` query on a page.
pub(crate) trait PageState {
    fn exists(&self) -> bool;
}

macro_rules! page_state {
    ($ty:ty) => {
        impl PageState for $ty {
            fn exists(&self) -> bool {
                !self.missing && !self.invalid
            }
        }
    };
}

#[derive(Debug, Deserialize)]
pub(crate) struct InfoPage {
    pub title: String,
    #[serde(default)]
    pub ns: i64,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub invalid: bool,
    #[serde(default)]
    pub length: u64,
    #[serde(default)]
    pub protection: Vec<Protection>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Protection {
    #[serde(rename = "type")]
    pub action: String,
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentPage {
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub invalid: bool,
    #[serde(default)]
    pub revisions: Vec<ContentRevision>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentRevision {
    pub slots: Slots,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Slots {
    pub main: Slot,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Slot {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryPage {
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub invalid: bool,
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Category {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryPage {
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub invalid: bool,
    #[serde(default)]
    pub revisions: Vec<HistoryRevision>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryRevision {
    pub revid: u64,
    pub timestamp: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub comment: String,
}

page_state!(InfoPage);
page_state!(ContentPage);
page_state!(CategoryPage);
page_state!(HistoryPage);

#[derive(Debug, Deserialize)]
pub(crate) struct TokensQuery {
    pub tokens: Tokens,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Tokens {
    pub logintoken: Option<String>,
    pub csrftoken: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub login: LoginResult,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResult {
    pub result: String,
    #[serde(default)]
    pub reason: Option<Value>,
}

impl LoginResult {
    /// Backend reason text, falling back to the result code.
    pub fn reason_text(&self) -> String {
        match &self.reason {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Object(map)) => map
                .get("text")
                .or_else(|| map.get("info"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(map.clone()).to_string()),
            Some(other) => other.to_string(),
            None => self.result.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct EditResponse {
    pub edit: EditResult,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EditResult {
    pub result: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchQuery {
    pub search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchHit {
    pub title: String,
    #[serde(default)]
    pub snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SiteInfoQuery {
    pub general: General,
}

#[derive(Debug, Deserialize)]
pub(crate) struct General {
    #[serde(default)]
    pub generator: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserInfoQuery {
    pub userinfo: UserInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserInfo {
    pub name: String,
    #[serde(default)]
    pub anon: bool,
}
