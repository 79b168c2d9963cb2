//! MediaWiki Action API backend over reqwest.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use url::Url;

use crate::api::{
    self, CategoryPage, ContentPage, EditResponse, HistoryPage, InfoPage, LoginResponse,
    PageState, PagesQuery, QueryResponse, SearchQuery, SiteInfoQuery, TokensQuery, UserInfoQuery,
};
use crate::backend::{
    PageRecord, ProtectionRecord, RevisionRecord, SearchRecord, UserRecord, WikiConnection,
    WikiConnector,
};
use crate::config::WikiConfig;
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("mcp-mediawiki/", env!("CARGO_PKG_VERSION"));

/// Opens [`HttpConnection`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpConnector;

#[async_trait]
impl WikiConnector for HttpConnector {
    async fn connect(&self, config: &WikiConfig) -> Result<Box<dyn WikiConnection>> {
        Ok(Box::new(HttpConnection::new(config)?))
    }

    fn name(&self) -> &str {
        "mediawiki-http"
    }
}

/// One session against `api.php`.
///
/// Owns its own HTTP client and cookie jar, so login state never outlives
/// the connection.
pub struct HttpConnection {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpConnection {
    /// Build a connection for `config`. No request is sent yet.
    pub fn new(config: &WikiConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.api_url())?;
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .connect_timeout(config.timeout())
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http, endpoint })
    }

    async fn get<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("formatversion", "2")
            .extend_pairs(params);

        let response = self.http.get(url).send().await.map_err(send_error)?;
        read(response).await
    }

    async fn post<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("format", "json")
            .append_pair("formatversion", "2")
            .extend_pairs(params)
            .finish();

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(send_error)?;
        read(response).await
    }

    async fn token(&self, kind: &str) -> Result<String> {
        let resp: QueryResponse<TokensQuery> = self
            .get(&[("action", "query"), ("meta", "tokens"), ("type", kind)])
            .await?;
        let tokens = resp.query.tokens;
        let token = match kind {
            "login" => tokens.logintoken,
            _ => tokens.csrftoken,
        };
        token.ok_or_else(|| Error::decode(format!("no {kind} token in response")))
    }

    async fn page_query<P>(&self, title: &str, params: &[(&str, &str)]) -> Result<P>
    where
        P: DeserializeOwned + PageState,
    {
        let mut all = vec![("action", "query"), ("titles", title)];
        all.extend_from_slice(params);
        let resp: QueryResponse<PagesQuery<P>> = self.get(&all).await?;
        let page = resp.query.into_first()?;
        if page.exists() {
            Ok(page)
        } else {
            Err(Error::PageNotFound(title.to_string()))
        }
    }
}

fn send_error(err: reqwest::Error) -> Error {
    if err.is_connect() {
        Error::connection(err.to_string())
    } else {
        Error::Http(err)
    }
}

async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let response = response.error_for_status()?;
    let body = response.text().await?;
    api::parse(&body)
}

#[async_trait]
impl WikiConnection for HttpConnection {
    async fn login(&self, user: &str, pass: &str) -> Result<()> {
        let token = self.token("login").await?;
        let resp: LoginResponse = self
            .post(&[
                ("action", "login"),
                ("lgname", user),
                ("lgpassword", pass),
                ("lgtoken", &token),
            ])
            .await?;

        if resp.login.result == "Success" {
            Ok(())
        } else {
            Err(Error::Authentication(resp.login.reason_text()))
        }
    }

    async fn page(&self, title: &str) -> Result<Option<PageRecord>> {
        match self
            .page_query::<InfoPage>(title, &[("prop", "info"), ("inprop", "protection")])
            .await
        {
            Ok(page) => Ok(Some(PageRecord {
                title: page.title,
                namespace: page.ns,
                length: page.length,
                protection: page
                    .protection
                    .into_iter()
                    .map(|p| ProtectionRecord {
                        action: p.action,
                        level: p.level,
                    })
                    .collect(),
            })),
            Err(Error::PageNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn page_text(&self, title: &str) -> Result<String> {
        let page: ContentPage = self
            .page_query(
                title,
                &[
                    ("prop", "revisions"),
                    ("rvprop", "content"),
                    ("rvslots", "main"),
                    ("rvlimit", "1"),
                ],
            )
            .await?;
        page.revisions
            .into_iter()
            .next()
            .map(|rev| rev.slots.main.content)
            .ok_or_else(|| Error::decode(format!("page '{title}' has no revisions")))
    }

    async fn categories(&self, title: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut continuation: Option<BTreeMap<String, String>> = None;

        loop {
            let mut params = vec![
                ("action", "query"),
                ("titles", title),
                ("prop", "categories"),
                ("cllimit", "max"),
            ];
            if let Some(cont) = &continuation {
                params.extend(cont.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            }

            let resp: QueryResponse<PagesQuery<CategoryPage>> = self.get(&params).await?;
            let page = resp.query.into_first()?;
            if !page.exists() {
                return Err(Error::PageNotFound(title.to_string()));
            }
            names.extend(page.categories.into_iter().map(|c| c.title));

            match resp.continuation {
                Some(next) if continuation.as_ref() != Some(&next) => continuation = Some(next),
                _ => break,
            }
        }

        Ok(names)
    }

    async fn revisions(&self, title: &str, limit: u32) -> Result<Vec<RevisionRecord>> {
        let limit = limit.to_string();
        let page: HistoryPage = self
            .page_query(
                title,
                &[
                    ("prop", "revisions"),
                    ("rvprop", "ids|timestamp|user|comment"),
                    ("rvlimit", &limit),
                ],
            )
            .await?;
        Ok(page
            .revisions
            .into_iter()
            .map(|rev| RevisionRecord {
                revid: rev.revid,
                user: rev.user,
                timestamp: rev.timestamp,
                comment: rev.comment,
            })
            .collect())
    }

    async fn edit(&self, title: &str, text: &str, summary: &str) -> Result<()> {
        let token = self.token("csrf").await?;
        let resp: EditResponse = self
            .post(&[
                ("action", "edit"),
                ("title", title),
                ("text", text),
                ("summary", summary),
                ("assert", "user"),
                ("bot", "1"),
                ("token", &token),
            ])
            .await?;

        if resp.edit.result == "Success" {
            Ok(())
        } else {
            Err(Error::Api {
                code: resp.edit.result,
                info: format!("edit of '{title}' was not saved"),
            })
        }
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchRecord>> {
        let srlimit = limit.to_string();
        let resp: QueryResponse<SearchQuery> = self
            .get(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srnamespace", "0"),
                ("srlimit", &srlimit),
            ])
            .await?;
        Ok(resp
            .query
            .search
            .into_iter()
            .take(limit as usize)
            .map(|hit| SearchRecord {
                title: hit.title,
                snippet: hit.snippet,
            })
            .collect())
    }

    async fn generator(&self) -> Result<Option<String>> {
        let resp: QueryResponse<SiteInfoQuery> = self
            .get(&[("action", "query"), ("meta", "siteinfo"), ("siprop", "general")])
            .await?;
        Ok(resp.query.general.generator)
    }

    async fn user(&self) -> Result<UserRecord> {
        let resp: QueryResponse<UserInfoQuery> =
            self.get(&[("action", "query"), ("meta", "userinfo")]).await?;
        Ok(UserRecord {
            name: resp.query.userinfo.name,
            logged_in: !resp.query.userinfo.anon,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_uses_api_endpoint() {
        let config = WikiConfig::new("wiki.local:8080", "/w/", false);
        let conn = HttpConnection::new(&config).unwrap();
        assert_eq!(conn.endpoint.as_str(), "http://wiki.local:8080/w/api.php");
    }

    #[test]
    fn test_invalid_host_is_url_error() {
        let config = WikiConfig::new("bad host", "/w/", true);
        assert!(matches!(HttpConnection::new(&config), Err(Error::Url(_))));
    }

    #[test]
    fn test_connector_name() {
        assert_eq!(HttpConnector.name(), "mediawiki-http");
    }
}
