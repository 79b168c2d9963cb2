//! The Action API backend against a mock wiki.

#![allow(clippy::unwrap_used)]

use mediawiki_client::{ErrorKind, StatusKind, UpdateStatus, WikiClient, WikiConfig, WikiSession};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API: &str = "/w/api.php";

fn client_for(server: &MockServer) -> WikiClient {
    let host = server.address().to_string();
    WikiClient::new(WikiSession::new(WikiConfig::new(host, "/w/", false)))
}

fn bot_client_for(server: &MockServer) -> WikiClient {
    let host = server.address().to_string();
    let config =
        WikiConfig::new(host, "/w/", false).with_bot_credentials(Some("Bot@mcp"), Some("pw"));
    WikiClient::new(WikiSession::new(config))
}

async fn mount_get(server: &MockServer, key: &str, value: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(API))
        .and(query_param(key, value))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_login(server: &MockServer, result: serde_json::Value) {
    mount_get(
        server,
        "type",
        "login",
        json!({"query": {"tokens": {"logintoken": "LT+\\"}}}),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(API))
        .and(body_string_contains("action=login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login": result })))
        .mount(server)
        .await;
}

async fn mount_existing_page(server: &MockServer) {
    mount_get(
        server,
        "prop",
        "info",
        json!({"query": {"pages": [{
            "pageid": 7, "ns": 0, "title": "Main Page", "length": 5,
            "protection": [
                {"type": "edit", "level": "sysop", "expiry": "infinity"},
                {"type": "move", "level": "sysop", "expiry": "infinity"}
            ]
        }]}}),
    )
    .await;
    mount_get(
        server,
        "rvprop",
        "ids|timestamp|user|comment",
        json!({"query": {"pages": [{
            "title": "Main Page",
            "revisions": [
                {"revid": 12, "user": "Alice", "timestamp": "2024-05-02T10:00:00Z", "comment": "tweak"},
                {"revid": 11, "user": "Bob", "timestamp": "2024-05-01T09:00:00Z", "comment": ""}
            ]
        }]}}),
    )
    .await;
    mount_get(
        server,
        "rvprop",
        "content",
        json!({"query": {"pages": [{
            "title": "Main Page",
            "revisions": [{"slots": {"main": {"contentmodel": "wikitext", "content": "Hello"}}}]
        }]}}),
    )
    .await;
}

#[tokio::test]
async fn test_get_page_over_http() {
    let server = MockServer::start().await;
    mount_existing_page(&server).await;

    // First category batch carries a continuation, the second does not.
    Mock::given(method("GET"))
        .and(path(API))
        .and(query_param("prop", "categories"))
        .and(query_param("clcontinue", "7|Zeta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"pages": [{"title": "Main Page", "categories": [{"ns": 14, "title": "Category:Zeta"}]}]}
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(API))
        .and(query_param("prop", "categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "continue": {"clcontinue": "7|Zeta", "continue": "||"},
            "query": {"pages": [{"title": "Main Page", "categories": [{"ns": 14, "title": "Category:Alpha"}]}]}
        })))
        .with_priority(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let page = client.get_page("Main Page").await.unwrap();

    assert_eq!(page.content, "Hello");
    assert_eq!(page.metadata.length, 5);
    assert_eq!(page.metadata.last_modified, "2024-05-02T10:00:00Z");
    assert_eq!(
        page.metadata.categories,
        vec!["Category:Alpha", "Category:Zeta"]
    );
    assert_eq!(page.metadata.protection["edit"], vec!["sysop"]);
    assert_eq!(page.metadata.protection["move"], vec!["sysop"]);
    assert_eq!(
        page.metadata.url,
        format!("http://{}/w/index.php/Main_Page", server.address())
    );
}

#[tokio::test]
async fn test_missing_page_over_http() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        "prop",
        "info",
        json!({"query": {"pages": [{"ns": 0, "title": "Nope", "missing": true}]}}),
    )
    .await;

    let client = client_for(&server);
    let err = client.get_page("Nope").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PageNotFound);

    let err = client.get_page_history("Nope", 5).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PageNotFound);
}

#[tokio::test]
async fn test_history_over_http() {
    let server = MockServer::start().await;
    mount_existing_page(&server).await;

    let client = client_for(&server);
    let history = client.get_page_history("Main Page", 2).await.unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].revid, 12);
    assert_eq!(history[0].user, "Alice");
    assert_eq!(history[1].comment, "");
}

#[tokio::test]
async fn test_search_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API))
        .and(query_param("list", "search"))
        .and(query_param("srsearch", "quantum"))
        .and(query_param("srlimit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"searchinfo": {"totalhits": 40}, "search": [
                {"ns": 0, "title": "Quantum", "snippet": "<span>quantum</span> field"},
                {"ns": 0, "title": "Qubit"}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.search_pages("quantum", 2).await.unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(result.query, "quantum");
    assert_eq!(
        result.results[0].snippet.as_deref(),
        Some("<span>quantum</span> field")
    );
    assert_eq!(result.results[1].snippet, None);
}

#[tokio::test]
async fn test_update_over_http_logs_in_and_saves() {
    let server = MockServer::start().await;
    mount_login(&server, json!({"result": "Success", "lgusername": "Bot"})).await;
    mount_get(
        &server,
        "type",
        "csrf",
        json!({"query": {"tokens": {"csrftoken": "abc+\\"}}}),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(API))
        .and(body_string_contains("action=edit"))
        .and(body_string_contains("summary=fix+typo"))
        .and(body_string_contains("assert=user"))
        .and(body_string_contains("bot=1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "edit": {"result": "Success", "title": "Sandbox", "newrevid": 99}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = bot_client_for(&server);
    let result = client
        .update_page("Sandbox", "new text", "fix typo", false)
        .await
        .unwrap();

    assert_eq!(result.status, UpdateStatus::Success);
    assert_eq!(
        result.url.unwrap(),
        format!("http://{}/w/index.php/Sandbox", server.address())
    );
}

#[tokio::test]
async fn test_update_without_credentials_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .update_page("Main Page", "x", "s", false)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Operation);
    assert_eq!(err.root_cause().kind(), ErrorKind::Authentication);
}

#[tokio::test]
async fn test_update_with_lost_login_is_operation_error() {
    let server = MockServer::start().await;
    mount_login(&server, json!({"result": "Success", "lgusername": "Bot"})).await;
    mount_get(
        &server,
        "type",
        "csrf",
        json!({"query": {"tokens": {"csrftoken": "+\\"}}}),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(API))
        .and(body_string_contains("action=edit"))
        .and(body_string_contains("assert=user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {
                "code": "assertuserfailed",
                "info": "You are no longer logged in, so the action could not be completed."
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = bot_client_for(&server)
        .update_page("Sandbox", "x", "y", false)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Operation);
    assert!(err.to_string().contains("assertuserfailed"));
}

#[tokio::test]
async fn test_dry_run_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let client = bot_client_for(&server);
    let result = client
        .update_page("Sandbox", "x", "y", true)
        .await
        .unwrap();
    assert_eq!(result.status, UpdateStatus::DryRun);
}

#[tokio::test]
async fn test_rejected_login_over_http() {
    let server = MockServer::start().await;
    mount_login(
        &server,
        json!({"result": "Failed", "reason": "Incorrect username or password entered."}),
    )
    .await;

    let client = bot_client_for(&server);
    let err = client.search_pages("x", 1).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Operation);
    assert_eq!(err.root_cause().kind(), ErrorKind::Authentication);
    assert!(err.to_string().contains("Incorrect username or password"));
}

#[tokio::test]
async fn test_api_error_object_is_operation_error() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        "list",
        "search",
        json!({"error": {"code": "srsearch-text-disabled", "info": "Text search is disabled."}}),
    )
    .await;

    let client = client_for(&server);
    let err = client.search_pages("x", 3).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Operation);
    assert!(err.to_string().contains("srsearch-text-disabled"));
}

#[tokio::test]
async fn test_http_status_error_is_operation_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.search_pages("x", 3).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Operation);
}

#[tokio::test]
async fn test_status_over_http() {
    let server = MockServer::start().await;
    mount_login(&server, json!({"result": "Success"})).await;
    mount_get(
        &server,
        "meta",
        "siteinfo",
        json!({"query": {"general": {"sitename": "Test", "generator": "MediaWiki 1.41.0"}}}),
    )
    .await;
    mount_get(
        &server,
        "meta",
        "userinfo",
        json!({"query": {"userinfo": {"id": 3, "name": "Bot"}}}),
    )
    .await;

    let client = bot_client_for(&server);
    let status = client.server_status().await;

    assert_eq!(status.status, StatusKind::Ok);
    assert_eq!(status.mediawiki_version.as_deref(), Some("MediaWiki 1.41.0"));
    assert_eq!(status.logged_in, Some(true));
    assert_eq!(status.username.as_deref(), Some("Bot"));
    assert_eq!(status.scheme.as_deref(), Some("http"));
    assert_eq!(status.path.as_deref(), Some("/w/"));
}

#[tokio::test]
async fn test_status_when_unreachable() {
    // Nothing listens on port 9 of the loopback interface.
    let client = WikiClient::new(WikiSession::new(WikiConfig::new("127.0.0.1:9", "/w/", false)));
    let status = client.server_status().await;

    assert_eq!(status.status, StatusKind::Error);
    assert_eq!(status.host, "127.0.0.1:9");
    assert!(status.error.is_some());
    assert!(status.mediawiki_version.is_none());
}
