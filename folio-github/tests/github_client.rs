//! GithubClient against a wiremock server.

use folio_github::{GithubClient, GithubError, RepoSource};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn repo_json(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "html_url": format!("https://github.com/octo/{name}"),
        "homepage": null,
        "size": 120,
        "pushed_at": "2026-03-01T10:00:00Z",
        "fork": false,
        "archived": false,
        "stargazers_count": 3
    })
}

fn client(server: &MockServer, token: Option<&str>) -> GithubClient {
    GithubClient::new(token.map(str::to_string))
        .expect("client")
        .with_base_url(server.uri())
}

#[tokio::test]
async fn list_repos_follows_pages_until_short_page() {
    let server = MockServer::start().await;

    let full_page: Vec<Value> = (0..100).map(|i| repo_json(i, &format!("repo-{i}"))).collect();
    Mock::given(method("GET"))
        .and(path("/users/octo/repos"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&full_page))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/octo/repos"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([repo_json(500, "last")])))
        .expect(1)
        .mount(&server)
        .await;

    let repos = client(&server, None).list_repos("octo").await.expect("list");
    assert_eq!(repos.len(), 101);
    assert_eq!(repos[100].name, "last");
    assert!(repos[0].pushed_at.is_some());
}

#[tokio::test]
async fn token_is_sent_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/tool/languages"))
        .and(header("Authorization", "Bearer ghp_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Rust": 900, "Shell": 12})))
        .mount(&server)
        .await;

    let langs = client(&server, Some("ghp_test"))
        .repo_languages("octo", "tool")
        .await
        .expect("languages");
    assert_eq!(langs.get("Rust"), Some(&900));
    assert_eq!(langs.len(), 2);
}

#[tokio::test]
async fn readme_is_requested_raw() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/tool/readme"))
        .and(header("Accept", "application/vnd.github.raw+json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Tool\n\nDoes things."))
        .mount(&server)
        .await;

    let readme = client(&server, None)
        .repo_readme("octo", "tool")
        .await
        .expect("readme");
    assert!(readme.starts_with("# Tool"));
}

#[tokio::test]
async fn missing_readme_surfaces_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/bare/readme"))
        .respond_with(ResponseTemplate::new(404).set_body_string("{\"message\":\"Not Found\"}"))
        .mount(&server)
        .await;

    let err = client(&server, None)
        .repo_readme("octo", "bare")
        .await
        .unwrap_err();
    match err {
        GithubError::Api { status, message } => {
            assert_eq!(status, 404);
            assert!(message.contains("Not Found"));
        }
        other => panic!("expected Api error, got {other}"),
    }
}
