//! Integration tests for the search pipeline
//!
//! Runs the engine against a wiremock stand-in for the external search API,
//! covering pagination, the has-more approximation, and the enrichment
//! degradation paths.

use std::time::Duration;

use actix_web::{test, web, App};
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use repoforge::models::RepoOwner;
use repoforge::{handlers, AppState, Config, Repository};

fn test_config(search_api_url: &str) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 8080,
        search_api_url: search_api_url.to_string(),
        search_api_token: None,
        search_page_size: 30,
        cache_ttl_secs: 900,
        rate_limit_quota: 5000,
        min_request_interval_ms: 1,
        http_timeout_secs: 5,
        request_timeout_secs: 5,
        excluded_users: vec![],
    }
}

fn raw_item(id: u64) -> Value {
    json!({
        "id": id,
        "full_name": format!("octo/repo-{id}"),
        "html_url": format!("https://example.com/octo/repo-{id}"),
        "description": "a web project with enough description to count",
        "language": "TypeScript",
        "topics": ["web"],
        "stargazers_count": 100 + id,
        "forks_count": 10,
        "open_issues_count": 1,
        "created_at": (Utc::now() - ChronoDuration::days(200)).to_rfc3339(),
        "updated_at": (Utc::now() - ChronoDuration::days(1)).to_rfc3339(),
        "owner": {"login": "octo", "avatar_url": null},
        "license": {"spdx_id": "MIT"}
    })
}

fn sample_repository() -> Repository {
    Repository {
        id: 42,
        full_name: "octo/sample".to_string(),
        url: "https://example.com/octo/sample".to_string(),
        description: Some("a sample project".to_string()),
        language: Some("Rust".to_string()),
        topics: vec!["cli".to_string()],
        stars: 800,
        forks: 40,
        open_issues: 2,
        created_at: Utc::now() - ChronoDuration::days(500),
        updated_at: Utc::now() - ChronoDuration::days(2),
        owner: RepoOwner {
            login: "octo".to_string(),
            avatar_url: None,
        },
        quality_score: None,
        enrichment: None,
    }
}

#[actix_web::test]
async fn test_full_page_sets_has_more_and_next_page() {
    let server = MockServer::start().await;
    let items: Vec<Value> = (1..=30).map(raw_item).collect();
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"total_count": 95, "items": items})),
        )
        .mount(&server)
        .await;

    let state = web::Data::new(AppState::from_config(test_config(&server.uri())).unwrap());
    let app = test::init_service(
        App::new()
            .app_data(state)
            .service(web::scope("/v1").configure(handlers::configure_search_routes)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/v1/repos/search?q=web&page=2")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["data"]["repositories"].as_array().unwrap().len(), 30);
    assert_eq!(body["data"]["hasMore"], true);
    assert_eq!(body["data"]["nextPage"], 3);
    assert_eq!(body["data"]["totalCount"], 95);
}

#[actix_web::test]
async fn test_partial_page_has_no_next_page() {
    let server = MockServer::start().await;
    let items: Vec<Value> = (1..=7).map(raw_item).collect();
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"total_count": 7, "items": items})),
        )
        .mount(&server)
        .await;

    let state = web::Data::new(AppState::from_config(test_config(&server.uri())).unwrap());
    let app = test::init_service(
        App::new()
            .app_data(state)
            .service(web::scope("/v1").configure(handlers::configure_search_routes)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/v1/repos/search?q=web")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["data"]["hasMore"], false);
    assert!(body["data"].get("nextPage").is_none());
}

#[tokio::test]
async fn test_enrichment_populates_languages_and_contributors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/sample/languages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"Rust": 120000, "TypeScript": 4000})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/sample/contributors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"login": "octo"},
            {"login": "hexa"},
            {"login": "tetra"}
        ])))
        .mount(&server)
        .await;

    let state = AppState::from_config(test_config(&server.uri())).unwrap();
    let mut repo = sample_repository();
    let cancel = CancellationToken::new();

    state
        .search
        .enrich_repository(&mut repo, &cancel)
        .await
        .unwrap();

    let enrichment = repo.enrichment.expect("enrichment should be set");
    assert_eq!(enrichment.languages.len(), 2);
    assert_eq!(enrichment.contributor_count, Some(3));
    assert!(repo.quality_score.unwrap() > 0);
}

#[tokio::test]
async fn test_enrichment_degrades_on_lookup_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/sample/languages"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/sample/contributors"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let state = AppState::from_config(test_config(&server.uri())).unwrap();
    let mut repo = sample_repository();
    let cancel = CancellationToken::new();

    // Both lookups fail; enrichment still succeeds with empty defaults
    state
        .search
        .enrich_repository(&mut repo, &cancel)
        .await
        .unwrap();

    let enrichment = repo.enrichment.expect("enrichment should be set");
    assert!(enrichment.languages.is_empty());
    assert_eq!(enrichment.contributor_count, None);
    assert!(repo.quality_score.is_some());
}

#[tokio::test]
async fn test_transport_timeout_surfaces_as_search_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"total_count": 0, "items": []}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.http_timeout_secs = 1;
    let state = AppState::from_config(config).unwrap();

    let cancel = CancellationToken::new();
    let result = state
        .search
        .search("web", &Default::default(), 1, &cancel)
        .await;

    assert!(matches!(
        result,
        Err(repoforge::services::SearchError::SearchFailed(_))
    ));
}
