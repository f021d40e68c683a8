//! End-to-end workflow tests
//!
//! Drives the full engine surface over HTTP: search for repositories,
//! analyze their compatibility, combine them, and fetch the stored result.

use actix_web::{test, web, App};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use repoforge::{handlers, AppState, Config};

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
        excluded_users: vec!["spambot".to_string()],
    }
}

fn raw_item(id: u64, name: &str, description: &str) -> Value {
    json!({
        "id": id,
        "full_name": name,
        "html_url": format!("https://example.com/{name}"),
        "description": description,
        "language": "TypeScript",
        "topics": ["nextjs", "typescript"],
        "stargazers_count": 2_000,
        "forks_count": 150,
        "open_issues_count": 4,
        "created_at": (Utc::now() - Duration::days(300)).to_rfc3339(),
        "updated_at": (Utc::now() - Duration::days(1)).to_rfc3339(),
        "owner": {"login": "octo", "avatar_url": null},
        "license": {"spdx_id": "MIT"}
    })
}

#[actix_web::test]
async fn test_search_analyze_combine_workflow() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 2,
            "items": [
                raw_item(101, "octo/storefront", "A nextjs storefront with auth"),
                raw_item(102, "octo/blog", "A nextjs blog with markdown content"),
            ]
        })))
        .mount(&server)
        .await;

    let state = web::Data::new(AppState::from_config(test_config(&server.uri())).unwrap());
    let app = test::init_service(
        App::new()
            .app_data(state)
            .service(
                web::scope("/v1")
                    .configure(handlers::configure_trending_routes)
                    .configure(handlers::configure_search_routes)
                    .configure(handlers::configure_combination_routes),
            ),
    )
    .await;

    // 1. Search: both repositories come back scored
    let req = test::TestRequest::get()
        .uri("/v1/repos/search?q=nextjs")
        .to_request();
    let search_body: Value = test::call_and_read_body_json(&app, req).await;
    let repositories = search_body["data"]["repositories"].as_array().unwrap().clone();
    assert_eq!(repositories.len(), 2);
    assert!(repositories.iter().all(|r| r["qualityScore"].is_u64()));

    // The exclusion list reached the outbound query
    let requests = server.received_requests().await.unwrap();
    let outbound_query = requests[0].url.query().unwrap_or_default().to_string();
    assert!(
        outbound_query.contains("-user%3Aspambot")
            || outbound_query.contains("-user:spambot")
    );

    // 2. Analyze: both detected as nextjs, so compatibility is perfect
    let req = test::TestRequest::post()
        .uri("/v1/combinations/analyze")
        .set_json(json!({"repositories": repositories.clone()}))
        .to_request();
    let analyze_body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(analyze_body["data"]["score"], 100);
    assert_eq!(analyze_body["data"]["conflicts"].as_array().unwrap().len(), 0);

    // 3. Combine: the stored result is retrievable by id and listed
    let req = test::TestRequest::post()
        .uri("/v1/combinations")
        .set_json(json!({
            "name": "super-site",
            "repositories": repositories,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let combine_body: Value = test::read_body_json(resp).await;

    let data = &combine_body["data"];
    assert_eq!(data["strategy"]["targetFramework"], "nextjs");
    assert_eq!(data["strategy"]["dependencyPolicy"], "unified");
    assert_eq!(data["deployment"]["outputDir"], ".next");
    assert_eq!(data["scripts"]["dev"], "next dev");

    let deps: Vec<&str> = data["dependencies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d.as_str().unwrap())
        .collect();
    for expected in ["next", "react", "react-dom", "typescript"] {
        assert!(deps.contains(&expected), "missing {expected}");
    }

    let id = data["id"].as_str().unwrap();
    assert!(id.starts_with("combo-101-102-"));

    let req = test::TestRequest::get()
        .uri(&format!("/v1/combinations/{id}"))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["data"]["id"], id);

    let req = test::TestRequest::get().uri("/v1/combinations").to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
    assert_eq!(listed["data"][0]["id"], id);
}
