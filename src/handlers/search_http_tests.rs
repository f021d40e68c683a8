//! HTTP tests for the search endpoint
//!
//! The external search API is stood in by a wiremock server, so these tests
//! exercise the full pipeline: query build, rate limit, external call,
//! scoring, post-filtering, and caching.

use actix_web::{test, web, App};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::Config;
use crate::handlers::configure_search_routes;
use crate::AppState;

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

fn test_state(search_api_url: &str) -> web::Data<AppState> {
    let state = AppState::from_config(test_config(search_api_url))
        .expect("test state should construct");
    web::Data::new(state)
}

/// Raw search API item in the external API's own shape
fn raw_item(id: u64, name: &str, stars: u32, updated_days_ago: i64, description: &str) -> Value {
    json!({
        "id": id,
        "full_name": name,
        "html_url": format!("https://example.com/{name}"),
        "description": description,
        "language": "TypeScript",
        "topics": ["web", "cli"],
        "stargazers_count": stars,
        "forks_count": stars / 10,
        "open_issues_count": 2,
        "created_at": (Utc::now() - Duration::days(400)).to_rfc3339(),
        "updated_at": (Utc::now() - Duration::days(updated_days_ago)).to_rfc3339(),
        "owner": {"login": "octo", "avatar_url": null},
        "license": {"spdx_id": "MIT"}
    })
}

fn search_body(items: Vec<Value>) -> Value {
    json!({"total_count": items.len(), "items": items})
}

#[actix_web::test]
async fn test_search_returns_scored_repositories() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(search_body(vec![
                    raw_item(1, "octo/widget", 12_000, 1, &"d".repeat(80)),
                    raw_item(2, "octo/gadget", 40, 2, "small tool"),
                ]))
                .insert_header("x-ratelimit-remaining", "4999")
                .insert_header("x-ratelimit-reset", "1900000000"),
        )
        .mount(&server)
        .await;

    let app = test::init_service(
        App::new()
            .app_data(test_state(&server.uri()))
            .service(web::scope("/v1").configure(configure_search_routes)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/v1/repos/search?q=widget")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let repos = body["data"]["repositories"].as_array().unwrap();
    assert_eq!(repos.len(), 2);
    assert_eq!(body["data"]["totalCount"], 2);
    // Two items against a requested page size of 30: not a full page
    assert_eq!(body["data"]["hasMore"], false);

    let first_score = repos[0]["qualityScore"].as_u64().unwrap();
    let second_score = repos[1]["qualityScore"].as_u64().unwrap();
    assert!(first_score > second_score);
    assert!(first_score <= 100);
}

#[actix_web::test]
async fn test_min_quality_post_filter_drops_low_scores() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![
            raw_item(1, "octo/widget", 50_000, 1, &"d".repeat(80)),
            raw_item(2, "octo/dusty", 0, 900, ""),
        ])))
        .mount(&server)
        .await;

    let app = test::init_service(
        App::new()
            .app_data(test_state(&server.uri()))
            .service(web::scope("/v1").configure(configure_search_routes)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/v1/repos/search?q=widget&minQuality=50")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let repos = body["data"]["repositories"].as_array().unwrap();
    assert_eq!(repos.len(), 1);
    assert_eq!(repos[0]["fullName"], "octo/widget");
}

#[actix_web::test]
async fn test_server_side_star_filter_is_not_post_filtered() {
    // The external API owns the star constraint; a 50-star repository in
    // the response stays in the results when no post-filter is active
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![raw_item(
            7,
            "octo/under-threshold",
            50,
            3,
            "tiny but relevant",
        )])))
        .mount(&server)
        .await;

    let app = test::init_service(
        App::new()
            .app_data(test_state(&server.uri()))
            .service(web::scope("/v1").configure(configure_search_routes)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/v1/repos/search?q=tool&minStars=100")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let repos = body["data"]["repositories"].as_array().unwrap();
    assert_eq!(repos.len(), 1);
    assert!(repos[0]["qualityScore"].is_u64(), "item is still scored");

    // The constraint was forwarded to the external API as a query term
    let requests = server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap_or_default().to_string();
    assert!(query.contains("stars%3A%3E%3D100") || query.contains("stars:%3E=100"));
}

#[actix_web::test]
async fn test_repeated_search_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![raw_item(
            1,
            "octo/widget",
            1_000,
            1,
            "cached",
        )])))
        .expect(1)
        .mount(&server)
        .await;

    let app = test::init_service(
        App::new()
            .app_data(test_state(&server.uri()))
            .service(web::scope("/v1").configure(configure_search_routes)),
    )
    .await;

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/v1/repos/search?q=widget&language=rust")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
    // The mock's expect(1) verifies the second call never left the cache
}

#[actix_web::test]
async fn test_invalid_sort_key_is_rejected() {
    let app = test::init_service(
        App::new()
            .app_data(test_state("http://127.0.0.1:9"))
            .service(web::scope("/v1").configure(configure_search_routes)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/v1/repos/search?q=x&sort=popularity")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn test_external_failure_surfaces_as_search_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let app = test::init_service(
        App::new()
            .app_data(test_state(&server.uri()))
            .service(web::scope("/v1").configure(configure_search_routes)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/v1/repos/search?q=widget")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 502);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "SEARCH_FAILED");
}
