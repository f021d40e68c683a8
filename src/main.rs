use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repoforge::{handlers, AppState, Config};

/// Health check endpoint
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "repoforge"
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repoforge=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");

    info!("Starting RepoForge server on {}:{}", config.host, config.port);
    info!(
        "External search API: {} (token: {})",
        config.search_api_url,
        if config.search_api_token.is_some() {
            "configured"
        } else {
            "absent"
        }
    );

    let server_addr = format!("{}:{}", config.host, config.port);

    // Construct all engine services once; handlers receive them by reference
    let app_state = web::Data::new(
        AppState::from_config(config).expect("Failed to construct engine services"),
    );

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/v1")
                    // Static paths like /repos/trending must come before any
                    // parameterized paths to keep actix-web matching stable
                    .configure(handlers::configure_trending_routes)
                    .configure(handlers::configure_search_routes)
                    .configure(handlers::configure_combination_routes),
            )
    })
    .bind(&server_addr)?
    .run()
    .await
}
