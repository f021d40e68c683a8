//! RepoForge - discover, rank, and combine source-code repositories
//!
//! This library provides the repository intelligence engine: quality
//! scoring, rate-limited cached search against an external hosting API, and
//! the multi-repository compatibility and merge-strategy engine.

use std::time::Duration;

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::AppError;

// Re-export specific items to avoid ambiguous glob re-exports
pub use models::{
    CombinationResult, CombineRequest, CompatibilityReport, Framework, MergeStrategy, Repository,
    SearchFilters, SearchResponse, TrendingTimeframe,
};

pub use services::{
    CombinationService, CompatibilityService, QueryBuilder, RateLimiterService, SearchApiClient,
    SearchApiError, SearchCache, SearchService,
};

/// Application state shared across handlers
///
/// Constructed once at process start and passed by reference to request
/// handlers; there is no ambient global state.
pub struct AppState {
    pub config: Config,
    pub search: SearchService,
    pub compatibility: CompatibilityService,
    pub combinations: CombinationService,
}

impl AppState {
    /// Build every service from the loaded configuration
    pub fn from_config(config: Config) -> Result<Self, SearchApiError> {
        let client = SearchApiClient::new(
            &config.search_api_url,
            config.search_api_token.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )?;
        let limiter = RateLimiterService::new(
            config.rate_limit_quota,
            Duration::from_millis(config.min_request_interval_ms),
        );
        let cache = SearchCache::new(Duration::from_secs(config.cache_ttl_secs));
        let query_builder = QueryBuilder::new(config.excluded_users.clone());
        let search = SearchService::new(
            client,
            limiter,
            cache,
            query_builder,
            config.search_page_size,
        );

        Ok(Self {
            config,
            search,
            compatibility: CompatibilityService::new(),
            combinations: CombinationService::new(),
        })
    }
}
