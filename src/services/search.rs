//! Search Orchestrator
//!
//! Composes the query builder, rate limiter, result cache, external client,
//! and quality scorer into one paginated search pipeline. A cache hit
//! short-circuits the pipeline entirely: no rate-limit wait, no external
//! call. Post-filters are applied only for constraints the query-string
//! dialect cannot express.

use chrono::{Duration as ChronoDuration, Utc};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::models::{
    Repository, SearchFilters, SearchResponse, SortKey, SortOrder, TrendingTimeframe,
};
use crate::services::cache::SearchCache;
use crate::services::github::{SearchApiClient, SearchApiError};
use crate::services::query::QueryBuilder;
use crate::services::rate_limiter::{RateLimitError, RateLimiterService};
use crate::services::scoring::{enhanced_quality_score, quality_score};

/// Errors surfaced by the search pipeline
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search cancelled before completion")]
    Cancelled,
    #[error("external search call failed: {0}")]
    SearchFailed(String),
}

impl From<RateLimitError> for SearchError {
    fn from(err: RateLimitError) -> Self {
        match err {
            RateLimitError::Cancelled => Self::Cancelled,
        }
    }
}

impl From<SearchApiError> for SearchError {
    fn from(err: SearchApiError) -> Self {
        Self::SearchFailed(err.to_string())
    }
}

/// Service for repository search and trending discovery
#[derive(Debug, Clone)]
pub struct SearchService {
    client: SearchApiClient,
    limiter: RateLimiterService,
    cache: SearchCache<SearchResponse>,
    query_builder: QueryBuilder,
    page_size: u32,
}

impl SearchService {
    pub fn new(
        client: SearchApiClient,
        limiter: RateLimiterService,
        cache: SearchCache<SearchResponse>,
        query_builder: QueryBuilder,
        page_size: u32,
    ) -> Self {
        Self {
            client,
            limiter,
            cache,
            query_builder,
            page_size,
        }
    }

    /// Search repositories, returning one scored page
    pub async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse, SearchError> {
        let key = cache_key(query, filters, page);
        if let Some(hit) = self.cache.get(&key).await {
            return Ok(hit);
        }

        self.limiter.wait_if_needed(cancel).await?;

        let query_string = self.query_builder.build(query, filters);
        debug!(query = %query_string, page, "issuing external search");

        let (raw_page, quota) = self
            .client
            .search(
                &query_string,
                filters.sort,
                filters.order,
                self.page_size,
                page,
            )
            .await?;

        if let Some(quota) = quota {
            self.limiter
                .update_limits(quota.remaining, quota.reset_time)
                .await;
        }

        let mut repositories = raw_page.repositories;
        for repo in &mut repositories {
            repo.quality_score = Some(quality_score(repo));
        }

        // Page fullness is measured before post-filtering: it reflects
        // whether the external page came back full
        let fetched = repositories.len() as u32;

        if let Some(min_quality) = filters.min_quality {
            repositories.retain(|r| r.quality_score.unwrap_or(0) >= min_quality);
        }

        let has_more = fetched == self.page_size;
        let response = SearchResponse {
            repositories,
            total_count: raw_page.total_count,
            has_more,
            next_page: has_more.then(|| page + 1),
        };

        self.cache.set(key, response.clone()).await;
        Ok(response)
    }

    /// Recently created repositories sorted by stars
    pub async fn get_trending(
        &self,
        timeframe: TrendingTimeframe,
        language: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse, SearchError> {
        let cutoff = (Utc::now() - ChronoDuration::days(timeframe.days())).format("%Y-%m-%d");
        let query = format!("created:>{cutoff}");
        let filters = SearchFilters {
            language: language.map(String::from),
            sort: Some(SortKey::Stars),
            order: Some(SortOrder::Desc),
            ..Default::default()
        };
        self.search(&query, &filters, 1, cancel).await
    }

    /// Optional per-repository enrichment: language breakdown and
    /// contributor count, then the enhanced score
    ///
    /// Each lookup degrades independently to an empty result; enrichment
    /// never fails the caller.
    pub async fn enrich_repository(
        &self,
        repo: &mut Repository,
        cancel: &CancellationToken,
    ) -> Result<(), SearchError> {
        self.limiter.wait_if_needed(cancel).await?;
        let languages = match self.client.get_languages(&repo.full_name).await {
            Ok(languages) => languages,
            Err(e) => {
                warn!(repo = %repo.full_name, error = %e, "language lookup failed, degrading");
                Default::default()
            }
        };

        self.limiter.wait_if_needed(cancel).await?;
        let contributor_count = match self.client.get_contributor_count(&repo.full_name).await {
            Ok(count) => Some(count),
            Err(e) => {
                warn!(repo = %repo.full_name, error = %e, "contributor lookup failed, degrading");
                None
            }
        };

        let mut enrichment = repo.enrichment.clone().unwrap_or_default();
        enrichment.languages = languages;
        enrichment.contributor_count = contributor_count;

        repo.quality_score = Some(enhanced_quality_score(repo, &enrichment));
        repo.enrichment = Some(enrichment);
        Ok(())
    }
}

/// Canonical cache key: free text, serialized filters, page number
///
/// Filter serialization follows struct declaration order, so the key is a
/// pure function of the logical filter values.
pub(crate) fn cache_key(query: &str, filters: &SearchFilters, page: u32) -> String {
    let filters_json = serde_json::to_string(filters).unwrap_or_default();
    format!("{query}|{filters_json}|{page}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_deterministic() {
        let filters = SearchFilters {
            language: Some("rust".to_string()),
            min_stars: Some(10),
            ..Default::default()
        };
        assert_eq!(
            cache_key("web server", &filters, 2),
            cache_key("web server", &filters, 2)
        );
    }

    #[test]
    fn test_cache_key_distinguishes_pages_and_filters() {
        let filters = SearchFilters::default();
        let other = SearchFilters {
            min_stars: Some(1),
            ..Default::default()
        };
        assert_ne!(cache_key("q", &filters, 1), cache_key("q", &filters, 2));
        assert_ne!(cache_key("q", &filters, 1), cache_key("q", &other, 1));
        assert_ne!(cache_key("q", &filters, 1), cache_key("r", &filters, 1));
    }
}
