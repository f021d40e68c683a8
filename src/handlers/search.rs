//! Search handlers
//!
//! HTTP handlers for repository search.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::models::{ActivityBucket, SearchFilters, SizeBucket, SortKey, SortOrder};
use crate::AppState;

/// Standard API response wrapper
#[derive(Serialize)]
struct ApiResponse<T: Serialize> {
    data: T,
    meta: ResponseMeta,
}

#[derive(Serialize)]
struct ResponseMeta {
    request_id: String,
}

impl<T: Serialize> ApiResponse<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta {
                request_id: uuid::Uuid::new_v4().to_string(),
            },
        }
    }
}

/// Query parameters for repository search
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Free-text query
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub min_stars: Option<u32>,
    #[serde(default)]
    pub max_stars: Option<u32>,
    /// Comma-separated topic list
    #[serde(default)]
    pub topics: Option<String>,
    #[serde(default)]
    pub has_issues: Option<bool>,
    #[serde(default)]
    pub has_wiki: Option<bool>,
    #[serde(default)]
    pub has_pages: Option<bool>,
    #[serde(default)]
    pub archived: Option<bool>,
    #[serde(default)]
    pub fork: Option<bool>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default)]
    pub min_quality: Option<u8>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
    /// 1-based page number (default: 1)
    #[serde(default)]
    pub page: Option<u32>,
}

impl SearchParams {
    fn into_filters(self) -> Result<(String, SearchFilters, u32), AppError> {
        let query = self.q.unwrap_or_default();
        let page = self.page.unwrap_or(1).max(1);

        let size = self
            .size
            .as_deref()
            .map(|s| s.parse::<SizeBucket>())
            .transpose()
            .map_err(AppError::Validation)?;
        let activity = self
            .activity
            .as_deref()
            .map(|s| s.parse::<ActivityBucket>())
            .transpose()
            .map_err(AppError::Validation)?;
        let sort = self
            .sort
            .as_deref()
            .map(|s| s.parse::<SortKey>())
            .transpose()
            .map_err(AppError::Validation)?;
        let order = self
            .order
            .as_deref()
            .map(|s| s.parse::<SortOrder>())
            .transpose()
            .map_err(AppError::Validation)?;

        let topics = self
            .topics
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();

        Ok((
            query,
            SearchFilters {
                language: self.language,
                min_stars: self.min_stars,
                max_stars: self.max_stars,
                topics,
                has_issues: self.has_issues,
                has_wiki: self.has_wiki,
                has_pages: self.has_pages,
                archived: self.archived,
                fork: self.fork,
                size,
                activity,
                min_quality: self.min_quality,
                sort,
                order,
            },
            page,
        ))
    }
}

/// GET /v1/repos/search
///
/// Search repositories against the external API, returning one scored page.
/// The whole pipeline runs under the configured request deadline; a deadline
/// hit aborts any pending rate-limit wait without consuming quota.
pub async fn search_repos(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse, AppError> {
    let (query, filters, page) = params.into_inner().into_filters()?;

    let cancel = CancellationToken::new();
    let search = state.search.search(&query, &filters, page, &cancel);

    match tokio::time::timeout(state.config.request_timeout(), search).await {
        Err(_) => {
            cancel.cancel();
            Err(AppError::Timeout("search did not complete in time".to_string()))
        }
        Ok(result) => {
            let response = result.map_err(AppError::from)?;
            Ok(HttpResponse::Ok().json(ApiResponse::new(response)))
        }
    }
}

/// Configure search routes
pub fn configure_search_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/repos/search").route(web::get().to(search_repos)));
}
