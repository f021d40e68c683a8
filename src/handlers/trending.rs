//! Trending handlers
//!
//! HTTP handlers for trending repository discovery.

use actix_web::{web, HttpResponse};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::models::{TrendingQuery, TrendingTimeframe};
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

/// GET /v1/repos/trending
///
/// Get recently created repositories sorted by stars.
///
/// Query Parameters:
/// - timeframe: Lookback window (daily, weekly, monthly). Default: daily
/// - language: Optional language filter
pub async fn get_trending(
    state: web::Data<AppState>,
    query: web::Query<TrendingQuery>,
) -> Result<HttpResponse, AppError> {
    let timeframe = match &query.timeframe {
        Some(t) => t.parse::<TrendingTimeframe>().map_err(AppError::Validation)?,
        None => TrendingTimeframe::default(),
    };

    let cancel = CancellationToken::new();
    let trending = state
        .search
        .get_trending(timeframe, query.language.as_deref(), &cancel);

    match tokio::time::timeout(state.config.request_timeout(), trending).await {
        Err(_) => {
            cancel.cancel();
            Err(AppError::Timeout(
                "trending lookup did not complete in time".to_string(),
            ))
        }
        Ok(result) => {
            let response = result.map_err(AppError::from)?;
            Ok(HttpResponse::Ok().json(ApiResponse::new(response)))
        }
    }
}

/// Configure trending routes
pub fn configure_trending_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/repos/trending").route(web::get().to(get_trending)));
}
