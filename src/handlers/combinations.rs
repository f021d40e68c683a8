//! Combination handlers
//!
//! HTTP handlers for compatibility analysis and repository combination.

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::error::AppError;
use crate::models::{AnalyzeRequest, CombineRequest};
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

/// POST /v1/combinations/analyze
///
/// Analyze how well a set of repositories can be combined. Fewer than two
/// repositories returns the neutral high-compatibility report.
pub async fn analyze_compatibility(
    state: web::Data<AppState>,
    body: web::Json<AnalyzeRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let report = state
        .compatibility
        .analyze_compatibility(&request.repositories)
        .await;
    Ok(HttpResponse::Ok().json(ApiResponse::new(report)))
}

/// POST /v1/combinations
///
/// Combine repositories into one project skeleton and store the result.
pub async fn create_combination(
    state: web::Data<AppState>,
    body: web::Json<CombineRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let result = state.combinations.combine(request).await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(result)))
}

/// GET /v1/combinations/{id}
pub async fn get_combination(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    match state.combinations.get(&id).await {
        Some(result) => Ok(HttpResponse::Ok().json(ApiResponse::new(result))),
        None => Err(AppError::NotFound(format!("combination {id}"))),
    }
}

/// GET /v1/combinations
pub async fn list_combinations(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let all = state.combinations.list().await;
    Ok(HttpResponse::Ok().json(ApiResponse::new(all)))
}

/// Configure combination routes
///
/// The static /combinations/analyze path is registered before the
/// parameterized /combinations/{id} path so matching stays unambiguous.
pub fn configure_combination_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/combinations/analyze").route(web::post().to(analyze_compatibility)),
    )
    .service(
        web::resource("/combinations")
            .route(web::post().to(create_combination))
            .route(web::get().to(list_combinations)),
    )
    .service(web::resource("/combinations/{id}").route(web::get().to(get_combination)));
}
