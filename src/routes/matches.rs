use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::Matcher;
use crate::models::{
    BatchMatchResponse, ErrorResponse, FindNeedsRequest, FindProvidersRequest, HealthResponse, MatchResponse,
};
use crate::services::Catalogue;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalogue: Arc<Catalogue>,
    pub matcher: Matcher,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/need", web::post().to(find_providers))
        .route("/matches/provider", web::post().to(find_needs))
        .route("/matches/batch", web::get().to(batch_match));
}

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message,
        status_code: 400,
    })
}

fn not_found(error: &str, message: String) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 404,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        needs: state.catalogue.needs.len(),
        providers: state.catalogue.providers.len(),
        impact_entries: state.matcher.classifier().len(),
    })
}

/// Shortlist providers for a need
///
/// POST /api/v1/matches/need
///
/// Request body:
/// ```json
/// {
///   "needId": "string",
///   "limit": 5
/// }
/// ```
async fn find_providers(
    state: web::Data<AppState>,
    req: web::Json<FindProvidersRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_providers request: field_errors={:?}", errors);
        return bad_request(errors.to_string());
    }

    let request_id = uuid::Uuid::new_v4().to_string();
    let Some(need) = state.catalogue.need(&req.need_id) else {
        tracing::info!("[{}] Unknown need {}", request_id, req.need_id);
        return not_found("Need not found", format!("No need with id {}", req.need_id));
    };

    let mut ranking = state.matcher.config().ranking;
    if let Some(limit) = req.limit {
        ranking = ranking.with_limit(usize::from(limit));
    }

    tracing::info!("[{}] Matching need {} against {} providers", request_id, need.id, state.catalogue.providers.len());

    let result = state
        .matcher
        .find_providers_with(need, &state.catalogue.providers, &ranking);

    tracing::info!(
        "[{}] Returning {} providers for need {} (from {} candidates, {} rejected)",
        request_id,
        result.matches.len(),
        need.id,
        result.total_candidates,
        result.rejected.len()
    );

    HttpResponse::Ok().json(MatchResponse::from_result(request_id, result))
}

/// Shortlist needs for a provider
///
/// POST /api/v1/matches/provider
///
/// Request body:
/// ```json
/// {
///   "providerId": "string",
///   "limit": 5
/// }
/// ```
async fn find_needs(
    state: web::Data<AppState>,
    req: web::Json<FindNeedsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_needs request: field_errors={:?}", errors);
        return bad_request(errors.to_string());
    }

    let request_id = uuid::Uuid::new_v4().to_string();
    let Some(provider) = state.catalogue.provider(&req.provider_id) else {
        tracing::info!("[{}] Unknown provider {}", request_id, req.provider_id);
        return not_found("Provider not found", format!("No provider with id {}", req.provider_id));
    };

    let mut ranking = state.matcher.config().ranking;
    if let Some(limit) = req.limit {
        ranking = ranking.with_limit(usize::from(limit));
    }

    let result = state
        .matcher
        .find_needs_with(provider, &state.catalogue.needs, &ranking);

    tracing::info!(
        "[{}] Returning {} needs for provider {} (from {} candidates)",
        request_id,
        result.matches.len(),
        provider.id,
        result.total_candidates
    );

    HttpResponse::Ok().json(MatchResponse::from_result(request_id, result))
}

/// Match every need in the catalogue
///
/// GET /api/v1/matches/batch
async fn batch_match(state: web::Data<AppState>) -> impl Responder {
    let request_id = uuid::Uuid::new_v4().to_string();
    let matcher = state.matcher.clone();
    let catalogue = Arc::clone(&state.catalogue);

    // CPU-bound sweep, keep it off the async workers
    let results = match web::block(move || matcher.batch_match(&catalogue.needs, &catalogue.providers)).await {
        Ok(results) => results,
        Err(e) => {
            tracing::error!("[{}] Batch matching failed: {}", request_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Batch matching failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let total_needs = results.len();
    let matched_needs = results.iter().filter(|r| !r.is_empty()).count();

    tracing::info!("[{}] Batch matched {} of {} needs", request_id, matched_needs, total_needs);

    HttpResponse::Ok().json(BatchMatchResponse {
        results: results
            .into_iter()
            .map(|result| MatchResponse::from_result(request_id.clone(), result))
            .collect(),
        request_id,
        matched_needs,
        total_needs,
    })
}
