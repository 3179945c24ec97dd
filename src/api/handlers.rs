use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use super::AppState;
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::{
        ApiResponse, FeedbackRequest, FeedbackResponse, HistoryEntry, HistoryQuery,
        OnboardingRequest, RecommendationRequest, RecommendationResponse, UserProfileResponse,
        UserStats,
    },
    services::{onboarding, DecisionEngine},
};

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Completes (or skips) onboarding for the caller
pub async fn complete_onboarding(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<ApiResponse<UserProfileResponse>>> {
    let Json(body) = payload?;
    let request = OnboardingRequest::from_json(body)?;

    let user = onboarding::complete_onboarding(state.store.as_ref(), user_id, request).await?;
    Ok(Json(ApiResponse::ok(UserProfileResponse::from(&user))))
}

/// Caller's public profile
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<ApiResponse<UserProfileResponse>>> {
    let user = state
        .store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::ok(UserProfileResponse::from(&user))))
}

/// Creates a recommendation
pub async fn create_decision(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<RecommendationResponse>>> {
    let Json(request) = payload?;
    let recommendation = state.engine.get_recommendation(user_id, request).await?;

    invalidate_stats(&state, user_id).await;
    Ok(Json(ApiResponse::ok(recommendation)))
}

/// Records feedback on a recommendation
pub async fn submit_feedback(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<FeedbackResponse>>> {
    let Json(request) = payload?;
    let response = state.engine.record_feedback(user_id, request).await?;

    invalidate_stats(&state, user_id).await;
    Ok(Json(ApiResponse::ok(response)))
}

/// Recent decisions with outcomes
pub async fn get_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<Vec<HistoryEntry>>>> {
    let Query(query) = query?;
    let history = state.engine.get_user_history(user_id, query.limit).await?;
    Ok(Json(ApiResponse::ok(history)))
}

/// Aggregate stats, served from Redis when available
pub async fn get_stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<ApiResponse<UserStats>>> {
    let stats = match &state.cache {
        Some(cache) => cached_stats(cache, &state.engine, user_id, state.stats_ttl).await?,
        None => state.engine.get_user_stats(user_id).await?,
    };
    Ok(Json(ApiResponse::ok(stats)))
}

/// Stats entries are keyed on the user's generation, sampled before computing
async fn cached_stats(
    cache: &Cache,
    engine: &DecisionEngine,
    user_id: Uuid,
    ttl: u64,
) -> AppResult<UserStats> {
    let generation = cache.generation(&CacheKey::StatsGeneration(user_id)).await?;
    let key = CacheKey::UserStats {
        user_id,
        generation,
    };
    cached!(cache, key, ttl, engine.get_user_stats(user_id))
}

async fn invalidate_stats(state: &AppState, user_id: Uuid) {
    if let Some(cache) = &state.cache {
        if let Err(e) = cache
            .bump_generation(&CacheKey::StatsGeneration(user_id))
            .await
        {
            tracing::error!(error = %e, %user_id, "Failed to invalidate cached stats");
        }
    }
}
