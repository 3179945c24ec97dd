use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes())
        .layer(
            // Outermost first: the request ID must exist before the trace span
            ServiceBuilder::new()
                .layer(cors)
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}

/// Authenticated routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        // Onboarding & profile
        .route("/auth/onboarding/complete", post(handlers::complete_onboarding))
        .route("/user/me", get(handlers::get_me))
        // Decisions
        .route("/decisions", post(handlers::create_decision))
        .route("/decisions/feedback", post(handlers::submit_feedback))
        .route("/decisions/history", get(handlers::get_history))
        .route("/decisions/stats", get(handlers::get_stats))
}
