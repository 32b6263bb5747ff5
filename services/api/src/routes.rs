use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;
use std::sync::Arc;
use wander_nest::notifications::Mailer;
use wander_nest::workflows::onboarding::{onboarding_router, OnboardingService};
use wander_nest::workflows::safety::{safety_router, ReportRepository, SafetyService};
use wander_nest::workflows::students::StudentRepository;

/// Workflow routers plus the operational endpoints.
pub(crate) fn app_router<R, S, M>(
    onboarding: Arc<OnboardingService<S>>,
    safety: Arc<SafetyService<R, S, M>>,
) -> Router
where
    R: ReportRepository + 'static,
    S: StudentRepository + 'static,
    M: Mailer + 'static,
{
    onboarding_router(onboarding)
        .merge(safety_router(safety))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(std::sync::atomic::Ordering::Relaxed) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
