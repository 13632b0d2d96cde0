use crate::export::{export_file_name, render_csv, ExportKind};
use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::Local;
use peer_review::error::AppError;
use peer_review::workflows::peer_review::{peer_review_router, AnalysisStore, PeerReviewService};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_peer_review_routes<S>(service: Arc<PeerReviewService<S>>) -> Router
where
    S: AnalysisStore + 'static,
{
    let exports = Router::new()
        .route(
            "/api/v1/peer-review/export/students",
            get(export_students_endpoint::<S>),
        )
        .route(
            "/api/v1/peer-review/export/graders",
            get(export_graders_endpoint::<S>),
        )
        .with_state(service.clone());

    peer_review_router(service)
        .merge(exports)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn export_students_endpoint<S>(
    State(service): State<Arc<PeerReviewService<S>>>,
) -> Result<Response, AppError>
where
    S: AnalysisStore + 'static,
{
    export_response(&service, ExportKind::Students)
}

pub(crate) async fn export_graders_endpoint<S>(
    State(service): State<Arc<PeerReviewService<S>>>,
) -> Result<Response, AppError>
where
    S: AnalysisStore + 'static,
{
    export_response(&service, ExportKind::Graders)
}

fn export_response<S>(
    service: &PeerReviewService<S>,
    kind: ExportKind,
) -> Result<Response, AppError>
where
    S: AnalysisStore + 'static,
{
    let record = service.current()?;
    let body = render_csv(kind, &record.analysis, None)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(kind, Local::now().date_naive())
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
