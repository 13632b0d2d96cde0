use std::io::Cursor;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::quality::KeywordVerdicts;
use super::repository::AnalysisStore;
use super::scoring::SchemeKind;
use super::service::{PeerReviewService, PeerReviewServiceError};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UploadParams {
    #[serde(default)]
    pub(crate) scheme: Option<String>,
    #[serde(default)]
    pub(crate) source: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RecalculateRequest {
    #[serde(default)]
    pub(crate) approved: Vec<String>,
    #[serde(default)]
    pub(crate) rejected: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GroupParams {
    #[serde(default)]
    pub(crate) group_set: Option<String>,
}

/// Router builder exposing the peer review analysis endpoints.
pub fn peer_review_router<S>(service: Arc<PeerReviewService<S>>) -> Router
where
    S: AnalysisStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/peer-review/analysis",
            post(upload_handler::<S>).get(analysis_handler::<S>),
        )
        .route(
            "/api/v1/peer-review/recalculate",
            post(recalculate_handler::<S>),
        )
        .route("/api/v1/peer-review/flags", get(flags_handler::<S>))
        .route(
            "/api/v1/peer-review/inconsistencies",
            get(inconsistencies_handler::<S>),
        )
        .route("/api/v1/peer-review/keywords", get(keywords_handler::<S>))
        .route(
            "/api/v1/peer-review/statistics",
            get(statistics_handler::<S>),
        )
        .route("/api/v1/peer-review/groups", post(groups_handler::<S>))
        .with_state(service)
}

fn error_response(error: PeerReviewServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (error.status(), axum::Json(payload)).into_response()
}

pub(crate) async fn upload_handler<S>(
    State(service): State<Arc<PeerReviewService<S>>>,
    Query(params): Query<UploadParams>,
    body: String,
) -> Response
where
    S: AnalysisStore + 'static,
{
    let scheme = match params.scheme.as_deref() {
        Some(label) => match SchemeKind::from_label(label) {
            Some(scheme) => Some(scheme),
            None => {
                let payload = json!({
                    "error": format!("unknown scoring scheme '{label}'"),
                });
                return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
            }
        },
        None => None,
    };
    let source = params.source.unwrap_or_else(|| "upload.csv".to_string());

    match service.ingest(&source, Cursor::new(body.into_bytes()), scheme) {
        Ok(record) => {
            let payload = json!({
                "source": record.source,
                "scheme": record.analysis.scheme,
                "column_strategy": record.column_strategy,
                "stats": record.analysis.stats,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn analysis_handler<S>(
    State(service): State<Arc<PeerReviewService<S>>>,
) -> Response
where
    S: AnalysisStore + 'static,
{
    match service.current() {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn recalculate_handler<S>(
    State(service): State<Arc<PeerReviewService<S>>>,
    axum::Json(request): axum::Json<RecalculateRequest>,
) -> Response
where
    S: AnalysisStore + 'static,
{
    let verdicts = KeywordVerdicts::new(request.approved, request.rejected);
    match service.recalculate(verdicts) {
        Ok(changes) => {
            let payload = json!({
                "changed": changes.len(),
                "changes": changes,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn flags_handler<S>(State(service): State<Arc<PeerReviewService<S>>>) -> Response
where
    S: AnalysisStore + 'static,
{
    match service.flags() {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn inconsistencies_handler<S>(
    State(service): State<Arc<PeerReviewService<S>>>,
) -> Response
where
    S: AnalysisStore + 'static,
{
    match service.inconsistencies() {
        Ok(findings) => (StatusCode::OK, axum::Json(findings)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn keywords_handler<S>(
    State(service): State<Arc<PeerReviewService<S>>>,
) -> Response
where
    S: AnalysisStore + 'static,
{
    match service.keywords() {
        Ok(index) => (StatusCode::OK, axum::Json(index)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn statistics_handler<S>(
    State(service): State<Arc<PeerReviewService<S>>>,
) -> Response
where
    S: AnalysisStore + 'static,
{
    match service.statistics() {
        Ok(statistics) => (StatusCode::OK, axum::Json(statistics)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn groups_handler<S>(
    State(service): State<Arc<PeerReviewService<S>>>,
    Query(params): Query<GroupParams>,
    body: String,
) -> Response
where
    S: AnalysisStore + 'static,
{
    match service.groups(Cursor::new(body.into_bytes()), params.group_set.as_deref()) {
        Ok(groups) => (StatusCode::OK, axum::Json(groups)).into_response(),
        Err(error) => error_response(error),
    }
}
