use crate::cli::ServeArgs;
use crate::infra::{parse_scheme, AppState, InMemoryAnalysisStore};
use crate::routes::with_peer_review_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use peer_review::config::AppConfig;
use peer_review::error::AppError;
use peer_review::telemetry;
use peer_review::workflows::peer_review::PeerReviewService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(scheme) = args.scheme.take() {
        config.scoring.scheme = parse_scheme(&scheme)?;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryAnalysisStore::default());
    let service = Arc::new(PeerReviewService::new(
        store,
        config.scoring.analysis_config(),
        config.scoring.column_detection,
    ));

    let app = with_peer_review_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        scheme = config.scoring.scheme.label(),
        "peer review analyzer ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
