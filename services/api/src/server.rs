use crate::cli::ServeArgs;
use crate::infra::{apply_artifact_overrides, scoring_surface, AppState};
use crate::routes::with_scoring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use credit_ai::config::AppConfig;
use credit_ai::error::AppError;
use credit_ai::scoring::{ModelInformation, ScoringState};
use credit_ai::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    apply_artifact_overrides(&mut config.artifacts, args.artifacts);

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let surface = scoring_surface(&config.artifacts);
    let scoring_ready = surface.is_ready();
    let scoring_state = Arc::new(ScoringState {
        surface,
        information: ModelInformation::load(&config.artifacts.comparison_path),
    });

    let app = with_scoring_routes(scoring_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    if scoring_ready {
        readiness_flag.store(true, Ordering::Release);
        info!(?config.environment, %addr, scaling = %config.artifacts.scaling, "credit analysis service ready");
    } else {
        warn!(%addr, "credit analysis service listening without a scoring model");
    }

    axum::serve(listener, app).await?;
    Ok(())
}
