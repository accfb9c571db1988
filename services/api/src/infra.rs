use crate::cli::ArtifactArgs;
use credit_ai::config::{AppConfig, ArtifactConfig};
use credit_ai::error::AppError;
use credit_ai::scoring::{ScoringService, ScoringSurface};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::error;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn apply_artifact_overrides(config: &mut ArtifactConfig, args: ArtifactArgs) {
    let ArtifactArgs {
        model,
        scaler,
        comparison,
        scaling,
    } = args;

    if let Some(model) = model {
        config.model_path = model;
    }
    if let Some(scaler) = scaler {
        config.scaler_path = scaler;
    }
    if let Some(comparison) = comparison {
        config.comparison_path = comparison;
    }
    if let Some(scaling) = scaling {
        config.scaling = scaling;
    }
}

/// Configuration for one-shot CLI commands, with artifact flags applied.
pub(crate) fn load_config(args: ArtifactArgs) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    apply_artifact_overrides(&mut config.artifacts, args);
    Ok(config)
}

/// Loads the artifacts for the HTTP surface; failures leave the surface disabled.
pub(crate) fn scoring_surface(config: &ArtifactConfig) -> ScoringSurface {
    match ScoringService::from_config(config) {
        Ok(service) => ScoringSurface::Ready(Arc::new(service)),
        Err(err) => {
            error!(error = %err, "scoring disabled: model artifacts unavailable");
            ScoringSurface::Unavailable {
                reason: err.to_string(),
            }
        }
    }
}
