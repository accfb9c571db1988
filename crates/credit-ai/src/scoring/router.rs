use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::batch::{export_file_name, to_csv_string, BatchRunner, BatchSummary, ScoredRow};
use super::catalog::ModelInformation;
use super::domain::ApplicantRecord;
use super::service::{ScoredApplicant, ScoringService};
use crate::error::AppError;

/// Whether the artifacts loaded; an unavailable surface still serves model information.
#[derive(Clone)]
pub enum ScoringSurface {
    Ready(Arc<ScoringService>),
    Unavailable { reason: String },
}

impl ScoringSurface {
    pub fn is_ready(&self) -> bool {
        matches!(self, ScoringSurface::Ready(_))
    }

    fn service(&self) -> Result<&ScoringService, AppError> {
        match self {
            ScoringSurface::Ready(service) => Ok(service.as_ref()),
            ScoringSurface::Unavailable { reason } => Err(AppError::Unavailable(reason.clone())),
        }
    }
}

pub struct ScoringState {
    pub surface: ScoringSurface,
    pub information: ModelInformation,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub csv: String,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub file_name: String,
    pub summary: BatchSummary,
    pub header: Vec<String>,
    pub rows: Vec<ScoredRow>,
    pub csv: String,
}

/// Router builder exposing single-applicant, batch, and model information endpoints.
pub fn scoring_router(state: Arc<ScoringState>) -> Router {
    Router::new()
        .route("/api/v1/credit/analyze", post(analyze_handler))
        .route("/api/v1/credit/batch", post(batch_handler))
        .route("/api/v1/credit/model", get(model_handler))
        .with_state(state)
}

pub(crate) async fn analyze_handler(
    State(state): State<Arc<ScoringState>>,
    Json(applicant): Json<ApplicantRecord>,
) -> Result<Json<ScoredApplicant>, AppError> {
    let scored = state.surface.service()?.analyze(&applicant)?;
    Ok(Json(scored))
}

pub(crate) async fn batch_handler(
    State(state): State<Arc<ScoringState>>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, AppError> {
    let service = state.surface.service()?;
    let result = BatchRunner::new(service).run_reader(request.csv.as_bytes())?;
    let csv = to_csv_string(&result)?;

    Ok(Json(BatchResponse {
        file_name: export_file_name(chrono::Local::now().naive_local()),
        summary: result.summary,
        header: result.header,
        rows: result.rows,
        csv,
    }))
}

pub(crate) async fn model_handler(State(state): State<Arc<ScoringState>>) -> Json<ModelInformation> {
    Json(state.information.clone())
}
