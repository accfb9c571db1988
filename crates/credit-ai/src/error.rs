use crate::config::ConfigError;
use crate::scoring::{BatchError, EvaluationError, ScoringError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Scoring(ScoringError),
    Batch(BatchError),
    Evaluation(EvaluationError),
    Unavailable(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Scoring(err) => scoring_status(err),
            AppError::Batch(BatchError::Scoring(err)) => scoring_status(err),
            AppError::Batch(BatchError::MalformedInput { .. }) => StatusCode::BAD_REQUEST,
            AppError::Evaluation(EvaluationError::Scoring(err)) => scoring_status(err),
            AppError::Evaluation(EvaluationError::Features(BatchError::Scoring(err))) => {
                scoring_status(err)
            }
            AppError::Evaluation(EvaluationError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Evaluation(_) => StatusCode::BAD_REQUEST,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Batch(_)
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn scoring_status(err: &ScoringError) -> StatusCode {
    match err {
        ScoringError::MalformedInput { .. } => StatusCode::BAD_REQUEST,
        ScoringError::InvalidApplicant(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ScoringError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ScoringError::Computation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Scoring(err) => write!(f, "scoring error: {}", err),
            AppError::Batch(err) => write!(f, "batch error: {}", err),
            AppError::Evaluation(err) => write!(f, "validation error: {}", err),
            AppError::Unavailable(reason) => write!(f, "scoring unavailable: {}", reason),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Scoring(err) => Some(err),
            AppError::Batch(err) => Some(err),
            AppError::Evaluation(err) => Some(err),
            AppError::Unavailable(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::Scoring(ScoringError::InvalidApplicant(err)) => Json(json!({
                "error": self.to_string(),
                "violations": err.violations,
            })),
            _ => Json(json!({ "error": self.to_string() })),
        };
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ScoringError> for AppError {
    fn from(value: ScoringError) -> Self {
        Self::Scoring(value)
    }
}

impl From<BatchError> for AppError {
    fn from(value: BatchError) -> Self {
        Self::Batch(value)
    }
}

impl From<EvaluationError> for AppError {
    fn from(value: EvaluationError) -> Self {
        Self::Evaluation(value)
    }
}
