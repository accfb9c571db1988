//! Read-only model artifacts exported from the training pipeline.
//!
//! Both artifacts are JSON documents loaded once at startup and shared behind `Arc`.

mod classifier;
mod scaler;

pub use classifier::{
    Classifier, ClassifierArtifact, ClassifierError, LogisticModel, ProbabilityRow, Tree,
    TreeEnsemble, TreeNode,
};
pub use scaler::{ScalingMode, StandardScaler};

use serde::de::DeserializeOwned;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Classifier,
    Scaler,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Classifier => f.write_str("classifier"),
            ArtifactKind::Scaler => f.write_str("scaler"),
        }
    }
}

/// Failure to obtain a usable artifact; any of these disables the scoring surface.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("{kind} artifact not found at {}", .path.display())]
    Missing { kind: ArtifactKind, path: PathBuf },
    #[error("failed to read {kind} artifact {}: {source}", .path.display())]
    Io {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{kind} artifact {} is not valid JSON: {source}", .path.display())]
    Parse {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{kind} artifact {} is inconsistent: {detail}", .path.display())]
    Invalid {
        kind: ArtifactKind,
        path: PathBuf,
        detail: String,
    },
}

/// The classifier and scaler pair, loaded once per process.
#[derive(Clone)]
pub struct ModelArtifacts {
    pub classifier: Arc<dyn Classifier>,
    pub scaler: Arc<StandardScaler>,
}

impl fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("classifier", &self.classifier.name())
            .field("scaler_columns", &self.scaler.feature_names.len())
            .finish()
    }
}

impl ModelArtifacts {
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        classifier_path: P,
        scaler_path: Q,
    ) -> Result<Self, ArtifactError> {
        let classifier = load_classifier(classifier_path)?;
        let scaler = load_scaler(scaler_path)?;
        Ok(Self {
            classifier: Arc::new(classifier),
            scaler: Arc::new(scaler),
        })
    }
}

pub fn load_classifier<P: AsRef<Path>>(path: P) -> Result<ClassifierArtifact, ArtifactError> {
    let path = path.as_ref();
    let artifact: ClassifierArtifact = read_json(ArtifactKind::Classifier, path)?;
    artifact
        .validate()
        .map_err(|detail| ArtifactError::Invalid {
            kind: ArtifactKind::Classifier,
            path: path.to_path_buf(),
            detail,
        })?;
    info!(path = %path.display(), model = artifact.name(), "classifier artifact loaded");
    Ok(artifact)
}

pub fn load_scaler<P: AsRef<Path>>(path: P) -> Result<StandardScaler, ArtifactError> {
    let path = path.as_ref();
    let scaler: StandardScaler = read_json(ArtifactKind::Scaler, path)?;
    scaler.validate().map_err(|detail| ArtifactError::Invalid {
        kind: ArtifactKind::Scaler,
        path: path.to_path_buf(),
        detail,
    })?;
    info!(path = %path.display(), "scaler artifact loaded");
    Ok(scaler)
}

fn read_json<T: DeserializeOwned>(kind: ArtifactKind, path: &Path) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::Missing {
                kind,
                path: path.to_path_buf(),
            }
        } else {
            ArtifactError::Io {
                kind,
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        kind,
        path: path.to_path_buf(),
        source,
    })
}
