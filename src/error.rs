use crate::artifacts::error::ArtifactError;
use crate::download::error::DownloadError;
use crate::features::error::FeatureError;
use crate::model::error::ModelError;
use crate::model::ModelKind;
use crate::resolver::error::ResolveLocationError;
use crate::training::error::TrainingError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RaincastError {
    #[error(transparent)]
    Training(#[from] TrainingError),

    #[error(transparent)]
    Resolve(#[from] ResolveLocationError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("Loaded artifact is a {found:?} model, expected {expected:?}")]
    WrongModelKind { expected: ModelKind, found: ModelKind },

    #[error("Failed to create artifacts directory '{0}'")]
    ArtifactsDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine artifacts directory")]
    ArtifactsDirResolution(#[source] std::io::Error),
}
