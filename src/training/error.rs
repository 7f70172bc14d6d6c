use crate::artifacts::error::ArtifactError;
use crate::model::error::ModelError;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("dataset not found at '{0}'")]
    DatasetNotFound(PathBuf),

    #[error("no usable rows remained after cleaning '{0}'")]
    EmptyDatasetAfterCleaning(PathBuf),

    #[error("failed to read dataset '{path}'")]
    DatasetRead {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("dataset is missing required column '{column}'")]
    MissingColumn {
        column: String,
        #[source]
        source: PolarsError,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}
