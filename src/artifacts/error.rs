use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("no trained model found under '{0}', run the train command first")]
    ModelUnavailable(PathBuf),

    #[error("failed to create artifacts directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("failed to read artifact file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("failed to write artifact file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("failed to decode artifact file '{0}'")]
    Decode(PathBuf, #[source] Box<bincode::error::DecodeError>),

    #[error("failed to encode artifact data")]
    Encode(#[source] Box<bincode::error::EncodeError>),

    #[error("artifact set is inconsistent: model expects {model} feature columns, column list has {columns}")]
    ColumnMismatch { model: usize, columns: usize },
}
