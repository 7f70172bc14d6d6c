use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("feature vector has {found} columns, model expects {expected}")]
    FeatureShapeMismatch { expected: usize, found: usize },

    #[error("cannot fit a model on an empty training set")]
    EmptyTrainingSet,
}
