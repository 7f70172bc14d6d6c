use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}
