use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveLocationError {
    #[error("location catalog is empty, nothing to match '{0}' against")]
    EmptyCatalog(String),
}
