use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP error status {status} for URL {url}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode API response from {0}")]
    ResponseDecode(String, #[source] reqwest::Error),

    #[error("Request for {url} still failing after {attempts} attempts")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: Box<DownloadError>,
    },

    #[error("No usable observations were downloaded")]
    NoData,

    #[error("Failed to create output directory {0}")]
    OutputDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to write dataset {0}")]
    DatasetWrite(PathBuf, #[source] polars::error::PolarsError),
}
