mod artifacts;
mod download;
mod error;
mod features;
mod inference;
mod model;
mod raincast;
mod resolver;
mod training;
mod types;
mod utils;

pub use error::RaincastError;
pub use raincast::*;

pub use artifacts::error::ArtifactError;
pub use artifacts::store::{ArtifactSet, ArtifactStore};
pub use download::error::DownloadError;
pub use download::nasa_power::{PowerClient, SEED_LOCATIONS};
pub use features::builder::{parse_date, FeatureVector, REGRESSION_COLUMNS};
pub use features::error::FeatureError;
pub use inference::fallback;
pub use inference::postprocess::{process_regression, seasonal_offset, ProcessedEstimate};
pub use model::error::ModelError;
pub use model::{LinearModel, ModelKind, RawOutput, WeatherModel};
pub use resolver::error::ResolveLocationError;
pub use resolver::resolve_location::{
    similarity_ratio, LocationResolver, DEFAULT_SIMILARITY_CUTOFF,
};
pub use training::error::TrainingError;
pub use training::trainer::TrainingSummary;
pub use types::catalog::{CatalogEntry, LocationCatalog};
pub use types::climate::{ClimateZone, CLIMATE_ZONES};
pub use types::observation::{DailyRecord, Observation};
pub use types::prediction::{
    ConditionsRequest, Confidence, Coordinates, Prediction, PredictionSource, Verdict,
};
