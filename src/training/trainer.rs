//! Training entry points for both pipelines: the regression estimator over
//! the region-indexed dataset and the rain classifier over the downloader's
//! master table.

use crate::artifacts::store::{ArtifactSet, ArtifactStore};
use crate::features::builder::{build, classification_columns, REGRESSION_COLUMNS};
use crate::model::LinearModel;
use crate::training::dataset::{load_daily_records, load_observations};
use crate::training::derive::derive;
use crate::training::error::TrainingError;
use crate::types::catalog::LocationCatalog;
use crate::types::climate::CLIMATE_ZONES;
use log::info;
use std::path::Path;

/// What a training run produced, for logging and CLI output.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub rows: usize,
    pub locations: usize,
    pub feature_columns: usize,
}

/// Trains the multi-target regression estimator and persists its artifacts.
pub fn train(dataset: &Path, store: &ArtifactStore) -> Result<TrainingSummary, TrainingError> {
    let observations = load_observations(dataset)?;
    let catalog = LocationCatalog::from_observations(&observations);

    let mut rows = Vec::with_capacity(observations.len());
    let mut targets = Vec::with_capacity(observations.len());
    for observation in &observations {
        let Some(entry) = catalog.get(&observation.region) else {
            continue;
        };
        let mut features = build(entry, observation.date);
        // Each row keeps its own coordinates; the catalog entry holds the
        // per-location mean used at inference time.
        features.lat = observation.latitude;
        features.lon = observation.longitude;
        rows.push(features.as_row());
        targets.push([
            observation.temperature,
            observation.rainfall,
            observation.wind_speed,
            observation.humidity,
        ]);
    }

    let model = LinearModel::fit_regression(&rows, &targets)?;
    let feature_columns: Vec<String> = REGRESSION_COLUMNS.iter().map(|s| s.to_string()).collect();
    let summary = TrainingSummary {
        rows: rows.len(),
        locations: catalog.len(),
        feature_columns: feature_columns.len(),
    };
    store.save(&ArtifactSet {
        model,
        catalog,
        climate_zones: None,
        feature_columns,
    })?;
    info!(
        "trained regression model on {} rows across {} locations",
        summary.rows, summary.locations
    );
    Ok(summary)
}

/// Trains the rain-tomorrow classifier from the master daily table and
/// persists its artifacts.
pub fn train_classifier(
    dataset: &Path,
    store: &ArtifactStore,
) -> Result<TrainingSummary, TrainingError> {
    let records = load_daily_records(dataset)?;
    let catalog = LocationCatalog::from_points(
        records
            .iter()
            .map(|r| (r.location.as_str(), r.latitude, r.longitude)),
    );

    let derived = derive(&records, &catalog);
    if derived.rows.is_empty() {
        return Err(TrainingError::EmptyDatasetAfterCleaning(
            dataset.to_path_buf(),
        ));
    }
    let model = LinearModel::fit_classification(&derived.rows, &derived.labels)?;
    let feature_columns = classification_columns();
    let summary = TrainingSummary {
        rows: derived.rows.len(),
        locations: catalog.len(),
        feature_columns: feature_columns.len(),
    };
    store.save(&ArtifactSet {
        model,
        catalog,
        climate_zones: Some(CLIMATE_ZONES.iter().map(|z| z.as_str().to_string()).collect()),
        feature_columns,
    })?;
    info!(
        "trained rain classifier on {} rows across {} locations",
        summary.rows, summary.locations
    );
    Ok(summary)
}
