//! The main entry point for training and querying the weather estimator.
//!
//! `Raincast` wires the pipeline together: location resolution, feature
//! building, the trained model and output post-processing. Prediction never
//! fails once a client exists; any error on the model path routes to the
//! climatological fallback with the error text attached to the result.

use crate::error::RaincastError;
use crate::features::builder::{
    build, build_conditions_row, parse_date, season_of_month, Readings,
};
use crate::inference::fallback;
use crate::inference::postprocess::{
    confidence_from_probability, process_regression, round_to,
};
use crate::model::{ModelKind, RawOutput, WeatherModel};
use crate::artifacts::store::{ArtifactSet, ArtifactStore};
use crate::resolver::resolve_location::{LocationResolver, DEFAULT_SIMILARITY_CUTOFF};
use crate::training::trainer::{self, TrainingSummary};
use crate::types::climate::ClimateZone;
use crate::types::prediction::{
    ConditionsRequest, Coordinates, Prediction, PredictionSource,
};
use crate::utils::{ensure_dir_exists, get_artifacts_dir};
use bon::bon;
use chrono::Datelike;
use log::warn;
use std::path::{Path, PathBuf};

/// Weather estimator client.
///
/// # Examples
///
/// ```no_run
/// # use raincast::{Raincast, RaincastError};
/// # use std::path::Path;
/// # fn run() -> Result<(), RaincastError> {
/// let client = Raincast::builder().build()?;
/// client.train(Path::new("data/weather.csv"))?;
/// let prediction = client.predict("Mumbay", "2024-06-15");
/// println!("{}: {}", prediction.location, prediction.verdict);
/// # Ok(())
/// # }
/// ```
pub struct Raincast {
    store: ArtifactStore,
    similarity_cutoff: f64,
    seasonal_adjustment: bool,
}

#[bon]
impl Raincast {
    /// Builds a client.
    ///
    /// * `.artifacts_dir(PathBuf)`: optional. Where trained artifacts live.
    ///   Defaults to `raincast` under the user cache dir.
    /// * `.similarity_cutoff(f64)`: optional. Minimum fuzzy-match ratio
    ///   before the character-set heuristic takes over. Defaults to 0.3.
    /// * `.seasonal_adjustment(bool)`: optional. Month-dependent temperature
    ///   correction on the regression path. Defaults to on.
    ///
    /// Fails only when the artifacts directory cannot be resolved or
    /// created; missing artifacts inside it are handled at predict time.
    #[builder]
    pub fn new(
        artifacts_dir: Option<PathBuf>,
        similarity_cutoff: Option<f64>,
        seasonal_adjustment: Option<bool>,
    ) -> Result<Self, RaincastError> {
        let dir = match artifacts_dir {
            Some(dir) => dir,
            None => get_artifacts_dir().map_err(RaincastError::ArtifactsDirResolution)?,
        };
        ensure_dir_exists(&dir).map_err(|e| RaincastError::ArtifactsDirCreation(dir.clone(), e))?;
        Ok(Raincast {
            store: ArtifactStore::new(dir),
            similarity_cutoff: similarity_cutoff.unwrap_or(DEFAULT_SIMILARITY_CUTOFF),
            seasonal_adjustment: seasonal_adjustment.unwrap_or(true),
        })
    }
}

impl Raincast {
    /// Trains the regression estimator from a region-indexed CSV and
    /// persists the artifacts. Dataset errors surface verbatim.
    pub fn train(&self, dataset: &Path) -> Result<TrainingSummary, RaincastError> {
        Ok(trainer::train(dataset, &self.store)?)
    }

    /// Trains the rain classifier from a master daily CSV.
    pub fn train_classifier(&self, dataset: &Path) -> Result<TrainingSummary, RaincastError> {
        Ok(trainer::train_classifier(dataset, &self.store)?)
    }

    /// Estimates the weather for a free-text location and a `YYYY-MM-DD`
    /// date. Never fails: when the model path errors the result comes from
    /// the climatological fallback, with the error text attached.
    pub fn predict(&self, location: &str, date: &str) -> Prediction {
        match self.predict_primary(location, date) {
            Ok(prediction) => prediction,
            Err(e) => {
                warn!("model path failed for ({location}, {date}): {e}");
                let month = parse_date(date).map(|d| d.month()).unwrap_or(6);
                let (name, lat, lon) = self.fallback_coordinates(location);
                fallback::estimate(&name, date, lat, lon, month, None, e.to_string())
            }
        }
    }

    /// Estimates rain for a coordinates-and-readings request against the
    /// classification artifact. Same never-fail policy as [`predict`].
    ///
    /// [`predict`]: Raincast::predict
    pub fn predict_conditions(&self, request: &ConditionsRequest) -> Prediction {
        match self.predict_conditions_primary(request) {
            Ok(prediction) => prediction,
            Err(e) => {
                warn!(
                    "classifier path failed for ({}, {}): {e}",
                    request.lat, request.lon
                );
                let month = request_month(request);
                fallback::estimate(
                    &format!("{:.4},{:.4}", request.lat, request.lon),
                    request.date.as_deref().unwrap_or(""),
                    request.lat,
                    request.lon,
                    month,
                    request.climate_zone,
                    e.to_string(),
                )
            }
        }
    }

    fn predict_primary(&self, location: &str, date: &str) -> Result<Prediction, RaincastError> {
        let set = self.store.load()?;
        require_kind(&set, ModelKind::Regression)?;
        let resolver = LocationResolver::new(set.catalog.clone(), self.similarity_cutoff);
        let entry = resolver.resolve(location)?;
        let parsed = parse_date(date)?;

        let mut features = build(entry, parsed);
        // Catalog entries always carry mean coordinates, but a non-finite
        // mean (no valid rows for the location) falls back to the
        // dataset-wide mean.
        if !features.lat.is_finite() || !features.lon.is_finite() {
            let (lat, lon) = set.catalog.global_mean();
            features.lat = lat;
            features.lon = lon;
        }
        let raw = set.model.predict_raw(&features.as_row())?;
        let RawOutput::Regression {
            temperature,
            rainfall,
            wind_speed,
            humidity,
        } = raw
        else {
            return Err(RaincastError::WrongModelKind {
                expected: ModelKind::Regression,
                found: set.model.kind(),
            });
        };

        let estimate = process_regression(
            [temperature, rainfall, wind_speed, humidity],
            parsed.month(),
            self.seasonal_adjustment,
        );
        Ok(Prediction {
            success: true,
            location: entry.name.clone(),
            date: date.to_string(),
            verdict: estimate.verdict,
            probability: estimate.probability,
            confidence: confidence_from_probability(estimate.probability),
            temperature: estimate.temperature,
            rainfall: estimate.rainfall,
            wind_speed: estimate.wind_speed,
            humidity: estimate.humidity,
            coordinates: Coordinates {
                lat: entry.latitude,
                lon: entry.longitude,
            },
            source: PredictionSource::MlModel,
            error: None,
        })
    }

    fn predict_conditions_primary(
        &self,
        request: &ConditionsRequest,
    ) -> Result<Prediction, RaincastError> {
        let set = self.store.load()?;
        require_kind(&set, ModelKind::Classification)?;
        let resolver = LocationResolver::new(set.catalog.clone(), self.similarity_cutoff);
        let (entry, _km) = resolver.resolve_coordinates(request.lat, request.lon)?;

        let month = request_month(request);
        let day_of_year = match (request.day_of_year, parsed_request_date(request)) {
            (Some(doy), _) => doy,
            (None, Some(date)) => date.ordinal(),
            // Mid-month approximation when only the month is known.
            (None, None) => (month - 1) * 30 + 15,
        };
        let season = request.season.unwrap_or_else(|| season_of_month(month));
        let zone = request
            .climate_zone
            .unwrap_or_else(|| ClimateZone::from_latitude(request.lat));

        let readings = Readings::from_request(request, month);
        let row = build_conditions_row(&readings, month, day_of_year, season, entry.encoding, zone);
        let raw = set.model.predict_raw(&row)?;
        let RawOutput::Classification { probability, .. } = raw else {
            return Err(RaincastError::WrongModelKind {
                expected: ModelKind::Classification,
                found: set.model.kind(),
            });
        };
        let probability = probability.clamp(0.05, 0.95);

        Ok(Prediction {
            success: true,
            location: entry.name.clone(),
            date: request.date.clone().unwrap_or_default(),
            verdict: crate::types::prediction::Verdict::from_probability(probability),
            probability,
            confidence: confidence_from_probability(probability),
            temperature: round_to(readings.temperature, 1),
            rainfall: round_to(readings.precipitation.max(0.0), 2),
            wind_speed: round_to((readings.wind_speed * 3.6).max(0.0), 1),
            humidity: round_to(readings.humidity.clamp(0.0, 100.0), 1),
            coordinates: Coordinates {
                lat: request.lat,
                lon: request.lon,
            },
            source: PredictionSource::MlModel,
            error: None,
        })
    }

    /// Best-effort coordinates for the fallback: the resolved catalog entry
    /// when artifacts exist, otherwise the equator origin.
    fn fallback_coordinates(&self, location: &str) -> (String, f64, f64) {
        if let Ok(set) = self.store.load() {
            let resolver = LocationResolver::new(set.catalog.clone(), self.similarity_cutoff);
            if let Ok(entry) = resolver.resolve(location) {
                return (entry.name.clone(), entry.latitude, entry.longitude);
            }
        }
        (location.to_string(), 0.0, 0.0)
    }
}

fn require_kind(set: &ArtifactSet, expected: ModelKind) -> Result<(), RaincastError> {
    if set.model.kind() != expected {
        return Err(RaincastError::WrongModelKind {
            expected,
            found: set.model.kind(),
        });
    }
    Ok(())
}

fn parsed_request_date(request: &ConditionsRequest) -> Option<chrono::NaiveDate> {
    request.date.as_deref().and_then(|d| parse_date(d).ok())
}

fn request_month(request: &ConditionsRequest) -> u32 {
    request
        .month
        .or_else(|| parsed_request_date(request).map(|d| d.month()))
        .unwrap_or(6)
        .clamp(1, 12)
}
