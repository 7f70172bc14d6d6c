//! Persistence of the trained artifact set: the fitted model, the location
//! catalog with its encodings, the climate-zone encoding of the extended
//! pipeline and the feature-column list in training order.
//!
//! Artifacts are bincode files under one directory. Writes go to a temp file
//! in the same directory and are renamed into place, so a reader either sees
//! the previous complete set or the new one, never a torn file. The store
//! itself is read-only after training; prediction loads a fresh copy.

use crate::artifacts::error::ArtifactError;
use crate::model::{LinearModel, WeatherModel};
use crate::types::catalog::LocationCatalog;
use bincode::config::{Configuration, Fixint, LittleEndian};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const MODEL_FILE: &str = "model.bin";
const ENCODERS_FILE: &str = "encoders.bin";
const COLUMNS_FILE: &str = "columns.bin";
const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

/// The bundle produced by a training run; read-only once persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactSet {
    pub model: LinearModel,
    pub catalog: LocationCatalog,
    /// Climate-zone category names in encoding order; present only for the
    /// classification pipeline.
    pub climate_zones: Option<Vec<String>>,
    /// Feature-column names in training order.
    pub feature_columns: Vec<String>,
}

/// Encoders are persisted together in one file.
#[derive(Debug, Serialize, Deserialize)]
struct EncoderBundle {
    catalog: LocationCatalog,
    climate_zones: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ArtifactStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persists a complete artifact set, replacing any previous one.
    pub fn save(&self, set: &ArtifactSet) -> Result<(), ArtifactError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| ArtifactError::DirCreation(self.dir.clone(), e))?;
        self.write_file(MODEL_FILE, &set.model)?;
        self.write_file(
            ENCODERS_FILE,
            &EncoderBundle {
                catalog: set.catalog.clone(),
                climate_zones: set.climate_zones.clone(),
            },
        )?;
        self.write_file(COLUMNS_FILE, &set.feature_columns)?;
        Ok(())
    }

    /// Loads the artifact set, verifying the model's feature count against
    /// the persisted column list so schema drift surfaces at load time
    /// instead of mid-prediction.
    pub fn load(&self) -> Result<ArtifactSet, ArtifactError> {
        let model: LinearModel = self.read_file(MODEL_FILE)?;
        let encoders: EncoderBundle = self.read_file(ENCODERS_FILE)?;
        let feature_columns: Vec<String> = self.read_file(COLUMNS_FILE)?;

        if model.n_features() != feature_columns.len() {
            return Err(ArtifactError::ColumnMismatch {
                model: model.n_features(),
                columns: feature_columns.len(),
            });
        }
        Ok(ArtifactSet {
            model,
            catalog: encoders.catalog,
            climate_zones: encoders.climate_zones,
            feature_columns,
        })
    }

    fn write_file<T: Serialize>(&self, name: &str, value: &T) -> Result<(), ArtifactError> {
        let path = self.dir.join(name);
        let bytes = bincode::serde::encode_to_vec(value, BINCODE_CONFIG)
            .map_err(|e| ArtifactError::Encode(Box::new(e)))?;
        let mut tmp = NamedTempFile::new_in(&self.dir)
            .map_err(|e| ArtifactError::Write(path.clone(), e))?;
        tmp.write_all(&bytes)
            .map_err(|e| ArtifactError::Write(path.clone(), e))?;
        tmp.persist(&path)
            .map_err(|e| ArtifactError::Write(path, e.error))?;
        Ok(())
    }

    fn read_file<T: DeserializeOwned>(&self, name: &str) -> Result<T, ArtifactError> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Err(ArtifactError::ModelUnavailable(self.dir.clone()));
        }
        let bytes = std::fs::read(&path).map_err(|e| ArtifactError::Read(path.clone(), e))?;
        let (value, _) = bincode::serde::decode_from_slice::<T, _>(&bytes, BINCODE_CONFIG)
            .map_err(|e| ArtifactError::Decode(path, Box::new(e)))?;
        Ok(value)
    }
}
