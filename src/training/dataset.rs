//! CSV dataset loading and cleaning for both trainers.
//!
//! Rows with unparseable dates are dropped; missing numeric measurements are
//! imputed with the column mean over valid rows and missing categorical
//! fields with the `"UNKNOWN"` sentinel.

use crate::training::error::TrainingError;
use crate::types::observation::{DailyRecord, Observation};
use chrono::NaiveDate;
use log::{info, warn};
use polars::prelude::*;
use std::path::Path;

// Region-indexed training dataset schema.
const COL_DATE: &str = "Date";
const COL_REGION: &str = "Region";
const COL_STATE: &str = "State";
const COL_LAT: &str = "Lat";
const COL_LON: &str = "Lon";
const COL_TEMPERATURE: &str = "Temperature";
const COL_RAINFALL: &str = "Rainfall";
const COL_WIND_SPEED: &str = "WindSpeed";
const COL_HUMIDITY: &str = "Humidity";

/// Categorical imputation sentinel.
const UNKNOWN: &str = "UNKNOWN";

fn read_csv(path: &Path) -> Result<DataFrame, TrainingError> {
    if !path.exists() {
        return Err(TrainingError::DatasetNotFound(path.to_path_buf()));
    }
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(200))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| TrainingError::DatasetRead {
            path: path.to_path_buf(),
            source: e,
        })?
        .finish()
        .map_err(|e| TrainingError::DatasetRead {
            path: path.to_path_buf(),
            source: e,
        })
}

/// A string column with nulls kept as `None`.
fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, TrainingError> {
    let column = df
        .column(name)
        .and_then(|c| c.cast(&DataType::String))
        .map_err(|e| TrainingError::MissingColumn {
            column: name.to_string(),
            source: e,
        })?;
    let ca = column.str().map_err(|e| TrainingError::MissingColumn {
        column: name.to_string(),
        source: e,
    })?;
    Ok(ca
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
        .collect())
}

/// A numeric column cast to f64, nulls kept as `None`, plus its mean over
/// valid values for imputation.
fn numeric_column(df: &DataFrame, name: &str) -> Result<(Vec<Option<f64>>, f64), TrainingError> {
    let column = df
        .column(name)
        .and_then(|c| c.cast(&DataType::Float64))
        .map_err(|e| TrainingError::MissingColumn {
            column: name.to_string(),
            source: e,
        })?;
    let ca = column.f64().map_err(|e| TrainingError::MissingColumn {
        column: name.to_string(),
        source: e,
    })?;
    let values: Vec<Option<f64>> = ca.into_iter().collect();
    let mean = ca.mean().unwrap_or(0.0);
    Ok((values, mean))
}

fn parse_row_date(value: Option<&String>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value?.trim(), "%Y-%m-%d").ok()
}

/// Loads the region-indexed dataset (Date, Region, State, Lat, Lon,
/// Temperature, Rainfall, WindSpeed, Humidity).
pub fn load_observations(path: &Path) -> Result<Vec<Observation>, TrainingError> {
    let df = read_csv(path)?;
    info!("loaded dataset {:?} with {} rows", path, df.height());

    let dates = string_column(&df, COL_DATE)?;
    let regions = string_column(&df, COL_REGION)?;
    let states = string_column(&df, COL_STATE)?;
    let (lat, lat_mean) = numeric_column(&df, COL_LAT)?;
    let (lon, lon_mean) = numeric_column(&df, COL_LON)?;
    let (temperature, temperature_mean) = numeric_column(&df, COL_TEMPERATURE)?;
    let (rainfall, rainfall_mean) = numeric_column(&df, COL_RAINFALL)?;
    let (wind_speed, wind_speed_mean) = numeric_column(&df, COL_WIND_SPEED)?;
    let (humidity, humidity_mean) = numeric_column(&df, COL_HUMIDITY)?;

    let mut observations = Vec::with_capacity(df.height());
    let mut dropped = 0usize;
    for i in 0..df.height() {
        let Some(date) = parse_row_date(dates[i].as_ref()) else {
            dropped += 1;
            continue;
        };
        observations.push(Observation {
            region: regions[i].clone().unwrap_or_else(|| UNKNOWN.to_string()),
            state: states[i].clone().unwrap_or_else(|| UNKNOWN.to_string()),
            date,
            latitude: lat[i].unwrap_or(lat_mean),
            longitude: lon[i].unwrap_or(lon_mean),
            temperature: temperature[i].unwrap_or(temperature_mean),
            rainfall: rainfall[i].unwrap_or(rainfall_mean),
            wind_speed: wind_speed[i].unwrap_or(wind_speed_mean),
            humidity: humidity[i].unwrap_or(humidity_mean),
        });
    }
    if dropped > 0 {
        warn!("dropped {dropped} rows with unparseable dates from {path:?}");
    }
    if observations.is_empty() {
        return Err(TrainingError::EmptyDatasetAfterCleaning(path.to_path_buf()));
    }
    Ok(observations)
}

/// Loads the downloader's master observations table (date, location, lat,
/// lon, precipitation, temperature, humidity, wind_speed, pressure).
pub fn load_daily_records(path: &Path) -> Result<Vec<DailyRecord>, TrainingError> {
    let df = read_csv(path)?;
    info!("loaded master dataset {:?} with {} rows", path, df.height());

    let dates = string_column(&df, "date")?;
    let locations = string_column(&df, "location")?;
    let (lat, lat_mean) = numeric_column(&df, "lat")?;
    let (lon, lon_mean) = numeric_column(&df, "lon")?;
    let (precipitation, precipitation_mean) = numeric_column(&df, "precipitation")?;
    let (temperature, temperature_mean) = numeric_column(&df, "temperature")?;
    let (humidity, humidity_mean) = numeric_column(&df, "humidity")?;
    let (wind_speed, wind_speed_mean) = numeric_column(&df, "wind_speed")?;
    let (pressure, pressure_mean) = numeric_column(&df, "pressure")?;

    let mut records = Vec::with_capacity(df.height());
    let mut dropped = 0usize;
    for i in 0..df.height() {
        let Some(date) = parse_row_date(dates[i].as_ref()) else {
            dropped += 1;
            continue;
        };
        records.push(DailyRecord {
            location: locations[i].clone().unwrap_or_else(|| UNKNOWN.to_string()),
            date,
            latitude: lat[i].unwrap_or(lat_mean),
            longitude: lon[i].unwrap_or(lon_mean),
            precipitation: precipitation[i].unwrap_or(precipitation_mean),
            temperature: temperature[i].unwrap_or(temperature_mean),
            humidity: humidity[i].unwrap_or(humidity_mean),
            wind_speed: wind_speed[i].unwrap_or(wind_speed_mean),
            pressure: pressure[i].unwrap_or(pressure_mean),
        });
    }
    if dropped > 0 {
        warn!("dropped {dropped} rows with unparseable dates from {path:?}");
    }
    if records.is_empty() {
        return Err(TrainingError::EmptyDatasetAfterCleaning(path.to_path_buf()));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const HEADER: &str = "Date,Region,State,Lat,Lon,Temperature,Rainfall,WindSpeed,Humidity\n";

    #[test]
    fn valid_rows_are_loaded() {
        let file = write_csv(&format!(
            "{HEADER}2024-06-15,Mumbai,Maharashtra,19.07,72.87,30.5,12.0,4.2,85\n\
             2024-06-16,Delhi,Delhi,28.61,77.20,35.1,0.0,3.1,40\n"
        ));
        let observations = load_observations(file.path()).unwrap();
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].region, "Mumbai");
        assert_eq!(observations[1].humidity, 40.0);
    }

    #[test]
    fn bad_dates_are_dropped_and_all_bad_is_an_error() {
        let file = write_csv(&format!(
            "{HEADER}garbage,Mumbai,Maharashtra,19.07,72.87,30.5,12.0,4.2,85\n\
             2024-06-16,Delhi,Delhi,28.61,77.20,35.1,0.0,3.1,40\n"
        ));
        let observations = load_observations(file.path()).unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].region, "Delhi");

        let all_bad = write_csv(&format!(
            "{HEADER}nope,Mumbai,Maharashtra,19.07,72.87,30.5,12.0,4.2,85\n"
        ));
        assert!(matches!(
            load_observations(all_bad.path()),
            Err(TrainingError::EmptyDatasetAfterCleaning(_))
        ));
    }

    #[test]
    fn missing_values_are_imputed() {
        let file = write_csv(&format!(
            "{HEADER}2024-06-15,Mumbai,Maharashtra,19.07,72.87,30.0,12.0,4.0,80\n\
             2024-06-16,,Maharashtra,19.07,72.87,,12.0,4.0,90\n"
        ));
        let observations = load_observations(file.path()).unwrap();
        assert_eq!(observations[1].region, "UNKNOWN");
        // Column mean of the single valid temperature.
        assert_eq!(observations[1].temperature, 30.0);
    }

    #[test]
    fn missing_file_is_dataset_not_found() {
        assert!(matches!(
            load_observations(Path::new("/definitely/not/here.csv")),
            Err(TrainingError::DatasetNotFound(_))
        ));
    }

    #[test]
    fn master_table_loads() {
        let file = write_csv(
            "date,location,lat,lon,precipitation,temperature,humidity,wind_speed,pressure\n\
             2024-06-15,Mumbai,19.07,72.87,5.5,30.0,85,4.0,1005\n\
             2024-06-16,Mumbai,19.07,72.87,0.0,31.0,80,3.5,1007\n",
        );
        let records = load_daily_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].precipitation, 5.5);
    }
}
