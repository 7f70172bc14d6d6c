//! Plain data structs for the two historical-record schemas the trainers
//! consume: the region-indexed weather dataset and the downloader's master
//! observations table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One historical record from the region-indexed training dataset.
///
/// Rows whose date failed to parse never become an `Observation`; missing
/// scalar measurements are imputed with column means and missing categorical
/// fields with `"UNKNOWN"` before construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub region: String,
    pub state: String,
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    /// Mean temperature in °C.
    pub temperature: f64,
    /// Rainfall amount for the day.
    pub rainfall: f64,
    /// Wind speed in m/s, the model's native unit.
    pub wind_speed: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
}

/// One daily record from the downloader's master dataset, used to derive the
/// classifier's training table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRecord {
    pub location: String,
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub precipitation: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pressure: f64,
}
