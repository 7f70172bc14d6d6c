//! The per-call prediction result and the richer JSON request accepted by
//! the conditions-based prediction entry point.

use crate::types::climate::ClimateZone;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical rain verdict derived from the rain probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Rain,
    Uncertain,
    #[serde(rename = "No rain")]
    NoRain,
}

impl Verdict {
    /// Probability thresholds with inclusive lower boundaries: 0.6 is Rain,
    /// 0.3 is Uncertain.
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 0.6 {
            Verdict::Rain
        } else if probability >= 0.3 {
            Verdict::Uncertain
        } else {
            Verdict::NoRain
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Rain => write!(f, "Rain"),
            Verdict::Uncertain => write!(f, "Uncertain"),
            Verdict::NoRain => write!(f, "No rain"),
        }
    }
}

/// How trustworthy the estimate is. Fallback results are always `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Which path produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionSource {
    #[serde(rename = "ml-model")]
    MlModel,
    #[serde(rename = "fallback-statistical")]
    FallbackStatistical,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A complete weather estimate for one (location, date) query.
///
/// Constructed per call and never persisted. `error` is populated only on
/// the fallback path and carries the diagnostic from the failed primary run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub success: bool,
    pub location: String,
    pub date: String,
    pub verdict: Verdict,
    /// Probability of rain, always inside [0.05, 0.95].
    pub probability: f64,
    pub confidence: Confidence,
    /// Temperature in °C after seasonal correction.
    pub temperature: f64,
    /// Rainfall metric, clamped non-negative.
    pub rainfall: f64,
    /// Wind speed in km/h, clamped non-negative.
    pub wind_speed: f64,
    /// Relative humidity in percent, clamped to [0, 100].
    pub humidity: f64,
    pub coordinates: Coordinates,
    pub source: PredictionSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Richer prediction input: coordinates, calendar fields and instantaneous
/// readings, as accepted by the JSON form of the predict command.
///
/// Everything except the coordinates is optional; omitted calendar fields
/// are derived from `date`, omitted readings from climatological defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConditionsRequest {
    pub lat: f64,
    pub lon: f64,
    /// `YYYY-MM-DD`; used to derive month/day-of-year when they are absent.
    pub date: Option<String>,
    pub month: Option<u32>,
    pub day_of_year: Option<u32>,
    /// 0 = winter, 1 = spring, 2 = summer, 3 = fall.
    pub season: Option<u32>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub pressure: Option<f64>,
    pub precipitation: Option<f64>,
    pub climate_zone: Option<ClimateZone>,
}
