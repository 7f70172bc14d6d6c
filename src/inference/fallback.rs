//! Climatological fallback estimates for when the model path fails.
//!
//! A pure function of coordinates and calendar month; no model artifacts,
//! no I/O and no failure mode, so a prediction can always be produced. The
//! triggering error text is carried on the result for diagnosis.

use crate::types::climate::ClimateZone;
use crate::types::prediction::{
    Confidence, Coordinates, Prediction, PredictionSource, Verdict,
};

/// Seasonal multiplier on the zone's base rain probability. Northern-summer
/// months dry out, shoulder seasons wet up.
fn seasonal_multiplier(month: u32) -> f64 {
    match month {
        6..=8 => 0.8,
        3..=5 | 9..=11 => 1.1,
        _ => 1.0,
    }
}

/// Rain probability from zone climatology, inside [0.05, 0.95].
pub fn rain_probability(zone: ClimateZone, month: u32) -> f64 {
    (zone.base_rain_probability() * seasonal_multiplier(month)).clamp(0.05, 0.95)
}

/// Produces a complete climatological estimate for the query.
///
/// The zone defaults to the latitude band when not supplied. The
/// temperature comes straight from the zone/month table; the table already
/// carries the seasonal cycle, so no model-bias correction applies here.
/// Confidence is always low and `success` is false: the caller asked for a
/// model answer and got climatology instead.
pub fn estimate(
    location: &str,
    date: &str,
    latitude: f64,
    longitude: f64,
    month: u32,
    zone: Option<ClimateZone>,
    error: String,
) -> Prediction {
    let zone = zone.unwrap_or_else(|| ClimateZone::from_latitude(latitude));
    let probability = rain_probability(zone, month);

    let temperature = zone.monthly_temperature(month, latitude);
    // Back out a rainfall figure consistent with how the model path maps
    // rainfall to probability. Humidity and wind are the midpoints of the
    // default bands used when a live request omits readings (60-80 % and
    // 3-7 m/s, reported in km/h).
    let rainfall = probability * 10.0;
    let humidity = 70.0;
    let wind_speed = 5.0 * 3.6;

    Prediction {
        success: false,
        location: location.to_string(),
        date: date.to_string(),
        verdict: Verdict::from_probability(probability),
        probability,
        confidence: Confidence::Low,
        temperature,
        rainfall,
        wind_speed,
        humidity,
        coordinates: Coordinates {
            lat: latitude,
            lon: longitude,
        },
        source: PredictionSource::FallbackStatistical,
        error: Some(error),
    }
}
