//! Deterministic feature derivation from a resolved location and a calendar
//! date, plus the extended conditions vector used by the classification
//! pipeline.
//!
//! Field order is part of the trained artifact's contract: the column lists
//! here are persisted at training time and checked at artifact load, so a
//! drift between builder and model is a hard error, never a silent
//! truncation.

use crate::features::error::FeatureError;
use crate::types::catalog::CatalogEntry;
use crate::types::climate::ClimateZone;
use crate::types::prediction::ConditionsRequest;
use chrono::{Datelike, NaiveDate};
use rand::Rng;

/// Column names of the regression feature vector, in training order.
pub const REGRESSION_COLUMNS: [&str; 7] = [
    "location_enc",
    "month",
    "day",
    "day_of_year",
    "weekday",
    "lat",
    "lon",
];

/// Fixed-schema feature vector for the regression pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub location_enc: f64,
    pub month: f64,
    pub day: f64,
    pub day_of_year: f64,
    /// ISO ordering: 0 = Monday .. 6 = Sunday.
    pub weekday: f64,
    pub lat: f64,
    pub lon: f64,
}

impl FeatureVector {
    pub fn as_row(&self) -> Vec<f64> {
        vec![
            self.location_enc,
            self.month,
            self.day,
            self.day_of_year,
            self.weekday,
            self.lat,
            self.lon,
        ]
    }
}

/// Parses a `YYYY-MM-DD` date string.
pub fn parse_date(input: &str) -> Result<NaiveDate, FeatureError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| FeatureError::InvalidDate(input.to_string()))
}

/// Builds the regression feature vector for a resolved location and date.
pub fn build(entry: &CatalogEntry, date: NaiveDate) -> FeatureVector {
    FeatureVector {
        location_enc: entry.encoding as f64,
        month: date.month() as f64,
        day: date.day() as f64,
        day_of_year: date.ordinal() as f64,
        weekday: date.weekday().num_days_from_monday() as f64,
        lat: entry.latitude,
        lon: entry.longitude,
    }
}

/// Season index for a calendar month: 0 winter, 1 spring, 2 summer, 3 fall.
pub fn season_of_month(month: u32) -> u32 {
    match month {
        12 | 1 | 2 => 0,
        3..=5 => 1,
        6..=8 => 2,
        _ => 3,
    }
}

const LAG_STEPS: [u32; 4] = [1, 2, 3, 7];
const LAGGED_READINGS: [&str; 5] = [
    "precipitation",
    "temperature",
    "humidity",
    "wind_speed",
    "pressure",
];
const ROLLING_READINGS: [&str; 3] = ["temperature", "humidity", "wind_speed"];

/// Column names of the classification feature vector, in training order.
/// 5 readings + 3 calendar fields + 20 lags + 3 rolling means + 2 encodings.
pub fn classification_columns() -> Vec<String> {
    let mut columns: Vec<String> = LAGGED_READINGS.iter().map(|s| s.to_string()).collect();
    columns.extend(["month", "day_of_year", "season"].map(String::from));
    for reading in LAGGED_READINGS {
        for lag in LAG_STEPS {
            columns.push(format!("{reading}_lag_{lag}"));
        }
    }
    for reading in ROLLING_READINGS {
        columns.push(format!("{reading}_rolling_7"));
    }
    columns.push("location_enc".to_string());
    columns.push("climate_zone_enc".to_string());
    columns
}

/// Instantaneous readings feeding the classification vector.
#[derive(Debug, Clone, Copy)]
pub struct Readings {
    pub precipitation: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pressure: f64,
}

impl Readings {
    /// Fills omitted readings with climatological defaults for the request's
    /// coordinates and month. The randomized spread keeps repeated default
    /// requests from collapsing onto one synthetic point; it is not
    /// reproducible.
    pub fn from_request(request: &ConditionsRequest, month: u32) -> Self {
        let mut rng = rand::thread_rng();
        let zone = request
            .climate_zone
            .unwrap_or_else(|| ClimateZone::from_latitude(request.lat));
        Readings {
            precipitation: request.precipitation.unwrap_or(0.0),
            temperature: request
                .temperature
                .unwrap_or_else(|| zone.monthly_temperature(month, request.lat)),
            humidity: request
                .humidity
                .unwrap_or_else(|| 60.0 + rng.gen::<f64>() * 20.0),
            wind_speed: request
                .wind_speed
                .unwrap_or_else(|| 3.0 + rng.gen::<f64>() * 4.0),
            pressure: request
                .pressure
                .unwrap_or_else(|| 1013.0 + (rng.gen::<f64>() - 0.5) * 20.0),
        }
    }

    fn lagged_values(&self) -> [f64; 5] {
        [
            self.precipitation,
            self.temperature,
            self.humidity,
            self.wind_speed,
            self.pressure,
        ]
    }
}

/// Builds the classification feature row for live single-point inference.
///
/// No real history exists at inference time, so lag and rolling fields are
/// approximated by jittering the instantaneous reading with a small
/// multiplicative random factor (lags ×[0.9, 1.1), rolling means
/// ×[0.95, 1.05)). These fields carry no genuine temporal information and
/// are non-reproducible between calls; consumers must not compare them.
pub fn build_conditions_row(
    readings: &Readings,
    month: u32,
    day_of_year: u32,
    season: u32,
    location_enc: u32,
    zone: ClimateZone,
) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    let mut row = readings.lagged_values().to_vec();
    row.extend([month as f64, day_of_year as f64, season as f64]);
    for base in readings.lagged_values() {
        for _ in LAG_STEPS {
            row.push(base * (0.9 + rng.gen::<f64>() * 0.2));
        }
    }
    for base in [readings.temperature, readings.humidity, readings.wind_speed] {
        row.push(base * (0.95 + rng.gen::<f64>() * 0.1));
    }
    row.push(location_enc as f64);
    row.push(zone.encoding() as f64);
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> CatalogEntry {
        CatalogEntry {
            name: "Mumbai".to_string(),
            encoding: 2,
            latitude: 19.07,
            longitude: 72.87,
        }
    }

    #[test]
    fn weekday_is_iso_monday_zero() {
        // 2024-01-01 was a Monday, 2024-06-15 a Saturday.
        let monday = parse_date("2024-01-01").unwrap();
        let saturday = parse_date("2024-06-15").unwrap();
        assert_eq!(build(&entry(), monday).weekday, 0.0);
        assert_eq!(build(&entry(), saturday).weekday, 5.0);
    }

    #[test]
    fn calendar_fields_stay_in_gregorian_ranges() {
        for input in ["2023-01-01", "2023-12-31", "2024-02-29", "2024-12-31"] {
            let date = parse_date(input).unwrap();
            let features = build(&entry(), date);
            assert!((0.0..=6.0).contains(&features.weekday));
            assert!((1.0..=366.0).contains(&features.day_of_year));
            assert!((1.0..=12.0).contains(&features.month));
        }
        // 2024 is a leap year.
        let eoy = build(&entry(), parse_date("2024-12-31").unwrap());
        assert_eq!(eoy.day_of_year, 366.0);
    }

    #[test]
    fn unparseable_dates_are_rejected() {
        for input in ["not-a-date", "2024-13-01", "2023-02-29", "15/06/2024", ""] {
            assert!(matches!(parse_date(input), Err(FeatureError::InvalidDate(_))));
        }
    }

    #[test]
    fn row_order_matches_regression_columns() {
        let features = build(&entry(), parse_date("2024-06-15").unwrap());
        let row = features.as_row();
        assert_eq!(row.len(), REGRESSION_COLUMNS.len());
        assert_eq!(row[0], 2.0); // location_enc
        assert_eq!(row[1], 6.0); // month
        assert_eq!(row[2], 15.0); // day
        assert_eq!(row[5], 19.07); // lat
    }

    #[test]
    fn season_mapping() {
        assert_eq!(season_of_month(12), 0);
        assert_eq!(season_of_month(2), 0);
        assert_eq!(season_of_month(4), 1);
        assert_eq!(season_of_month(7), 2);
        assert_eq!(season_of_month(10), 3);
    }

    #[test]
    fn conditions_row_matches_column_count() {
        let columns = classification_columns();
        assert_eq!(columns.len(), 33);
        let readings = Readings {
            precipitation: 1.0,
            temperature: 28.0,
            humidity: 80.0,
            wind_speed: 4.0,
            pressure: 1008.0,
        };
        let row = build_conditions_row(&readings, 6, 167, 2, 1, ClimateZone::Tropical);
        assert_eq!(row.len(), columns.len());
        // Deterministic slots survive the jitter.
        assert_eq!(row[0], 1.0);
        assert_eq!(row[5], 6.0);
        assert_eq!(row[row.len() - 2], 1.0);
        assert_eq!(row[row.len() - 1], ClimateZone::Tropical.encoding() as f64);
    }

    #[test]
    fn jittered_lags_stay_near_the_reading() {
        let readings = Readings {
            precipitation: 10.0,
            temperature: 30.0,
            humidity: 70.0,
            wind_speed: 5.0,
            pressure: 1010.0,
        };
        let columns = classification_columns();
        let row = build_conditions_row(&readings, 6, 167, 2, 0, ClimateZone::Tropical);
        for (name, value) in columns.iter().zip(&row) {
            if name.contains("_lag_") || name.contains("_rolling_") {
                let base = match name.split('_').next().unwrap() {
                    "precipitation" => 10.0,
                    "temperature" => 30.0,
                    "humidity" => 70.0,
                    "wind" => 5.0,
                    "pressure" => 1010.0,
                    other => panic!("unexpected column {other}"),
                };
                assert!(
                    *value >= base * 0.9 - 1e-9 && *value <= base * 1.1 + 1e-9,
                    "{name} = {value} too far from {base}"
                );
            }
        }
    }
}
