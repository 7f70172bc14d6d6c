//! Derives the classification training matrix from daily weather records.
//!
//! Records are grouped per location and sorted by date; lag features look
//! back a fixed number of rows within the group (missing history is zero
//! filled) and rolling means use a trailing 7-row window with a minimum of
//! one observation. The label is whether the next day's precipitation
//! exceeds 0.1 mm, so the last row of every location carries no label and
//! is dropped.

use crate::features::builder::season_of_month;
use crate::types::catalog::LocationCatalog;
use crate::types::climate::ClimateZone;
use crate::types::observation::DailyRecord;
use chrono::Datelike;
use std::collections::BTreeMap;

const LAG_STEPS: [usize; 4] = [1, 2, 3, 7];
const ROLLING_WINDOW: usize = 7;
const RAIN_THRESHOLD_MM: f64 = 0.1;

/// Feature rows plus binary rain-tomorrow labels, in `classification_columns`
/// order.
pub struct DerivedDataset {
    pub rows: Vec<Vec<f64>>,
    pub labels: Vec<bool>,
}

fn reading_values(record: &DailyRecord) -> [f64; 5] {
    [
        record.precipitation,
        record.temperature,
        record.humidity,
        record.wind_speed,
        record.pressure,
    ]
}

fn trailing_mean(series: &[f64], end: usize) -> f64 {
    let start = end.saturating_sub(ROLLING_WINDOW - 1);
    let window = &series[start..=end];
    window.iter().sum::<f64>() / window.len() as f64
}

/// Builds feature rows and labels for every labelable record.
pub fn derive(records: &[DailyRecord], catalog: &LocationCatalog) -> DerivedDataset {
    let mut groups: BTreeMap<&str, Vec<&DailyRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.location.as_str()).or_default().push(record);
    }

    let mut dataset = DerivedDataset {
        rows: Vec::new(),
        labels: Vec::new(),
    };
    for (location, mut group) in groups {
        group.sort_by_key(|r| r.date);
        let Some(entry) = catalog.get(location) else {
            continue;
        };
        let zone = ClimateZone::from_latitude(entry.latitude);

        let temperature: Vec<f64> = group.iter().map(|r| r.temperature).collect();
        let humidity: Vec<f64> = group.iter().map(|r| r.humidity).collect();
        let wind_speed: Vec<f64> = group.iter().map(|r| r.wind_speed).collect();

        // The last record has no next day to label against.
        for i in 0..group.len().saturating_sub(1) {
            let record = group[i];
            let mut row = reading_values(record).to_vec();
            row.extend([
                record.date.month() as f64,
                record.date.ordinal() as f64,
                season_of_month(record.date.month()) as f64,
            ]);
            for reading in 0..5 {
                for lag in LAG_STEPS {
                    let value = if i >= lag {
                        reading_values(group[i - lag])[reading]
                    } else {
                        0.0
                    };
                    row.push(value);
                }
            }
            row.push(trailing_mean(&temperature, i));
            row.push(trailing_mean(&humidity, i));
            row.push(trailing_mean(&wind_speed, i));
            row.push(entry.encoding as f64);
            row.push(zone.encoding() as f64);

            dataset.rows.push(row);
            dataset
                .labels
                .push(group[i + 1].precipitation > RAIN_THRESHOLD_MM);
        }
    }
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::builder::classification_columns;
    use chrono::NaiveDate;

    fn record(location: &str, day: u32, precipitation: f64) -> DailyRecord {
        DailyRecord {
            location: location.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            latitude: 19.07,
            longitude: 72.87,
            precipitation,
            temperature: 30.0 + day as f64,
            humidity: 80.0,
            wind_speed: 4.0,
            pressure: 1005.0,
        }
    }

    fn catalog_for(records: &[DailyRecord]) -> LocationCatalog {
        LocationCatalog::from_points(
            records
                .iter()
                .map(|r| (r.location.as_str(), r.latitude, r.longitude)),
        )
    }

    #[test]
    fn rows_match_column_schema_and_labels_shift_by_one() {
        let records = vec![
            record("Mumbai", 1, 0.0),
            record("Mumbai", 2, 5.0),
            record("Mumbai", 3, 0.05),
        ];
        let catalog = catalog_for(&records);
        let dataset = derive(&records, &catalog);

        // Last row per location is unlabeled.
        assert_eq!(dataset.rows.len(), 2);
        assert_eq!(dataset.rows[0].len(), classification_columns().len());
        // Day 2 rained (5.0 mm), day 3 stayed under the 0.1 mm threshold.
        assert_eq!(dataset.labels, vec![true, false]);
    }

    #[test]
    fn missing_history_is_zero_filled() {
        let records = vec![record("Mumbai", 1, 2.0), record("Mumbai", 2, 0.0)];
        let catalog = catalog_for(&records);
        let dataset = derive(&records, &catalog);
        let columns = classification_columns();
        let row = &dataset.rows[0];

        for (name, value) in columns.iter().zip(row) {
            if name.contains("_lag_") {
                assert_eq!(*value, 0.0, "{name} should be zero with no history");
            }
        }
    }

    #[test]
    fn lags_look_back_within_the_location_group() {
        let records = vec![
            record("Mumbai", 1, 1.0),
            record("Mumbai", 2, 2.0),
            record("Mumbai", 3, 3.0),
        ];
        let catalog = catalog_for(&records);
        let dataset = derive(&records, &catalog);
        let columns = classification_columns();
        let row = &dataset.rows[1]; // day 2

        let idx = columns
            .iter()
            .position(|c| c == "precipitation_lag_1")
            .unwrap();
        assert_eq!(row[idx], 1.0);
        let idx7 = columns
            .iter()
            .position(|c| c == "precipitation_lag_7")
            .unwrap();
        assert_eq!(row[idx7], 0.0);
    }

    #[test]
    fn rolling_mean_uses_available_trailing_window() {
        let records = vec![
            record("Mumbai", 1, 0.0),
            record("Mumbai", 2, 0.0),
            record("Mumbai", 3, 0.0),
        ];
        let catalog = catalog_for(&records);
        let dataset = derive(&records, &catalog);
        let columns = classification_columns();
        let idx = columns
            .iter()
            .position(|c| c == "temperature_rolling_7")
            .unwrap();

        // Temperatures are 31, 32, 33 by construction.
        assert_eq!(dataset.rows[0][idx], 31.0);
        assert_eq!(dataset.rows[1][idx], 31.5);
    }

    #[test]
    fn groups_do_not_leak_across_locations() {
        let mut delhi = record("Delhi", 1, 9.0);
        delhi.latitude = 28.61;
        let mut delhi2 = record("Delhi", 2, 0.0);
        delhi2.latitude = 28.61;
        let records = vec![
            delhi,
            delhi2,
            record("Mumbai", 1, 0.0),
            record("Mumbai", 2, 0.0),
        ];
        let catalog = catalog_for(&records);
        let dataset = derive(&records, &catalog);
        let columns = classification_columns();
        let idx = columns
            .iter()
            .position(|c| c == "precipitation_lag_1")
            .unwrap();

        // One labeled row per location, each with empty lag history.
        assert_eq!(dataset.rows.len(), 2);
        for row in &dataset.rows {
            assert_eq!(row[idx], 0.0);
        }
    }
}
