//! Downloads daily weather history from the NASA POWER point API and
//! assembles the master training CSV.
//!
//! The API pages poorly over long ranges, so each (location, year) pair is
//! one request. Transient failures are retried with exponential backoff
//! (1s, 2s, 4s); a year that still fails is skipped with a warning rather
//! than aborting the whole download.

use crate::download::error::DownloadError;
use crate::types::observation::DailyRecord;
use chrono::NaiveDate;
use log::{info, warn};
use polars::prelude::*;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const BASE_URL: &str = "https://power.larc.nasa.gov/api/temporal/daily/point";
const PARAMETERS: &str = "PRECTOTCORR,T2M,RH2M,WS10M,PS";
const MAX_ATTEMPTS: u32 = 3;
/// NASA POWER encodes missing observations as -999.
const MISSING_SENTINEL: f64 = -990.0;
const MASTER_FILE: &str = "weather_master.csv";

/// Cities the bundled training set is seeded from, spread across climate
/// zones and both hemispheres.
pub const SEED_LOCATIONS: [(&str, f64, f64); 6] = [
    ("Mumbai", 19.0760, 72.8777),
    ("New York", 40.7128, -74.0060),
    ("London", 51.5074, -0.1278),
    ("Tokyo", 35.6762, 139.6503),
    ("Sydney", -33.8688, 151.2093),
    ("Cairo", 30.0444, 31.2357),
];

#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: PowerProperties,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    /// parameter name -> (YYYYMMDD -> value)
    parameter: HashMap<String, HashMap<String, f64>>,
}

/// Seconds to wait before retry `attempt` (zero-based): 1, 2, 4.
pub(crate) fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1 << attempt)
}

pub struct PowerClient {
    http: Client,
    base_url: String,
}

impl Default for PowerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerClient {
    pub fn new() -> Self {
        PowerClient {
            http: Client::new(),
            base_url: BASE_URL.to_string(),
        }
    }

    fn year_url(&self, latitude: f64, longitude: f64, year: i32) -> String {
        format!(
            "{}?parameters={PARAMETERS}&community=AG&latitude={latitude}&longitude={longitude}\
             &start={year}0101&end={year}1231&format=JSON",
            self.base_url
        )
    }

    async fn fetch_once(&self, url: &str) -> Result<PowerResponse, DownloadError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::NetworkRequest(url.to_string(), e))?;
        let response = response.error_for_status().map_err(|e| {
            if let Some(status) = e.status() {
                DownloadError::HttpStatus {
                    url: url.to_string(),
                    status,
                    source: e,
                }
            } else {
                DownloadError::NetworkRequest(url.to_string(), e)
            }
        })?;
        response
            .json::<PowerResponse>()
            .await
            .map_err(|e| DownloadError::ResponseDecode(url.to_string(), e))
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<PowerResponse, DownloadError> {
        let mut last_error = None;
        for attempt in 0..MAX_ATTEMPTS {
            match self.fetch_once(url).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!("attempt {} failed for {url}: {e}", attempt + 1);
                    last_error = Some(e);
                    if attempt + 1 < MAX_ATTEMPTS {
                        tokio::time::sleep(backoff_delay(attempt)).await;
                    }
                }
            }
        }
        Err(DownloadError::RetriesExhausted {
            url: url.to_string(),
            attempts: MAX_ATTEMPTS,
            source: Box::new(last_error.expect("at least one attempt ran")),
        })
    }

    /// One (location, year) page of daily records. Dates with any missing
    /// parameter are skipped.
    pub async fn fetch_year(
        &self,
        location: &str,
        latitude: f64,
        longitude: f64,
        year: i32,
    ) -> Result<Vec<DailyRecord>, DownloadError> {
        let url = self.year_url(latitude, longitude, year);
        info!("downloading {location} {year} from {url}");
        let response = self.fetch_with_retry(&url).await?;
        Ok(records_from_response(
            &response, location, latitude, longitude,
        ))
    }

    /// Downloads the full seed range and writes the master CSV under
    /// `out_dir`. Failed (location, year) pages are skipped; the run only
    /// fails when nothing at all was downloaded.
    pub async fn download_master(
        &self,
        out_dir: &Path,
        start_year: i32,
        end_year: i32,
    ) -> Result<PathBuf, DownloadError> {
        let mut records = Vec::new();
        for (location, latitude, longitude) in SEED_LOCATIONS {
            for year in start_year..=end_year {
                match self.fetch_year(location, latitude, longitude, year).await {
                    Ok(mut page) => {
                        info!("{location} {year}: {} records", page.len());
                        records.append(&mut page);
                    }
                    Err(e) => warn!("skipping {location} {year}: {e}"),
                }
                // Stay polite to the API between pages.
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
        if records.is_empty() {
            return Err(DownloadError::NoData);
        }

        std::fs::create_dir_all(out_dir)
            .map_err(|e| DownloadError::OutputDirCreation(out_dir.to_path_buf(), e))?;
        let path = out_dir.join(MASTER_FILE);
        write_master_csv(&records, &path)?;
        info!("wrote {} records to {:?}", records.len(), path);
        Ok(path)
    }
}

fn records_from_response(
    response: &PowerResponse,
    location: &str,
    latitude: f64,
    longitude: f64,
) -> Vec<DailyRecord> {
    let parameter = &response.properties.parameter;
    let Some(precipitation) = parameter.get("PRECTOTCORR") else {
        return Vec::new();
    };

    let mut dates: Vec<&String> = precipitation.keys().collect();
    dates.sort();

    let mut records = Vec::with_capacity(dates.len());
    for key in dates {
        let Ok(date) = NaiveDate::parse_from_str(key, "%Y%m%d") else {
            continue;
        };
        let values: Option<Vec<f64>> = ["PRECTOTCORR", "T2M", "RH2M", "WS10M", "PS"]
            .iter()
            .map(|param| {
                parameter
                    .get(*param)
                    .and_then(|series| series.get(key))
                    .copied()
                    .filter(|v| *v > MISSING_SENTINEL)
            })
            .collect();
        let Some(values) = values else {
            continue;
        };
        records.push(DailyRecord {
            location: location.to_string(),
            date,
            latitude,
            longitude,
            precipitation: values[0],
            temperature: values[1],
            humidity: values[2],
            wind_speed: values[3],
            // POWER reports surface pressure in kPa.
            pressure: values[4] * 10.0,
        });
    }
    records
}

fn write_master_csv(records: &[DailyRecord], path: &Path) -> Result<(), DownloadError> {
    let mut df = df!(
        "date" => records
            .iter()
            .map(|r| r.date.format("%Y-%m-%d").to_string())
            .collect::<Vec<_>>(),
        "location" => records.iter().map(|r| r.location.clone()).collect::<Vec<_>>(),
        "lat" => records.iter().map(|r| r.latitude).collect::<Vec<_>>(),
        "lon" => records.iter().map(|r| r.longitude).collect::<Vec<_>>(),
        "precipitation" => records.iter().map(|r| r.precipitation).collect::<Vec<_>>(),
        "temperature" => records.iter().map(|r| r.temperature).collect::<Vec<_>>(),
        "humidity" => records.iter().map(|r| r.humidity).collect::<Vec<_>>(),
        "wind_speed" => records.iter().map(|r| r.wind_speed).collect::<Vec<_>>(),
        "pressure" => records.iter().map(|r| r.pressure).collect::<Vec<_>>(),
    )
    .map_err(|e| DownloadError::DatasetWrite(path.to_path_buf(), e))?;

    let mut file = std::fs::File::create(path)
        .map_err(|e| DownloadError::DatasetWrite(path.to_path_buf(), e.into()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .map_err(|e| DownloadError::DatasetWrite(path.to_path_buf(), e))?;
    Ok(())
}
