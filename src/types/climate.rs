//! Coarse latitude-band climate classification used by the fallback estimator
//! and as an auxiliary feature in the classification pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A coarse climate-zone category derived from absolute latitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClimateZone {
    Equatorial,
    Tropical,
    Subtropical,
    Temperate,
    Polar,
}

/// All zones in their stable encoding order (lexicographic, matching the
/// categorical encoding produced at training time).
pub const CLIMATE_ZONES: [ClimateZone; 5] = [
    ClimateZone::Equatorial,
    ClimateZone::Polar,
    ClimateZone::Subtropical,
    ClimateZone::Temperate,
    ClimateZone::Tropical,
];

impl ClimateZone {
    /// Classifies a latitude into a zone using fixed absolute-latitude bands.
    pub fn from_latitude(latitude: f64) -> Self {
        let abs_lat = latitude.abs();
        if abs_lat <= 10.0 {
            ClimateZone::Equatorial
        } else if abs_lat <= 23.5 {
            ClimateZone::Tropical
        } else if abs_lat <= 35.0 {
            ClimateZone::Subtropical
        } else if abs_lat <= 60.0 {
            ClimateZone::Temperate
        } else {
            ClimateZone::Polar
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClimateZone::Equatorial => "equatorial",
            ClimateZone::Tropical => "tropical",
            ClimateZone::Subtropical => "subtropical",
            ClimateZone::Temperate => "temperate",
            ClimateZone::Polar => "polar",
        }
    }

    /// Dense integer encoding, stable across artifact sets (lexicographic).
    pub fn encoding(&self) -> u32 {
        CLIMATE_ZONES
            .iter()
            .position(|z| z == self)
            .expect("zone present in CLIMATE_ZONES") as u32
    }

    /// Base probability of rain for this zone before seasonal scaling.
    pub fn base_rain_probability(&self) -> f64 {
        match self {
            ClimateZone::Equatorial => 0.6,
            ClimateZone::Tropical => 0.4,
            ClimateZone::Subtropical => 0.2,
            ClimateZone::Temperate => 0.3,
            ClimateZone::Polar => 0.2,
        }
    }

    /// Climatological mean temperature (°C) for a calendar month (1-12).
    ///
    /// Southern-hemisphere latitudes shift the table by six months so that
    /// July reads the winter column and January the summer one.
    pub fn monthly_temperature(&self, month: u32, latitude: f64) -> f64 {
        const TABLE: [[f64; 12]; 5] = [
            // equatorial
            [
                26.0, 27.0, 28.0, 28.0, 27.0, 26.0, 25.0, 25.0, 26.0, 27.0, 27.0, 26.0,
            ],
            // tropical
            [
                24.0, 25.0, 27.0, 29.0, 31.0, 32.0, 32.0, 31.0, 30.0, 28.0, 26.0, 24.0,
            ],
            // subtropical
            [
                18.0, 20.0, 23.0, 26.0, 30.0, 33.0, 35.0, 34.0, 31.0, 27.0, 22.0, 19.0,
            ],
            // temperate
            [
                5.0, 7.0, 12.0, 17.0, 22.0, 26.0, 28.0, 27.0, 23.0, 17.0, 11.0, 6.0,
            ],
            // polar
            [
                -15.0, -12.0, -8.0, -2.0, 4.0, 10.0, 12.0, 10.0, 5.0, -1.0, -7.0, -12.0,
            ],
        ];
        let row = match self {
            ClimateZone::Equatorial => &TABLE[0],
            ClimateZone::Tropical => &TABLE[1],
            ClimateZone::Subtropical => &TABLE[2],
            ClimateZone::Temperate => &TABLE[3],
            ClimateZone::Polar => &TABLE[4],
        };
        let month = month.clamp(1, 12);
        let index = if latitude < 0.0 {
            ((month + 5) % 12) as usize
        } else {
            (month - 1) as usize
        };
        row[index]
    }
}

impl fmt::Display for ClimateZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latitude_bands() {
        assert_eq!(ClimateZone::from_latitude(0.0), ClimateZone::Equatorial);
        assert_eq!(ClimateZone::from_latitude(10.0), ClimateZone::Equatorial);
        assert_eq!(ClimateZone::from_latitude(-10.1), ClimateZone::Tropical);
        assert_eq!(ClimateZone::from_latitude(23.5), ClimateZone::Tropical);
        assert_eq!(ClimateZone::from_latitude(23.6), ClimateZone::Subtropical);
        assert_eq!(ClimateZone::from_latitude(35.0), ClimateZone::Subtropical);
        assert_eq!(ClimateZone::from_latitude(-51.5), ClimateZone::Temperate);
        assert_eq!(ClimateZone::from_latitude(60.0), ClimateZone::Temperate);
        assert_eq!(ClimateZone::from_latitude(78.2), ClimateZone::Polar);
    }

    #[test]
    fn encoding_is_lexicographic() {
        assert_eq!(ClimateZone::Equatorial.encoding(), 0);
        assert_eq!(ClimateZone::Polar.encoding(), 1);
        assert_eq!(ClimateZone::Subtropical.encoding(), 2);
        assert_eq!(ClimateZone::Temperate.encoding(), 3);
        assert_eq!(ClimateZone::Tropical.encoding(), 4);
    }

    #[test]
    fn southern_hemisphere_shifts_temperature_table() {
        // July is mid-winter in Sydney, mid-summer at the same northern band.
        let north = ClimateZone::Subtropical.monthly_temperature(7, 33.0);
        let south = ClimateZone::Subtropical.monthly_temperature(7, -33.0);
        assert!(north > south);
        assert_eq!(north, 35.0);
        assert_eq!(south, 18.0);
    }
}
