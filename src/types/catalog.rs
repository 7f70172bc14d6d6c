//! The set of locations known to a trained artifact set, with their dense
//! integer encodings and representative coordinates. Includes the `rstar`
//! implementations needed for coordinate-based lookup.

use crate::types::observation::Observation;
use rstar::{PointDistance, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One catalog location: its canonical identifier, dense encoding and the
/// mean coordinates of all observations bearing that identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub name: String,
    /// Dense index into the catalog; position in lexicographic name order.
    pub encoding: u32,
    pub latitude: f64,
    pub longitude: f64,
}

/// The finite set of location identifiers observed during training.
///
/// The encoding and the catalog are produced together: entries are sorted by
/// name and encoded by position, so the mapping is stable for a given
/// training dataset. A catalog must never be paired with a model from a
/// different training run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationCatalog {
    entries: Vec<CatalogEntry>,
    global_latitude: f64,
    global_longitude: f64,
}

impl LocationCatalog {
    /// Builds the catalog from cleaned observations: one entry per distinct
    /// region with mean coordinates, plus the dataset-global coordinate mean.
    ///
    /// Returns an empty catalog for an empty slice; callers gate on
    /// `is_empty` before resolution.
    pub fn from_observations(observations: &[Observation]) -> Self {
        Self::from_points(
            observations
                .iter()
                .map(|o| (o.region.as_str(), o.latitude, o.longitude)),
        )
    }

    /// Builds the catalog from any (name, lat, lon) point stream.
    pub fn from_points<'a>(points: impl IntoIterator<Item = (&'a str, f64, f64)>) -> Self {
        let mut sums: BTreeMap<&str, (f64, f64, usize)> = BTreeMap::new();
        let mut lat_total = 0.0;
        let mut lon_total = 0.0;
        let mut total = 0usize;
        for (name, lat, lon) in points {
            let slot = sums.entry(name).or_insert((0.0, 0.0, 0));
            slot.0 += lat;
            slot.1 += lon;
            slot.2 += 1;
            lat_total += lat;
            lon_total += lon;
            total += 1;
        }

        // BTreeMap iteration gives lexicographic name order, which fixes the
        // dense encoding.
        let entries = sums
            .into_iter()
            .enumerate()
            .map(|(index, (name, (lat, lon, count)))| CatalogEntry {
                name: name.to_string(),
                encoding: index as u32,
                latitude: lat / count as f64,
                longitude: lon / count as f64,
            })
            .collect::<Vec<_>>();

        let n = total.max(1) as f64;
        LocationCatalog {
            entries,
            global_latitude: lat_total / n,
            global_longitude: lon_total / n,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Dataset-global mean coordinates, the defensive fallback when an entry
    /// carries no observations of its own.
    pub fn global_mean(&self) -> (f64, f64) {
        (self.global_latitude, self.global_longitude)
    }
}

impl RTreeObject for CatalogEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.latitude, self.longitude])
    }
}

impl PointDistance for CatalogEntry {
    /// Squared Euclidean distance in degree space; fine for nearest-neighbor
    /// pruning, the haversine distance is computed afterwards.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.latitude - point[0];
        let dy = self.longitude - point[1];
        dx * dx + dy * dy
    }
}
