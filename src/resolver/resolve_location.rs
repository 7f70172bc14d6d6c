//! Maps free-text location input onto the catalog of locations known to a
//! trained artifact set.
//!
//! Resolution is deliberately forgiving: the primary pass scores every
//! catalog entry with a sequence-alignment similarity ratio and accepts the
//! best entry above a configurable cutoff; when nothing clears the cutoff a
//! looser character-set heuristic still picks the closest entry. Only an
//! empty catalog makes resolution fail.

use crate::resolver::error::ResolveLocationError;
use crate::types::catalog::{CatalogEntry, LocationCatalog};
use haversine::{distance, Location as HaversineLocation, Units};
use ordered_float::OrderedFloat;
use rstar::RTree;
use std::collections::BTreeSet;

/// Default similarity cutoff; the permissive end of the supported 0.3-0.5
/// range.
pub const DEFAULT_SIMILARITY_CUTOFF: f64 = 0.3;

pub struct LocationResolver {
    catalog: LocationCatalog,
    rtree: RTree<CatalogEntry>,
    cutoff: f64,
}

impl LocationResolver {
    pub fn new(catalog: LocationCatalog, cutoff: f64) -> Self {
        let rtree = RTree::bulk_load(catalog.entries().to_vec());
        LocationResolver {
            catalog,
            rtree,
            cutoff,
        }
    }

    pub fn catalog(&self) -> &LocationCatalog {
        &self.catalog
    }

    /// Resolves a free-text query to a catalog entry.
    ///
    /// Returns the highest-similarity entry when its ratio clears the
    /// cutoff; otherwise the entry whose character set differs least from
    /// the query's. Fails only when the catalog itself is empty.
    pub fn resolve(&self, query: &str) -> Result<&CatalogEntry, ResolveLocationError> {
        if self.catalog.is_empty() {
            return Err(ResolveLocationError::EmptyCatalog(query.to_string()));
        }
        let needle = query.to_lowercase();

        let best = self
            .catalog
            .entries()
            .iter()
            .map(|entry| (entry, similarity_ratio(&needle, &entry.name.to_lowercase())))
            .max_by_key(|(_, score)| OrderedFloat(*score))
            .expect("catalog checked non-empty");

        if best.1 >= self.cutoff {
            return Ok(best.0);
        }
        Ok(self.closest_by_char_set(&needle))
    }

    /// Secondary heuristic: minimize the symmetric difference between the
    /// query's character set and each entry's. Ties break toward the
    /// lexicographically first entry (catalog order).
    fn closest_by_char_set(&self, needle: &str) -> &CatalogEntry {
        let query_chars: BTreeSet<char> = needle.chars().collect();
        self.catalog
            .entries()
            .iter()
            .min_by_key(|entry| {
                let entry_chars: BTreeSet<char> = entry.name.to_lowercase().chars().collect();
                query_chars.symmetric_difference(&entry_chars).count()
            })
            .expect("catalog checked non-empty")
    }

    /// Resolves coordinates to the nearest catalog entry, returning the
    /// entry and its haversine distance in kilometers.
    pub fn resolve_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<(&CatalogEntry, f64), ResolveLocationError> {
        let nearest = self
            .rtree
            .nearest_neighbor(&[latitude, longitude])
            .ok_or_else(|| {
                ResolveLocationError::EmptyCatalog(format!("{latitude},{longitude}"))
            })?;
        let km = distance(
            HaversineLocation {
                latitude,
                longitude,
            },
            HaversineLocation {
                latitude: nearest.latitude,
                longitude: nearest.longitude,
            },
            Units::Kilometers,
        );
        // The R-tree stores copies of the catalog entries; hand back the
        // catalog's own reference so lifetimes match `resolve`.
        let entry = self
            .catalog
            .get(&nearest.name)
            .expect("rtree entries come from the catalog");
        Ok((entry, km))
    }
}

/// Normalized similarity of two strings in [0, 1] using the
/// Ratcliff/Obershelp sequence-alignment ratio: twice the number of matching
/// characters over the total length. This rewards shared ordered runs, not
/// raw edit distance.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (ai, bi, len) = longest_common_run(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..ai], &b[..bi]) + matching_chars(&a[ai + len..], &b[bi + len..])
}

/// Longest common substring of `a` and `b` as (start in a, start in b, len).
fn longest_common_run(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    // lengths[j] = longest common suffix of a[..=i] and b[..=j-1], rolled row
    let mut lengths = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        let mut prev = 0;
        for (j, cb) in b.iter().enumerate() {
            let current = lengths[j + 1];
            if ca == cb {
                let run = prev + 1;
                lengths[j + 1] = run;
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            } else {
                lengths[j + 1] = 0;
            }
            prev = current;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::catalog::LocationCatalog;
    use crate::types::observation::Observation;
    use chrono::NaiveDate;

    fn obs(region: &str, lat: f64, lon: f64) -> Observation {
        Observation {
            region: region.to_string(),
            state: "UNKNOWN".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            latitude: lat,
            longitude: lon,
            temperature: 25.0,
            rainfall: 1.0,
            wind_speed: 3.0,
            humidity: 60.0,
        }
    }

    fn resolver(cutoff: f64) -> LocationResolver {
        let catalog = LocationCatalog::from_observations(&[
            obs("Mumbai", 19.07, 72.87),
            obs("Delhi", 28.61, 77.20),
            obs("Chennai", 13.08, 80.27),
        ]);
        LocationResolver::new(catalog, cutoff)
    }

    #[test]
    fn ratio_matches_known_values() {
        assert_eq!(similarity_ratio("abc", "abc"), 1.0);
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
        // "mumbai" vs "mumbay": 5 matching chars, 12 total.
        let r = similarity_ratio("mumbai", "mumbay");
        assert!((r - 10.0 / 12.0).abs() < 1e-9);
        assert_eq!(similarity_ratio("", ""), 1.0);
    }

    #[test]
    fn exact_match_up_to_case_resolves_exactly() {
        let r = resolver(0.5);
        assert_eq!(r.resolve("mumbai").unwrap().name, "Mumbai");
        assert_eq!(r.resolve("CHENNAI").unwrap().name, "Chennai");
    }

    #[test]
    fn misspelling_above_cutoff_resolves() {
        let r = resolver(0.3);
        assert_eq!(r.resolve("Mumbay").unwrap().name, "Mumbai");
        assert_eq!(r.resolve("Deli").unwrap().name, "Delhi");
    }

    #[test]
    fn below_cutoff_still_returns_some_entry() {
        let r = resolver(0.5);
        // Shares no ordered run worth anything; char-set heuristic answers.
        let entry = r.resolve("xyzqw").unwrap();
        assert!(["Mumbai", "Delhi", "Chennai"].contains(&entry.name.as_str()));
    }

    #[test]
    fn resolution_never_leaves_the_catalog() {
        let r = resolver(0.4);
        for query in ["Bombay", "delhi farms", "ch", "123", "   "] {
            let entry = r.resolve(query).unwrap();
            assert!(r.catalog().get(&entry.name).is_some());
        }
    }

    #[test]
    fn empty_catalog_is_the_only_failure() {
        let r = LocationResolver::new(LocationCatalog::from_observations(&[]), 0.3);
        assert!(matches!(
            r.resolve("Mumbai"),
            Err(ResolveLocationError::EmptyCatalog(_))
        ));
    }

    #[test]
    fn coordinates_resolve_to_nearest_entry() {
        let r = resolver(0.3);
        let (entry, km) = r.resolve_coordinates(19.0, 72.8).unwrap();
        assert_eq!(entry.name, "Mumbai");
        assert!(km < 50.0);
    }
}
