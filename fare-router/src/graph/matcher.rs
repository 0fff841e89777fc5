//! Coordinate clustering.
//!
//! Fare sources disagree slightly on where a city or airport is. The matcher
//! snaps a raw coordinate onto the nearest known place if one lies within a
//! threshold, so that "Riga" from a bus listing and "Riga" from an airline
//! listing become one node.

use std::collections::HashMap;

use crate::domain::{Coordinate, Place, PlaceId};

/// Nearest-place lookup with an exact-coordinate cache.
///
/// The cache maps an exact coordinate to its nearest place and distance. It
/// is cleared whenever a place is registered, so a cached answer is always
/// the answer a full scan would give.
#[derive(Debug, Clone)]
pub struct GeoMatcher {
    threshold_km: f64,
    cache: HashMap<(u64, u64), (PlaceId, f64)>,
}

impl GeoMatcher {
    /// Default clustering radius.
    pub const DEFAULT_THRESHOLD_KM: f64 = 50.0;

    /// Create a matcher that clusters within `threshold_km`.
    pub fn new(threshold_km: f64) -> Self {
        Self {
            threshold_km,
            cache: HashMap::new(),
        }
    }

    /// Radius used when registering places.
    pub fn threshold_km(&self) -> f64 {
        self.threshold_km
    }

    /// Find the nearest place within `max_distance_km` of `coordinate`.
    ///
    /// Ties on distance go to the place registered first.
    pub fn closest(
        &self,
        places: &[Place],
        coordinate: Coordinate,
        max_distance_km: f64,
    ) -> Option<PlaceId> {
        let (id, distance) = match self.cache.get(&coordinate.bits()) {
            Some(hit) => *hit,
            None => nearest(places, coordinate)?,
        };
        (distance <= max_distance_km).then_some(id)
    }

    /// Find the place `coordinate` belongs to, remembering the answer.
    ///
    /// Returns `None` if no place lies within the clustering threshold; the
    /// caller should then register a new place via [`GeoMatcher::registered`].
    pub(crate) fn resolve(&mut self, places: &[Place], coordinate: Coordinate) -> Option<PlaceId> {
        let key = coordinate.bits();
        let (id, distance) = match self.cache.get(&key) {
            Some(hit) => *hit,
            None => {
                let found = nearest(places, coordinate)?;
                self.cache.insert(key, found);
                found
            }
        };
        (distance <= self.threshold_km).then_some(id)
    }

    /// Record that a new place now exists at `coordinate`.
    pub(crate) fn registered(&mut self, id: PlaceId, coordinate: Coordinate) {
        // Any cached nearest-place answer may now be stale
        self.cache.clear();
        self.cache.insert(coordinate.bits(), (id, 0.0));
    }

    /// Number of cached coordinates.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl Default for GeoMatcher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD_KM)
    }
}

/// Linear scan for the nearest place, first-registered on ties.
fn nearest(places: &[Place], coordinate: Coordinate) -> Option<(PlaceId, f64)> {
    let mut best: Option<(PlaceId, f64)> = None;

    for place in places {
        let distance = place.coordinate().distance_km(&coordinate);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((place.id(), distance)),
        }
    }

    best
}
