//! Named landmark coordinates.
//!
//! Landmarks let callers name a well-known city instead of typing its
//! coordinate. Lookup ignores case and surrounding whitespace.

use std::collections::BTreeMap;

use crate::domain::Coordinate;

/// A collection of named coordinates.
#[derive(Debug, Clone, Default)]
pub struct Landmarks {
    /// Keyed by lowercased name.
    by_name: BTreeMap<String, Coordinate>,
}

impl Landmarks {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a landmark.
    pub fn add(&mut self, name: &str, coordinate: Coordinate) {
        self.by_name.insert(normalize(name), coordinate);
    }

    /// Look up a landmark by name.
    pub fn get(&self, name: &str) -> Option<Coordinate> {
        self.by_name.get(&normalize(name)).copied()
    }

    /// Landmark names (lowercased) and coordinates, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Coordinate)> + '_ {
        self.by_name.iter().map(|(n, c)| (n.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Builder for creating landmarks.
///
/// Provides a fluent API for adding landmarks.
#[derive(Debug, Default)]
pub struct LandmarksBuilder {
    inner: Landmarks,
}

impl LandmarksBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a landmark. Out-of-range coordinates are skipped.
    pub fn add(mut self, name: &str, lat: f64, lon: f64) -> Self {
        if let Ok(coordinate) = Coordinate::new(lat, lon) {
            self.inner.add(name, coordinate);
        }
        self
    }

    pub fn build(self) -> Landmarks {
        self.inner
    }
}

/// Cities the fare collectors query around.
pub fn european_landmarks() -> Landmarks {
    LandmarksBuilder::new()
        .add("Kyiv", 50.5, 30.5)
        .add("Tartu", 58.4, 26.7)
        .add("Berlin", 52.5, 13.5)
        .add("Paris", 49.4544, 2.11278) // Beauvais
        .add("Riga", 56.9236, 23.9711)
        .build()
}
