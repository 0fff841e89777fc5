//! The fare connection graph.
//!
//! A `Graph` owns every place and connection discovered during ingestion.
//! It is append-only while being built and read-only once searching starts,
//! so a finished graph can be shared behind an `Arc` by any number of
//! concurrent searches.

mod matcher;

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::domain::{
    Connection, ConnectionId, Coordinate, DomainError, Itinerary, Place, PlaceId, PlaceSummary,
    Route, RouteLeg,
};

pub use matcher::GeoMatcher;

/// Errors from graph construction and lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Place id does not belong to this graph
    #[error("unknown place {0}")]
    UnknownPlace(PlaceId),

    /// Connection id does not belong to this graph
    #[error("unknown connection {0}")]
    UnknownConnection(ConnectionId),

    /// Resolved legs did not form a valid route
    #[error(transparent)]
    Route(#[from] DomainError),
}

/// Summary counts for a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStats {
    pub places: usize,
    pub connections: usize,
    /// Connection count per carrier label, sorted by label.
    pub by_carrier: BTreeMap<String, usize>,
}

/// Places and the connections between them.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    places: Vec<Place>,
    connections: Vec<Connection>,
    matcher: GeoMatcher,
}

impl Graph {
    /// Create an empty graph clustering places within the default radius.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with a custom matcher.
    pub fn with_matcher(matcher: GeoMatcher) -> Self {
        Self {
            places: Vec::new(),
            connections: Vec::new(),
            matcher,
        }
    }

    /// Find the nearest place within `max_distance_km` of `coordinate`.
    ///
    /// Never creates a place.
    pub fn closest(&self, coordinate: Coordinate, max_distance_km: f64) -> Option<&Place> {
        self.matcher
            .closest(&self.places, coordinate, max_distance_km)
            .and_then(|id| self.place(id))
    }

    /// Return the place `coordinate` clusters onto, registering a new one if
    /// none is within the matcher's threshold.
    ///
    /// When an existing place matches, `name` is ignored: the first name seen
    /// for a place is kept.
    pub fn add(&mut self, coordinate: Coordinate, name: &str) -> PlaceId {
        if let Some(id) = self.matcher.resolve(&self.places, coordinate) {
            return id;
        }

        let id = PlaceId(self.places.len());
        self.places
            .push(Place::new(id, coordinate, name.to_string()));
        self.matcher.registered(id, coordinate);
        id
    }

    /// Insert a connection between two existing places.
    ///
    /// The connection is appended to both places' incidence lists (once, for
    /// a self-loop) and to the graph's connection list.
    pub fn add_edge(
        &mut self,
        a: PlaceId,
        b: PlaceId,
        price: f64,
        carrier: &str,
        departure: NaiveDateTime,
        arrival: NaiveDateTime,
    ) -> Result<ConnectionId, GraphError> {
        if a.0 >= self.places.len() {
            return Err(GraphError::UnknownPlace(a));
        }
        if b.0 >= self.places.len() {
            return Err(GraphError::UnknownPlace(b));
        }

        let id = ConnectionId(self.connections.len());
        self.connections.push(Connection::new(
            id,
            a,
            b,
            price,
            carrier.to_string(),
            departure,
            arrival,
        ));

        self.places[a.0].attach(id);
        if b != a {
            self.places[b.0].attach(id);
        }

        Ok(id)
    }

    pub fn place(&self, id: PlaceId) -> Option<&Place> {
        self.places.get(id.0)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(id.0)
    }

    /// All places, in registration order.
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    /// All connections, in insertion order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Connections touching `place`, in insertion order.
    ///
    /// Unknown places have no connections.
    pub fn incident(&self, place: PlaceId) -> impl Iterator<Item = &Connection> + '_ {
        self.place(place)
            .map(|p| p.connections())
            .unwrap_or(&[])
            .iter()
            .filter_map(|id| self.connection(*id))
    }

    pub fn place_count(&self) -> usize {
        self.places.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Count places, connections, and connections per carrier.
    pub fn stats(&self) -> GraphStats {
        let mut by_carrier = BTreeMap::new();
        for c in &self.connections {
            *by_carrier.entry(c.carrier().to_string()).or_insert(0) += 1;
        }

        GraphStats {
            places: self.places.len(),
            connections: self.connections.len(),
            by_carrier,
        }
    }

    /// Resolve an itinerary into a self-contained route.
    ///
    /// Legs are oriented in the direction of travel starting from the
    /// itinerary's origin, which may be against the direction a fare was
    /// listed in.
    pub fn resolve(&self, itinerary: &Itinerary) -> Result<Route, GraphError> {
        let mut at = itinerary.origin();
        let mut legs = Vec::with_capacity(itinerary.hops());

        for &id in itinerary.legs() {
            let connection = self
                .connection(id)
                .ok_or(GraphError::UnknownConnection(id))?;
            let next = connection.opposite(at);

            legs.push(RouteLeg {
                from: self.summary(at)?,
                to: self.summary(next)?,
                price: connection.price(),
                carrier: connection.carrier().to_string(),
                departure: connection.departure(),
                arrival: connection.arrival(),
            });
            at = next;
        }

        Ok(Route::new(legs)?)
    }

    fn summary(&self, id: PlaceId) -> Result<PlaceSummary, GraphError> {
        let place = self.place(id).ok_or(GraphError::UnknownPlace(id))?;
        Ok(PlaceSummary {
            id,
            name: place.name().to_string(),
            coordinate: place.coordinate(),
        })
    }
}
