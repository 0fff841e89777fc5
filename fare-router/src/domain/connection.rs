//! Priced, timed legs between places.

use std::fmt;

use chrono::{Duration, NaiveDateTime};

use super::PlaceId;

/// Index of a connection within its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub usize);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// A single priced trip between two places.
///
/// Connections are recorded in the direction the fare was listed but are
/// traversed as undirected during search. They are immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    id: ConnectionId,
    a: PlaceId,
    b: PlaceId,
    price: f64,
    carrier: String,
    departure: NaiveDateTime,
    arrival: NaiveDateTime,
}

impl Connection {
    pub(crate) fn new(
        id: ConnectionId,
        a: PlaceId,
        b: PlaceId,
        price: f64,
        carrier: String,
        departure: NaiveDateTime,
        arrival: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            a,
            b,
            price,
            carrier,
            departure,
            arrival,
        }
    }

    /// Returns the connection id.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Price in the reference currency.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Label of the source that listed this fare (e.g. "wizzair").
    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    pub fn departure(&self) -> NaiveDateTime {
        self.departure
    }

    pub fn arrival(&self) -> NaiveDateTime {
        self.arrival
    }

    /// Time between departure and arrival.
    pub fn duration(&self) -> Duration {
        self.arrival - self.departure
    }

    /// Returns true if `place` is either endpoint.
    pub fn touches(&self, place: PlaceId) -> bool {
        self.a == place || self.b == place
    }

    /// Returns the endpoint opposite `place`.
    ///
    /// For a place that is not an endpoint this returns the place the fare was listed from.
    pub fn opposite(&self, place: PlaceId) -> PlaceId {
        if place == self.a { self.b } else { self.a }
    }
}
