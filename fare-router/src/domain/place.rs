//! Canonical places.

use std::fmt;

use super::{ConnectionId, Coordinate};

/// Index of a place within the graph that created it.
///
/// Place identity is derived from coordinate clustering, so an id is only
/// meaningful for the `Graph` it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceId(pub usize);

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// A canonical geographic node after clustering raw coordinates.
///
/// The coordinate and name are those of the first fare record that created
/// the place; later records snapped onto it do not change them.
#[derive(Debug, Clone)]
pub struct Place {
    id: PlaceId,
    coordinate: Coordinate,
    name: String,
    connections: Vec<ConnectionId>,
}

impl Place {
    pub(crate) fn new(id: PlaceId, coordinate: Coordinate, name: String) -> Self {
        Self {
            id,
            coordinate,
            name,
            connections: Vec::new(),
        }
    }

    /// Returns the place id.
    pub fn id(&self) -> PlaceId {
        self.id
    }

    /// Returns the place coordinate.
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Connections for which this place is an endpoint, in insertion order.
    pub fn connections(&self) -> &[ConnectionId] {
        &self.connections
    }

    pub(crate) fn attach(&mut self, connection: ConnectionId) {
        self.connections.push(connection);
    }
}
