//! Search-time itinerary state.

use super::{Connection, ConnectionId, PlaceId};

/// An ordered sequence of connections starting at `origin`.
///
/// Itineraries are cheap values threaded through the search. They hold
/// connection ids rather than references, so they outlive any borrow of the
/// graph; use [`Graph::resolve`](crate::graph::Graph::resolve) to turn one
/// into a self-contained [`Route`](super::Route).
///
/// # Invariants
///
/// - `price` equals the sum of the leg prices it was extended with
/// - `hops()` equals the number of legs
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    origin: PlaceId,
    legs: Vec<ConnectionId>,
    price: f64,
}

impl Itinerary {
    /// An empty itinerary standing at `origin`.
    pub fn new(origin: PlaceId) -> Self {
        Self {
            origin,
            legs: Vec::new(),
            price: 0.0,
        }
    }

    /// Returns a copy of this itinerary with `connection` appended.
    pub fn extended(&self, connection: &Connection) -> Self {
        let mut legs = Vec::with_capacity(self.legs.len() + 1);
        legs.extend_from_slice(&self.legs);
        legs.push(connection.id());

        Self {
            origin: self.origin,
            legs,
            price: self.price + connection.price(),
        }
    }

    /// Where the itinerary starts.
    pub fn origin(&self) -> PlaceId {
        self.origin
    }

    /// Legs in travel order.
    pub fn legs(&self) -> &[ConnectionId] {
        &self.legs
    }

    /// The most recent leg, if any.
    pub fn last_leg(&self) -> Option<ConnectionId> {
        self.legs.last().copied()
    }

    /// Cumulative price in the reference currency.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Number of legs.
    pub fn hops(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }
}
