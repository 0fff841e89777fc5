//! Domain types for the fare route planner.
//!
//! This module contains the core value types: coordinates, places,
//! connections, and the itineraries and routes built from them. Types that
//! carry invariants enforce them at construction time.

mod connection;
mod coordinate;
mod error;
mod itinerary;
mod place;
mod route;

pub use connection::{Connection, ConnectionId};
pub use coordinate::{Coordinate, InvalidCoordinate};
pub use error::DomainError;
pub use itinerary::Itinerary;
pub use place::{Place, PlaceId};
pub use route::{PlaceSummary, Route, RouteLeg};
