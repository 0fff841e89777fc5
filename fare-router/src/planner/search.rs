//! Depth-bounded route search.
//!
//! Enumerates itineraries from an origin place by recursively following
//! incident connections, pruning on price and hop budget, and keeps the
//! cheapest itinerary that reaches the destination.

use std::time::Instant;

use tracing::{debug, trace};

use crate::domain::{Connection, Coordinate, Itinerary, PlaceId};
use crate::graph::Graph;

use super::config::SearchConstraints;
use super::rank::pick_cheapest;

/// Error from route search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    /// Invalid search request
    #[error("invalid search request: {0}")]
    InvalidRequest(String),

    /// No place within the matching radius of a coordinate
    #[error("no known place within {radius_km} km of {coordinate}")]
    NoPlaceNear {
        coordinate: Coordinate,
        radius_km: f64,
    },

    /// Search ran past its deadline
    #[error("search timed out")]
    Timeout,
}

/// Request for route search between two places of the same graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchRequest {
    pub origin: PlaceId,
    pub destination: PlaceId,
}

impl SearchRequest {
    /// Create a new search request.
    pub fn new(origin: PlaceId, destination: PlaceId) -> Self {
        Self {
            origin,
            destination,
        }
    }
}

/// Result of route search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Cheapest itinerary found, if any.
    pub itinerary: Option<Itinerary>,

    /// Number of recursive steps taken.
    pub branches_explored: usize,
}

/// The place nearest `coordinate` within `radius_km`, as a search endpoint.
///
/// Never creates places.
pub fn resolve_place(
    graph: &Graph,
    coordinate: Coordinate,
    radius_km: f64,
) -> Result<PlaceId, SearchError> {
    graph
        .closest(coordinate, radius_km)
        .map(|p| p.id())
        .ok_or(SearchError::NoPlaceNear {
            coordinate,
            radius_km,
        })
}

/// Route planner over a finished graph.
///
/// The planner only reads the graph, so any number of planners may search
/// the same graph concurrently.
#[derive(Debug)]
pub struct Planner<'a> {
    graph: &'a Graph,
    constraints: &'a SearchConstraints,
    deadline: Option<Instant>,
}

impl<'a> Planner<'a> {
    /// Create a new planner.
    pub fn new(graph: &'a Graph, constraints: &'a SearchConstraints) -> Self {
        Self {
            graph,
            constraints,
            deadline: None,
        }
    }

    /// Abort searches that are still running at `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Search for the cheapest itinerary between two places.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResult, SearchError> {
        self.constraints
            .validate()
            .map_err(SearchError::InvalidRequest)?;

        for (role, id) in [("origin", request.origin), ("destination", request.destination)] {
            if self.graph.place(id).is_none() {
                return Err(SearchError::InvalidRequest(format!(
                    "{role} {id} is not a place in this graph"
                )));
            }
        }

        let mut explored = 0;
        let itinerary = self.explore(
            request.origin,
            request.destination,
            Itinerary::new(request.origin),
            &mut explored,
        )?;

        debug!(
            origin = %request.origin,
            destination = %request.destination,
            found = itinerary.is_some(),
            price = itinerary.as_ref().map(Itinerary::price),
            branches = explored,
            "Route search complete"
        );

        Ok(SearchResult {
            itinerary,
            branches_explored: explored,
        })
    }

    /// Cheapest itinerary from `origin` to `destination`, or `None`.
    pub fn find_best_route(
        &self,
        origin: PlaceId,
        destination: PlaceId,
    ) -> Result<Option<Itinerary>, SearchError> {
        Ok(self
            .search(&SearchRequest::new(origin, destination))?
            .itinerary)
    }

    /// Cheapest itinerary between the places nearest two coordinates.
    ///
    /// Both coordinates must lie within `radius_km` of a known place. No
    /// places are created.
    pub fn find_best_route_between(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        radius_km: f64,
    ) -> Result<Option<Itinerary>, SearchError> {
        let origin = resolve_place(self.graph, origin, radius_km)?;
        let destination = resolve_place(self.graph, destination, radius_km)?;
        self.find_best_route(origin, destination)
    }

    /// One recursive step standing at `at` with `itinerary` behind us.
    fn explore(
        &self,
        at: PlaceId,
        destination: PlaceId,
        itinerary: Itinerary,
        explored: &mut usize,
    ) -> Result<Option<Itinerary>, SearchError> {
        *explored += 1;
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(SearchError::Timeout);
        }

        if itinerary.price() > self.constraints.max_price {
            return Ok(None);
        }

        let last: Option<&Connection> = itinerary
            .last_leg()
            .and_then(|id| self.graph.connection(id));

        // A branch stops at the first leg that reaches the destination
        if last.is_some_and(|leg| leg.touches(destination)) {
            return Ok(Some(itinerary));
        }

        if itinerary.hops() + 1 > self.constraints.max_hops {
            return Ok(None);
        }

        let min_layover = self.constraints.min_layover();
        let mut candidates = Vec::new();

        for connection in self.graph.incident(at) {
            if !self.constraints.departs_within(connection.departure()) {
                continue;
            }

            if let Some(prev) = last {
                if connection.departure() - prev.arrival() < min_layover {
                    continue;
                }
            }

            let next = connection.opposite(at);
            trace!(
                from = %at,
                to = %next,
                connection = %connection.id(),
                price = itinerary.price() + connection.price(),
                "Following connection"
            );

            if let Some(found) =
                self.explore(next, destination, itinerary.extended(connection), explored)?
            {
                candidates.push(found);
            }
        }

        Ok(pick_cheapest(candidates))
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod search_tests;
