//! Data transfer objects for web requests and responses.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, Place, PlaceSummary, Route, RouteLeg};
use crate::graph::GraphStats;
use crate::ingest::parse_timestamp;
use crate::landmarks::Landmarks;
use crate::planner::SearchConstraints;

/// Largest hop limit a request may ask for.
///
/// Search cost grows exponentially with hops.
pub const MAX_HOPS_LIMIT: usize = 6;

/// Query for the nearest place to a coordinate.
#[derive(Debug, Deserialize)]
pub struct NearestPlaceQuery {
    pub lat: f64,
    pub lon: f64,

    /// Search radius, defaulting to the server's matching radius
    pub radius_km: Option<f64>,
}

/// A place in responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceResult {
    /// Graph-local place id
    pub id: usize,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Response for nearest-place lookup.
#[derive(Debug, Serialize)]
pub struct NearestPlaceResponse {
    pub place: PlaceResult,
    pub distance_km: f64,
}

/// Response for graph statistics.
#[derive(Debug, Serialize)]
pub struct GraphStatsResponse {
    pub places: usize,
    pub connections: usize,
    pub by_carrier: BTreeMap<String, usize>,
}

/// A search endpoint: a landmark name or a coordinate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
    Named(String),
    Point { lat: f64, lon: f64 },
}

/// Request to plan a route.
///
/// Unset constraint fields take the server defaults.
#[derive(Debug, Deserialize)]
pub struct PlanRouteRequest {
    pub origin: Endpoint,
    pub destination: Endpoint,

    /// Maximum total price in the reference currency
    pub max_price: Option<f64>,

    /// Maximum number of legs
    pub max_hops: Option<usize>,

    /// Earliest departure, e.g. "2018-01-01T00:00:00"
    pub window_start: Option<String>,

    /// Latest departure
    pub window_end: Option<String>,

    /// Minimum layover in minutes
    pub min_layover_mins: Option<i64>,

    /// Radius for matching endpoints to places
    pub radius_km: Option<f64>,
}

/// A leg in a planned route.
#[derive(Debug, Serialize)]
pub struct LegResult {
    pub from: PlaceResult,
    pub to: PlaceResult,
    pub price: f64,
    pub carrier: String,
    pub departure: String,
    pub arrival: String,
    pub duration_mins: i64,
}

/// A planned route.
#[derive(Debug, Serialize)]
pub struct RouteResult {
    pub legs: Vec<LegResult>,
    pub total_price: f64,
    pub hops: usize,
    pub departure: String,
    pub arrival: String,

    /// Minutes waited between consecutive legs
    pub layovers_mins: Vec<i64>,
}

/// Response for route planning.
#[derive(Debug, Serialize)]
pub struct PlanRouteResponse {
    /// Cheapest route, or null if none satisfies the constraints
    pub route: Option<RouteResult>,

    /// Number of search steps taken
    pub branches_explored: usize,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl Endpoint {
    /// Resolve to a coordinate, looking names up in `landmarks`.
    pub fn coordinate(&self, landmarks: &Landmarks) -> Result<Coordinate, String> {
        match self {
            Endpoint::Named(name) => landmarks
                .get(name)
                .ok_or_else(|| format!("unknown landmark: {name}")),
            Endpoint::Point { lat, lon } => Coordinate::new(*lat, *lon).map_err(|e| e.to_string()),
        }
    }
}

impl PlanRouteRequest {
    /// Apply this request's overrides to `defaults`.
    pub fn constraints(&self, defaults: &SearchConstraints) -> Result<SearchConstraints, String> {
        let max_hops = self.max_hops.unwrap_or(defaults.max_hops);
        if max_hops > MAX_HOPS_LIMIT {
            return Err(format!(
                "max_hops must be at most {MAX_HOPS_LIMIT}, got {max_hops}"
            ));
        }

        let constraints = SearchConstraints {
            max_price: self.max_price.unwrap_or(defaults.max_price),
            max_hops,
            window_start: parse_bound("window_start", self.window_start.as_deref())?
                .or(defaults.window_start),
            window_end: parse_bound("window_end", self.window_end.as_deref())?
                .or(defaults.window_end),
            min_layover_mins: self.min_layover_mins.unwrap_or(defaults.min_layover_mins),
        };

        constraints.validate()?;
        Ok(constraints)
    }
}

fn parse_bound(field: &str, value: Option<&str>) -> Result<Option<NaiveDateTime>, String> {
    value
        .map(|s| parse_timestamp(s).ok_or_else(|| format!("invalid {field}: {s}")))
        .transpose()
}

impl PlaceResult {
    pub fn from_place(place: &Place) -> Self {
        Self {
            id: place.id().0,
            name: place.name().to_string(),
            lat: place.coordinate().lat(),
            lon: place.coordinate().lon(),
        }
    }

    pub fn from_summary(summary: &PlaceSummary) -> Self {
        Self {
            id: summary.id.0,
            name: summary.name.clone(),
            lat: summary.coordinate.lat(),
            lon: summary.coordinate.lon(),
        }
    }
}

impl From<GraphStats> for GraphStatsResponse {
    fn from(stats: GraphStats) -> Self {
        Self {
            places: stats.places,
            connections: stats.connections,
            by_carrier: stats.by_carrier,
        }
    }
}

impl LegResult {
    pub fn from_leg(leg: &RouteLeg) -> Self {
        Self {
            from: PlaceResult::from_summary(&leg.from),
            to: PlaceResult::from_summary(&leg.to),
            price: leg.price,
            carrier: leg.carrier.clone(),
            departure: format_time(&leg.departure),
            arrival: format_time(&leg.arrival),
            duration_mins: leg.duration().num_minutes(),
        }
    }
}

impl RouteResult {
    pub fn from_route(route: &Route) -> Self {
        Self {
            legs: route.legs().iter().map(LegResult::from_leg).collect(),
            total_price: route.total_price(),
            hops: route.hops(),
            departure: format_time(&route.departure()),
            arrival: format_time(&route.arrival()),
            layovers_mins: route.layovers().iter().map(|d| d.num_minutes()).collect(),
        }
    }
}

fn format_time(time: &NaiveDateTime) -> String {
    time.format("%Y-%m-%dT%H:%M:%S").to_string()
}
