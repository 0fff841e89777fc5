//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedPlanner;
use crate::graph::Graph;
use crate::landmarks::Landmarks;
use crate::planner::SearchConstraints;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Cached route planner over the loaded graph
    pub planner: Arc<CachedPlanner>,

    /// Named endpoints accepted in place of coordinates
    pub landmarks: Arc<Landmarks>,

    /// Constraints used where a request leaves a field unset
    pub defaults: Arc<SearchConstraints>,

    /// Radius for matching coordinates to places
    pub match_radius_km: f64,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        planner: CachedPlanner,
        landmarks: Landmarks,
        defaults: SearchConstraints,
        match_radius_km: f64,
    ) -> Self {
        Self {
            planner: Arc::new(planner),
            landmarks: Arc::new(landmarks),
            defaults: Arc::new(defaults),
            match_radius_km,
        }
    }

    /// The graph searches run against.
    pub fn graph(&self) -> &Graph {
        self.planner.graph()
    }
}
