//! Caching layer for route searches.
//!
//! The graph never changes once the server is up, so a search result depends
//! only on its endpoints and constraints. Results are cached under that key;
//! failed searches (invalid requests, timeouts) are not cached.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::graph::Graph;
use crate::planner::{Planner, SearchConstraints, SearchError, SearchRequest, SearchResult};

/// Cache key for a search: endpoints plus every constraint field.
///
/// The price limit is keyed by its bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    request: SearchRequest,
    max_price_bits: u64,
    max_hops: usize,
    window_start: Option<NaiveDateTime>,
    window_end: Option<NaiveDateTime>,
    min_layover_mins: i64,
}

impl RouteKey {
    pub fn new(request: SearchRequest, constraints: &SearchConstraints) -> Self {
        Self {
            request,
            // -0.0 and 0.0 are the same limit
            max_price_bits: (constraints.max_price + 0.0).to_bits(),
            max_hops: constraints.max_hops,
            window_start: constraints.window_start,
            window_end: constraints.window_end,
            min_layover_mins: constraints.min_layover_mins,
        }
    }
}

/// Cached search result entry.
type RouteEntry = Arc<SearchResult>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
        }
    }
}

/// Cache for search results.
pub struct RouteCache {
    routes: MokaCache<RouteKey, RouteEntry>,
}

impl RouteCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { routes }
    }

    pub async fn get(&self, key: &RouteKey) -> Option<RouteEntry> {
        self.routes.get(key).await
    }

    pub async fn insert(&self, key: RouteKey, entry: RouteEntry) {
        self.routes.insert(key, entry).await;
    }

    /// Approximate entry count (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.routes.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.routes.invalidate_all();
    }
}

/// Error from a cached search.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Search(#[from] SearchError),

    /// The blocking search task panicked or was cancelled
    #[error("search worker failed: {0}")]
    Worker(String),
}

/// Route planner with caching.
///
/// Wraps a finished graph and caches search results. Searches run on tokio's
/// blocking pool since they are CPU-bound.
pub struct CachedPlanner {
    graph: Arc<Graph>,
    cache: RouteCache,
    timeout: Option<Duration>,
}

impl CachedPlanner {
    /// Create a new cached planner.
    ///
    /// `timeout` bounds each uncached search; `None` lets searches run to
    /// completion.
    pub fn new(graph: Arc<Graph>, cache_config: &CacheConfig, timeout: Option<Duration>) -> Self {
        Self {
            graph,
            cache: RouteCache::new(cache_config),
            timeout,
        }
    }

    /// Search for the cheapest itinerary, using the cache if available.
    pub async fn plan(
        &self,
        request: SearchRequest,
        constraints: SearchConstraints,
    ) -> Result<RouteEntry, PlanError> {
        let key = RouteKey::new(request, &constraints);

        if let Some(cached) = self.cache.get(&key).await {
            debug!(origin = %request.origin, destination = %request.destination, "Route cache hit");
            return Ok(cached);
        }

        let graph = Arc::clone(&self.graph);
        let timeout = self.timeout;
        let result = tokio::task::spawn_blocking(move || {
            let mut planner = Planner::new(&graph, &constraints);
            // A deadline past the clock's range is no deadline
            if let Some(deadline) = timeout.and_then(|t| Instant::now().checked_add(t)) {
                planner = planner.with_deadline(deadline);
            }
            planner.search(&request)
        })
        .await
        .map_err(|e| PlanError::Worker(e.to_string()))??;

        let entry = Arc::new(result);
        self.cache.insert(key, entry.clone()).await;

        Ok(entry)
    }

    /// The graph searches run against.
    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinate, PlaceId};
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn graph() -> Arc<Graph> {
        let mut g = Graph::new();
        let a = g.add(Coordinate::new(0.0, 0.0).unwrap(), "A");
        let b = g.add(Coordinate::new(1.0, 0.0).unwrap(), "B");
        g.add_edge(a, b, 42.0, "wizzair", at(1, 8), at(1, 10)).unwrap();
        Arc::new(g)
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.max_capacity, 1000);
    }

    #[test]
    fn keys_differ_by_constraints() {
        let request = SearchRequest::new(PlaceId(0), PlaceId(1));
        let defaults = SearchConstraints::default();
        let cheaper = SearchConstraints {
            max_price: 50.0,
            ..SearchConstraints::default()
        };
        let windowed = SearchConstraints {
            window_end: Some(at(5, 0)),
            ..SearchConstraints::default()
        };

        let key = RouteKey::new(request, &defaults);
        assert_eq!(key, RouteKey::new(request, &defaults));
        assert_ne!(key, RouteKey::new(request, &cheaper));
        assert_ne!(key, RouteKey::new(request, &windowed));
        assert_ne!(
            key,
            RouteKey::new(SearchRequest::new(PlaceId(1), PlaceId(0)), &defaults)
        );
    }

    #[test]
    fn signed_zero_price_limits_share_a_key() {
        let request = SearchRequest::new(PlaceId(0), PlaceId(1));
        let zero = SearchConstraints {
            max_price: 0.0,
            ..SearchConstraints::default()
        };
        let negative_zero = SearchConstraints {
            max_price: -0.0,
            ..SearchConstraints::default()
        };
        assert_eq!(RouteKey::new(request, &zero), RouteKey::new(request, &negative_zero));
    }

    #[tokio::test]
    async fn plan_caches_result() {
        let planner = CachedPlanner::new(graph(), &CacheConfig::default(), None);
        let request = SearchRequest::new(PlaceId(0), PlaceId(1));

        let first = planner
            .plan(request, SearchConstraints::default())
            .await
            .unwrap();
        assert_eq!(first.itinerary.as_ref().unwrap().price(), 42.0);

        let second = planner
            .plan(request, SearchConstraints::default())
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let planner = CachedPlanner::new(graph(), &CacheConfig::default(), None);
        let request = SearchRequest::new(PlaceId(0), PlaceId(9));

        let err = planner
            .plan(request, SearchConstraints::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PlanError::Search(SearchError::InvalidRequest(_))));

        let key = RouteKey::new(request, &SearchConstraints::default());
        assert!(planner.cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn zero_timeout_times_out() {
        let planner = CachedPlanner::new(graph(), &CacheConfig::default(), Some(Duration::ZERO));
        let request = SearchRequest::new(PlaceId(0), PlaceId(1));

        let err = planner
            .plan(request, SearchConstraints::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PlanError::Search(SearchError::Timeout)));
    }

    #[tokio::test]
    async fn unrepresentable_timeout_is_unbounded() {
        let planner = CachedPlanner::new(graph(), &CacheConfig::default(), Some(Duration::MAX));
        let request = SearchRequest::new(PlaceId(0), PlaceId(1));

        let result = planner
            .plan(request, SearchConstraints::default())
            .await
            .unwrap();
        assert!(result.itinerary.is_some());
    }

    #[tokio::test]
    async fn invalidate_drops_entries() {
        let planner = CachedPlanner::new(graph(), &CacheConfig::default(), None);
        let request = SearchRequest::new(PlaceId(0), PlaceId(1));
        let first = planner
            .plan(request, SearchConstraints::default())
            .await
            .unwrap();

        planner.invalidate_cache();
        let second = planner
            .plan(request, SearchConstraints::default())
            .await
            .unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
