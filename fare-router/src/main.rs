use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use fare_router::cache::{CacheConfig, CachedPlanner};
use fare_router::config::ServerConfig;
use fare_router::graph::{GeoMatcher, Graph};
use fare_router::ingest::{IngestReport, load_source};
use fare_router::landmarks::european_landmarks;
use fare_router::planner::SearchConstraints;
use fare_router::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fare_router=info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Fare router failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    let normalizer = config.normalizer()?;
    info!(
        reference = normalizer.reference(),
        currencies = normalizer.len(),
        "Loaded currency table"
    );

    // Build the graph once; it is read-only from here on
    let mut graph = Graph::with_matcher(GeoMatcher::new(config.match_radius_km));
    let mut total = IngestReport::default();
    for source in &config.sources {
        total += load_source(&mut graph, &normalizer, source)?;
    }
    if config.sources.is_empty() {
        warn!("No fare sources configured; set FARE_SOURCES=carrier=path,...");
    }

    let stats = graph.stats();
    info!(
        places = stats.places,
        connections = stats.connections,
        accepted = total.accepted,
        rejected = total.rejected,
        "Graph ready"
    );

    let planner = CachedPlanner::new(
        Arc::new(graph),
        &CacheConfig::default(),
        config.search_timeout,
    );
    let state = AppState::new(
        planner,
        european_landmarks(),
        SearchConstraints::default(),
        config.match_radius_km,
    );
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "Fare router listening");
    info!("  GET  /health         - Health check");
    info!("  GET  /places/nearest - Nearest known place");
    info!("  GET  /graph/stats    - Graph statistics");
    info!("  POST /route/plan     - Plan the cheapest route");

    axum::serve(listener, app).await?;
    Ok(())
}
