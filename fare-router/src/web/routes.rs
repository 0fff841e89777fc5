//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::cache::PlanError;
use crate::domain::{Coordinate, PlaceId};
use crate::planner::{resolve_place, SearchError, SearchRequest};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/places/nearest", get(nearest_place))
        .route("/graph/stats", get(graph_stats))
        .route("/route/plan", post(plan_route))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Find the known place nearest a coordinate.
async fn nearest_place(
    State(state): State<AppState>,
    Query(query): Query<NearestPlaceQuery>,
) -> Result<Json<NearestPlaceResponse>, AppError> {
    let coordinate = Coordinate::new(query.lat, query.lon).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;
    let radius_km = check_radius(query.radius_km.unwrap_or(state.match_radius_km))?;

    let place = state
        .graph()
        .closest(coordinate, radius_km)
        .ok_or_else(|| AppError::NotFound {
            message: format!("No place within {radius_km} km of {coordinate}"),
        })?;

    Ok(Json(NearestPlaceResponse {
        distance_km: place.coordinate().distance_km(&coordinate),
        place: PlaceResult::from_place(place),
    }))
}

/// Place and connection counts.
async fn graph_stats(State(state): State<AppState>) -> Json<GraphStatsResponse> {
    Json(state.graph().stats().into())
}

/// Plan the cheapest route between two endpoints.
async fn plan_route(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PlanRouteResponse>, AppError> {
    // Parse JSON manually so we can log the body on failure
    let req: PlanRouteRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, body = %String::from_utf8_lossy(&body), "Invalid plan request");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;

    let constraints = req
        .constraints(&state.defaults)
        .map_err(|message| AppError::BadRequest { message })?;
    let radius_km = check_radius(req.radius_km.unwrap_or(state.match_radius_km))?;

    let origin = resolve_endpoint(&state, &req.origin, radius_km)?;
    let destination = resolve_endpoint(&state, &req.destination, radius_km)?;

    let result = state
        .planner
        .plan(SearchRequest::new(origin, destination), constraints)
        .await?;

    let route = result
        .itinerary
        .as_ref()
        .map(|itinerary| state.graph().resolve(itinerary))
        .transpose()
        .map_err(|e| AppError::Internal {
            message: e.to_string(),
        })?;

    info!(
        %origin,
        %destination,
        found = route.is_some(),
        price = route.as_ref().map(|r| r.total_price()),
        branches = result.branches_explored,
        "Planned route"
    );

    Ok(Json(PlanRouteResponse {
        route: route.as_ref().map(RouteResult::from_route),
        branches_explored: result.branches_explored,
    }))
}

/// Map a request endpoint onto a place of the graph.
fn resolve_endpoint(
    state: &AppState,
    endpoint: &Endpoint,
    radius_km: f64,
) -> Result<PlaceId, AppError> {
    let coordinate = endpoint
        .coordinate(&state.landmarks)
        .map_err(|message| AppError::BadRequest { message })?;

    Ok(resolve_place(state.graph(), coordinate, radius_km)?)
}

fn check_radius(radius_km: f64) -> Result<f64, AppError> {
    if radius_km.is_finite() && radius_km >= 0.0 {
        Ok(radius_km)
    } else {
        Err(AppError::BadRequest {
            message: format!("radius_km must be a non-negative number, got {radius_km}"),
        })
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Unavailable { message: String },
    Internal { message: String },
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::InvalidRequest(msg) => AppError::BadRequest { message: msg },
            SearchError::NoPlaceNear { .. } => AppError::NotFound {
                message: e.to_string(),
            },
            SearchError::Timeout => AppError::Unavailable {
                message: e.to_string(),
            },
        }
    }
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::Search(e) => e.into(),
            PlanError::Worker(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Unavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
