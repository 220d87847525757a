//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::error::Error;
use crate::estimator::{EstimatorStatus, TravelEstimate};
use crate::geo::Coordinates;
use crate::queue::QueueState;
use crate::routing::RoutingBackend;
use crate::server::state::AppState;
use crate::traffic::{smart_traffic_weight, HolidayCalendar};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Create the API router
pub fn create_router<B: RoutingBackend>(state: Arc<AppState<B>>) -> Router {
    Router::new()
        .route("/api/travel-time", get(travel_time_handler::<B>))
        .route("/api/traffic-weight", get(traffic_weight_handler::<B>))
        .route("/api/status", get(status_handler::<B>))
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::InvalidEstimate(_) => "INVALID_ESTIMATE",
            Error::Config(_) => "CONFIG_ERROR",
            _ => "INTERNAL_ERROR",
        };
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
        }
    }
}

/// Travel time query string
#[derive(Debug, Deserialize)]
pub struct TravelTimeQuery {
    pub dest_lat: Option<f64>,
    pub dest_lng: Option<f64>,
    pub origin_lat: Option<f64>,
    pub origin_lng: Option<f64>,
}

/// Travel time response
///
/// `travel_time` is null when no destination was given.
#[derive(Debug, Serialize, Deserialize)]
pub struct TravelTimeResponse {
    pub travel_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<TravelEstimate>,
}

/// Estimate travel time
///
/// GET /api/travel-time?dest_lat=..&dest_lng=..[&origin_lat=..&origin_lng=..]
async fn travel_time_handler<B: RoutingBackend>(
    State(state): State<Arc<AppState<B>>>,
    Query(query): Query<TravelTimeQuery>,
) -> Result<Json<TravelTimeResponse>, ApiError> {
    let destination = Coordinates::from_parts(query.dest_lat, query.dest_lng);
    let origin = Coordinates::from_parts(query.origin_lat, query.origin_lng);

    // Out-of-range input is a client mistake; missing input just yields null.
    for point in destination.iter().chain(origin.iter()) {
        point.validate().map_err(ApiError::from)?;
    }

    let estimate = state.estimator.estimate_detailed(destination, origin).await;

    Ok(Json(TravelTimeResponse {
        travel_time: estimate.as_ref().map(|e| e.formatted.clone()),
        estimate,
    }))
}

/// Traffic weight query string
#[derive(Debug, Deserialize)]
pub struct TrafficWeightQuery {
    pub distance_km: Option<f64>,
}

/// Traffic weight response
#[derive(Debug, Serialize, Deserialize)]
pub struct TrafficWeightResponse {
    pub weight: f64,

    /// Local time the weight was evaluated at
    pub at: String,

    /// Whether the holiday calendar covers the current year
    pub calendar_covered: bool,
}

/// Current traffic multiplier
///
/// GET /api/traffic-weight[?distance_km=..]
async fn traffic_weight_handler<B: RoutingBackend>(
    State(state): State<Arc<AppState<B>>>,
    Query(query): Query<TrafficWeightQuery>,
) -> Result<Json<TrafficWeightResponse>, ApiError> {
    if let Some(d) = query.distance_km {
        if !d.is_finite() || d < 0.0 {
            return Err(ApiError {
                error: format!("Distance {} must be a non-negative number", d),
                code: "INVALID_DISTANCE".to_string(),
            });
        }
    }

    let clock = state.estimator.clock();
    let now = clock.now_local();

    Ok(Json(TrafficWeightResponse {
        weight: smart_traffic_weight(clock, query.distance_km),
        at: now.format("%Y-%m-%dT%H:%M:%S").to_string(),
        calendar_covered: HolidayCalendar::taiwan().covers(now.year()),
    }))
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Routing backend name
    pub backend: String,
    pub rate_limited: bool,
    pub queue_state: QueueState,
    pub queue_len: usize,
    pub in_flight: usize,
    pub cache_entries: usize,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler<B: RoutingBackend>(
    State(state): State<Arc<AppState<B>>>,
) -> Json<StatusResponse> {
    let EstimatorStatus {
        rate_limited,
        queue_state,
        queue_len,
        in_flight,
        cache_entries,
    } = state.estimator.status();

    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.estimator.backend().name().to_string(),
        rate_limited,
        queue_state,
        queue_len,
        in_flight,
        cache_entries,
        uptime_secs: state.uptime_secs(),
    })
}
