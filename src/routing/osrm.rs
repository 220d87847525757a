//! OSRM routing backend
//!
//! Calls the `route/v1/driving` endpoint of an OSRM-compatible server.
//! The public demo server enforces an undocumented per-client rate limit and
//! answers HTTP 429 when it is exceeded; there is no key to buy more quota.

use crate::constants::api::USER_AGENT;
use crate::error::{Error, Result};
use crate::geo::Coordinates;
use crate::routing::{RouteEstimate, RoutingBackend};
use reqwest::StatusCode;
use serde::Deserialize;

/// OSRM routing backend
#[derive(Debug, Clone)]
pub struct OsrmBackend {
    client: reqwest::Client,
    base_url: String,
}

/// OSRM route response
///
/// Example: `{"code": "Ok", "routes": [{"duration": 6120.4, "distance": 152030.1}]}`
#[derive(Debug, Deserialize)]
struct OsrmResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Seconds
    duration: f64,
    /// Meters
    #[serde(default)]
    distance: Option<f64>,
}

impl OsrmBackend {
    /// Create a backend for the server at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the route URL; OSRM takes lng,lat order
    fn route_url(&self, origin: Coordinates, destination: Coordinates) -> String {
        format!(
            "{}/route/v1/driving/{},{};{},{}?overview=false",
            self.base_url, origin.lng, origin.lat, destination.lng, destination.lat
        )
    }

    fn parse_route(response: OsrmResponse) -> Result<RouteEstimate> {
        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| Error::Routing("No route found".to_string()))?;

        Ok(RouteEstimate::remote(
            route.duration,
            route.distance.map(|meters| meters / 1000.0),
        ))
    }
}

impl RoutingBackend for OsrmBackend {
    fn name(&self) -> &'static str {
        "osrm"
    }

    async fn route(&self, origin: Coordinates, destination: Coordinates) -> Result<RouteEstimate> {
        let url = self.route_url(origin, destination);

        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited);
        }

        if !response.status().is_success() {
            return Err(Error::Routing(format!(
                "OSRM returned status: {}",
                response.status()
            )));
        }

        let body: OsrmResponse = response
            .json()
            .await
            .map_err(|e| Error::Routing(format!("Failed to parse OSRM response: {}", e)))?;

        Self::parse_route(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use axum::extract::{Path, RawQuery};
    use axum::http::StatusCode as HttpStatus;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    /// Spawn a local OSRM stand-in that always answers with `status` and `body`
    async fn spawn_stub(
        status: HttpStatus,
        body: serde_json::Value,
    ) -> (String, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);

        let app = Router::new().route(
            "/route/v1/driving/:coords",
            get(move |Path(coords): Path<String>, RawQuery(query): RawQuery| {
                let body = body.clone();
                let recorder = Arc::clone(&recorder);
                async move {
                    recorder
                        .lock()
                        .unwrap()
                        .push(format!("{}?{}", coords, query.unwrap_or_default()));
                    (status, Json(body))
                }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), seen)
    }

    fn origin() -> Coordinates {
        Coordinates::new(25.0621, 121.1963)
    }

    fn dest() -> Coordinates {
        Coordinates::new(24.0, 121.5)
    }

    #[test]
    fn test_route_url_uses_lng_lat_order() {
        let backend = OsrmBackend::new("https://router.example.org/").unwrap();
        assert_eq!(
            backend.route_url(origin(), dest()),
            "https://router.example.org/route/v1/driving/121.1963,25.0621;121.5,24?overview=false"
        );
    }

    #[test]
    fn test_parse_route_converts_meters() {
        let body: OsrmResponse =
            serde_json::from_str(r#"{"code":"Ok","routes":[{"duration":6120.5,"distance":152030.0}]}"#)
                .unwrap();
        let estimate = OsrmBackend::parse_route(body).unwrap();

        assert_eq!(estimate.duration_secs, 6120.5);
        assert_relative_eq!(estimate.distance_km.unwrap(), 152.03, epsilon = 1e-9);
    }

    #[test]
    fn test_parse_route_without_distance() {
        let body: OsrmResponse = serde_json::from_str(r#"{"routes":[{"duration":60.0}]}"#).unwrap();
        let estimate = OsrmBackend::parse_route(body).unwrap();
        assert!(estimate.distance_km.is_none());
    }

    #[test]
    fn test_parse_route_empty() {
        let body: OsrmResponse = serde_json::from_str(r#"{"code":"NoRoute"}"#).unwrap();
        assert!(matches!(OsrmBackend::parse_route(body), Err(Error::Routing(_))));
    }

    #[tokio::test]
    async fn test_route_success() {
        let (url, seen) = spawn_stub(
            HttpStatus::OK,
            serde_json::json!({"code": "Ok", "routes": [{"duration": 7200.0, "distance": 150000.0}]}),
        )
        .await;
        let backend = OsrmBackend::new(url).unwrap();

        let estimate = backend.route(origin(), dest()).await.unwrap();

        assert_eq!(estimate.duration_secs, 7200.0);
        assert_eq!(estimate.distance_km, Some(150.0));
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            ["121.1963,25.0621;121.5,24?overview=false"]
        );
    }

    #[tokio::test]
    async fn test_route_rate_limited() {
        let (url, _) = spawn_stub(
            HttpStatus::TOO_MANY_REQUESTS,
            serde_json::json!({"message": "Too Many Requests"}),
        )
        .await;
        let backend = OsrmBackend::new(url).unwrap();

        let result = backend.route(origin(), dest()).await;
        assert!(matches!(result, Err(Error::RateLimited)));
    }

    #[tokio::test]
    async fn test_route_server_error() {
        let (url, _) = spawn_stub(HttpStatus::INTERNAL_SERVER_ERROR, serde_json::json!({})).await;
        let backend = OsrmBackend::new(url).unwrap();

        let result = backend.route(origin(), dest()).await;
        assert!(matches!(result, Err(Error::Routing(_))));
    }

    #[tokio::test]
    async fn test_route_no_routes() {
        let (url, _) = spawn_stub(HttpStatus::OK, serde_json::json!({"code": "NoRoute", "routes": []})).await;
        let backend = OsrmBackend::new(url).unwrap();

        let result = backend.route(origin(), dest()).await;
        assert!(matches!(result, Err(Error::Routing(_))));
    }
}
