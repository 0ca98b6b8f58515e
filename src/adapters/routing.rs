use crate::config::toml_config::RoutingConfig;
use crate::domain::model::{GeoPoint, Route};
use crate::domain::ports::RoutingService;
use crate::utils::error::{FinderError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_PROFILE: &str = "driving";

#[derive(Deserialize, Debug)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Deserialize, Debug)]
struct DirectionsRoute {
    geometry: LineString,
    distance: Option<f64>,
    duration: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct LineString {
    coordinates: Vec<[f64; 2]>,
}

// Directions API error body, e.g. {"code": "NoRoute", "message": "..."}
#[derive(Deserialize, Debug)]
struct DirectionsErrorPayload {
    code: Option<String>,
    message: String,
}

pub struct RouteClient {
    client: Client,
    base_url: String,
    profile: String,
    access_token: Option<String>,
}

impl RouteClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            profile: DEFAULT_PROFILE.to_string(),
            access_token: None,
        })
    }

    pub fn from_config(config: &RoutingConfig) -> Result<Self> {
        let mut client = Self::new(config.endpoint.clone(), config.timeout())?
            .with_profile(config.profile());
        client.access_token = config.access_token.clone();
        Ok(client)
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn directions_url(&self, origin: GeoPoint, destination: GeoPoint) -> String {
        // 座標順序為 經度,緯度
        format!(
            "{}/{}/{:.6},{:.6};{:.6},{:.6}",
            self.base_url.trim_end_matches('/'),
            self.profile,
            origin.longitude(),
            origin.latitude(),
            destination.longitude(),
            destination.latitude()
        )
    }

    fn parse_route(body: &str) -> Result<Route> {
        let response: DirectionsResponse = serde_json::from_str(body).map_err(|e| {
            tracing::error!("Failed to parse directions response: {}. Body: {}", e, body);
            FinderError::routing(format!("malformed response: {}", e))
        })?;

        let primary = response
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| FinderError::routing("no route found in success response"))?;

        if primary.geometry.coordinates.is_empty() {
            return Err(FinderError::routing("primary route has no geometry"));
        }

        let points = primary
            .geometry
            .coordinates
            .iter()
            .map(|&[lon, lat]| {
                GeoPoint::new(lat, lon)
                    .map_err(|e| FinderError::routing(format!("invalid route coordinate: {}", e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Route {
            points,
            distance_meters: primary.distance,
            duration_seconds: primary.duration,
        })
    }

    fn describe(&self, e: &reqwest::Error) -> FinderError {
        if e.is_timeout() {
            FinderError::routing("directions request timed out")
        } else {
            FinderError::routing(format!("directions request failed: {}", e))
        }
    }
}

#[async_trait]
impl RoutingService for RouteClient {
    async fn request_route(&self, origin: GeoPoint, destination: GeoPoint) -> Result<Route> {
        if origin == destination {
            tracing::debug!("Origin equals destination {}, returning single-point route", origin);
            return Ok(Route::single_point(origin));
        }

        let url = self.directions_url(origin, destination);
        tracing::debug!("Requesting {} route {} → {}", self.profile, origin, destination);

        let mut request = self.client.get(&url).query(&[
            ("geometries", "geojson"),
            ("alternatives", "false"),
            ("overview", "full"),
        ]);
        if let Some(token) = &self.access_token {
            request = request.query(&[("access_token", token.as_str())]);
        }

        let response = request.send().await.map_err(|e| self.describe(&e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.describe(&e))?;

        if !status.is_success() {
            if let Ok(payload) = serde_json::from_str::<DirectionsErrorPayload>(&body) {
                return Err(FinderError::routing(format!(
                    "API error ({}): {}",
                    payload.code.unwrap_or_else(|| status.to_string()),
                    payload.message
                )));
            }
            tracing::error!("Directions API returned {}. Unparseable body: {}", status, body);
            return Err(FinderError::routing(format!(
                "service returned status {}",
                status
            )));
        }

        Self::parse_route(&body)
    }
}
