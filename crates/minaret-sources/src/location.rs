use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use minaret_core::types::Location;

use crate::error::{Result, SourceError};

/// Default geolocation endpoint (ip-api.com JSON shape).
pub const DEFAULT_GEO_BASE_URL: &str = "http://ip-api.com";

/// Resolves the coordinates the prayer-times lookup should use.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn resolve(&self) -> Result<Location>;
}

/// Coordinates pinned in configuration; never touches the network.
pub struct FixedLocation {
    location: Location,
}

impl FixedLocation {
    pub fn new(location: Location) -> Self {
        Self { location }
    }
}

#[async_trait]
impl LocationSource for FixedLocation {
    async fn resolve(&self) -> Result<Location> {
        Ok(self.location.clone())
    }
}

/// IP-based geolocation against an ip-api.com style JSON endpoint.
pub struct IpLocator {
    client: reqwest::Client,
    base_url: String,
}

impl IpLocator {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_GEO_BASE_URL.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

#[async_trait]
impl LocationSource for IpLocator {
    async fn resolve(&self) -> Result<Location> {
        let url = format!("{}/json", self.base_url);
        debug!(%url, "resolving location from IP");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::LocationUnavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(SourceError::LocationUnavailable(format!(
                "geolocation endpoint returned {}",
                resp.status()
            )));
        }

        let geo: GeoResponse = resp
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        let location = location_from_geo(geo)?;
        info!(location = %location.describe(), "location resolved");
        Ok(location)
    }
}

fn location_from_geo(geo: GeoResponse) -> Result<Location> {
    if geo.status != "success" {
        return Err(SourceError::LocationUnavailable(
            geo.message
                .unwrap_or_else(|| "provider reported failure".to_string()),
        ));
    }
    let (Some(latitude), Some(longitude)) = (geo.lat, geo.lon) else {
        return Err(SourceError::LocationUnavailable(
            "response missing coordinates".to_string(),
        ));
    };
    Ok(Location {
        latitude,
        longitude,
        city: geo.city,
        country: geo.country,
    })
}
