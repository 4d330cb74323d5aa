//! Location Resolution Module
//!
//! Approximates the caller's coordinate from its public IP address using an
//! ipinfo-style geolocation endpoint.

use crate::config::GeolocationConfig;
use crate::models::Coordinate;
use crate::{ClimaError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Name used for this service in errors and logs
pub const SERVICE_NAME: &str = "ipinfo";

/// Anything that can guess where the caller is
#[async_trait]
pub trait NetworkLocator: Send + Sync {
    async fn resolve_from_network(&self) -> Result<Coordinate>;
}

/// Subset of the ipinfo response we read
#[derive(Debug, Deserialize)]
pub struct IpInfoResponse {
    /// `"<lat>,<lon>"`
    pub loc: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl IpInfoResponse {
    pub fn coordinate(&self) -> Result<Coordinate> {
        let loc = self
            .loc
            .as_deref()
            .ok_or_else(|| ClimaError::malformed(SERVICE_NAME, "missing loc field"))?;
        Coordinate::parse_pair(loc).map_err(|e| ClimaError::malformed(SERVICE_NAME, e.to_string()))
    }
}

/// Service for resolving the caller's location
pub struct LocationResolver {
    client: Client,
    url: String,
}

impl LocationResolver {
    pub fn new(config: &GeolocationConfig) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("clima/", env!("CARGO_PKG_VERSION")));
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| ClimaError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl NetworkLocator for LocationResolver {
    #[instrument(skip(self))]
    async fn resolve_from_network(&self) -> Result<Coordinate> {
        debug!("Resolving location from network address via {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Geolocation request failed with HTTP {}", status);
            return Err(ClimaError::upstream(SERVICE_NAME, status.as_u16()));
        }

        let body = response.text().await?;
        let info: IpInfoResponse = serde_json::from_str(&body)
            .map_err(|e| ClimaError::malformed(SERVICE_NAME, e.to_string()))?;
        let coordinate = info.coordinate()?;

        info!(
            "Resolved location {} ({}, {})",
            coordinate.format_coordinates(),
            info.city.as_deref().unwrap_or("?"),
            info.country.as_deref().unwrap_or("?")
        );

        Ok(coordinate)
    }
}
