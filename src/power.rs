//! NASA POWER daily point client
//!
//! Issues a single request for the eleven daily variables at one coordinate
//! and reshapes the per-parameter date maps into one record per day.

use crate::config::PowerConfig;
use crate::models::{ClimateRecord, ClimateVariable, Coordinate, DATE_KEY_FORMAT};
use crate::{ClimaError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Name used for this service in errors and logs
pub const SERVICE_NAME: &str = "NASA POWER";

/// Anything that can produce daily climate records for a point
#[async_trait]
pub trait ClimateSource: Send + Sync {
    /// Fetch daily records; `start` and `end` are `YYYYMMDD` keys
    async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        start: &str,
        end: &str,
    ) -> Result<Vec<ClimateRecord>>;
}

/// `{"properties": {"parameter": {"T2M": {"20200101": 25.1, ...}, ...}}}`
#[derive(Debug, Deserialize)]
pub struct PowerResponse {
    pub properties: Option<PowerProperties>,
}

#[derive(Debug, Deserialize)]
pub struct PowerProperties {
    pub parameter: Option<HashMap<String, BTreeMap<String, f64>>>,
}

/// HTTP client for the POWER daily point endpoint
pub struct PowerClient {
    client: Client,
    base_url: String,
    community: String,
}

impl PowerClient {
    pub fn new(config: &PowerConfig) -> Result<Self> {
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
            base_url: config.base_url.clone(),
            community: config.community.clone(),
        })
    }

    /// Full request URL for a point and period
    #[must_use]
    pub fn request_url(&self, latitude: f64, longitude: f64, start: &str, end: &str) -> String {
        format!(
            "{}?parameters={}&community={}&longitude={}&latitude={}&start={}&end={}&format=JSON",
            self.base_url,
            ClimateVariable::power_parameter_list(),
            self.community,
            longitude,
            latitude,
            start,
            end
        )
    }
}

#[async_trait]
impl ClimateSource for PowerClient {
    #[instrument(skip(self))]
    async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        start: &str,
        end: &str,
    ) -> Result<Vec<ClimateRecord>> {
        Coordinate::checked(latitude, longitude)?;
        validate_date_key(start)?;
        validate_date_key(end)?;

        info!(
            "Fetching POWER daily data for {:.4}, {:.4} from {} to {}",
            latitude, longitude, start, end
        );
        let start_time = Instant::now();

        let url = self.request_url(latitude, longitude, start, end);
        debug!("POWER request URL: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("POWER request failed with HTTP {}", status);
            return Err(ClimaError::upstream(SERVICE_NAME, status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: PowerResponse = serde_json::from_str(&body)
            .map_err(|e| ClimaError::malformed(SERVICE_NAME, e.to_string()))?;
        let records = records_from_response(parsed)?;

        info!(
            "Retrieved {} daily records in {:.3}s",
            records.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(records)
    }
}

/// Reshape the POWER parameter maps into one record per day.
///
/// The mean-temperature series decides which days exist; every other series
/// must carry a value for each of those days.
pub fn records_from_response(response: PowerResponse) -> Result<Vec<ClimateRecord>> {
    let parameters = response
        .properties
        .and_then(|properties| properties.parameter)
        .ok_or_else(|| ClimaError::malformed(SERVICE_NAME, "missing properties.parameter"))?;

    let index = series(&parameters, ClimateVariable::MeanTemperature)?;
    let mut records = Vec::with_capacity(index.len());

    for key in index.keys() {
        let date = NaiveDate::parse_from_str(key, DATE_KEY_FORMAT).map_err(|_| {
            ClimaError::malformed(SERVICE_NAME, format!("invalid date key {key}"))
        })?;

        let value = |variable: ClimateVariable| -> Result<f64> {
            series(&parameters, variable)?.get(key).copied().ok_or_else(|| {
                ClimaError::malformed(
                    SERVICE_NAME,
                    format!("{} has no value for {key}", variable.power_code()),
                )
            })
        };

        records.push(ClimateRecord {
            date,
            precipitation: value(ClimateVariable::Precipitation)?,
            relative_humidity: value(ClimateVariable::RelativeHumidity)?,
            mean_temperature: value(ClimateVariable::MeanTemperature)?,
            max_temperature: value(ClimateVariable::MaxTemperature)?,
            min_temperature: value(ClimateVariable::MinTemperature)?,
            dew_point: value(ClimateVariable::DewPoint)?,
            mean_wind_speed: value(ClimateVariable::MeanWindSpeed)?,
            max_wind_speed: value(ClimateVariable::MaxWindSpeed)?,
            min_wind_speed: value(ClimateVariable::MinWindSpeed)?,
            solar_radiation: value(ClimateVariable::SolarRadiation)?,
            clear_sky_solar_radiation: value(ClimateVariable::ClearSkySolarRadiation)?,
        });
    }

    Ok(records)
}

fn series(
    parameters: &HashMap<String, BTreeMap<String, f64>>,
    variable: ClimateVariable,
) -> Result<&BTreeMap<String, f64>> {
    parameters.get(variable.power_code()).ok_or_else(|| {
        ClimaError::malformed(
            SERVICE_NAME,
            format!("missing parameter {}", variable.power_code()),
        )
    })
}

fn validate_date_key(key: &str) -> Result<()> {
    if key.len() != 8 || !key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClimaError::validation(format!(
            "date {key} must be formatted as YYYYMMDD"
        )));
    }
    Ok(())
}
