//! Coordinate model for the point being queried

use serde::{Deserialize, Serialize};

use crate::{ClimaError, Result};

/// Latitude shown in the form before anything else is known (São Carlos, SP)
pub const DEFAULT_LATITUDE: f64 = -21.7946;
/// Longitude shown in the form before anything else is known
pub const DEFAULT_LONGITUDE: f64 = -48.1766;

/// A point on the globe in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees, [-90, 90]
    pub latitude: f64,
    /// Longitude in decimal degrees, [-180, 180]
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate without checking its range
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create a coordinate, rejecting non-finite or out-of-range values
    pub fn checked(latitude: f64, longitude: f64) -> Result<Self> {
        let coordinate = Self::new(latitude, longitude);
        coordinate.validate()?;
        Ok(coordinate)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ClimaError::validation(format!(
                "a latitude {} deve estar entre -90 e 90",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ClimaError::validation(format!(
                "a longitude {} deve estar entre -180 e 180",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Parse the `"<lat>,<lon>"` form used by IP geolocation services
    pub fn parse_pair(text: &str) -> Result<Self> {
        let (lat, lon) = text
            .split_once(',')
            .ok_or_else(|| ClimaError::validation(format!("par de coordenadas inválido: {text}")))?;

        let latitude: f64 = lat
            .trim()
            .parse()
            .map_err(|_| ClimaError::validation(format!("latitude inválida: {lat}")))?;
        let longitude: f64 = lon
            .trim()
            .parse()
            .map_err(|_| ClimaError::validation(format!("longitude inválida: {lon}")))?;

        Self::checked(latitude, longitude)
    }

    /// Format as the form shows it, six decimal places
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE)
    }
}
