//! Daily climate records as returned by NASA POWER

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

/// Compact date key format used by the POWER API (`YYYYMMDD`)
pub const DATE_KEY_FORMAT: &str = "%Y%m%d";

/// Header of the date column
pub const DATE_COLUMN: &str = "Data";

/// The eleven daily variables requested from POWER, in table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
pub enum ClimateVariable {
    Precipitation,
    RelativeHumidity,
    MeanTemperature,
    MaxTemperature,
    MinTemperature,
    DewPoint,
    MeanWindSpeed,
    MaxWindSpeed,
    MinWindSpeed,
    SolarRadiation,
    ClearSkySolarRadiation,
}

impl ClimateVariable {
    /// All variables in column order
    pub fn all() -> impl Iterator<Item = ClimateVariable> {
        Self::iter()
    }

    /// Parameter code understood by the POWER API
    #[must_use]
    pub fn power_code(self) -> &'static str {
        match self {
            Self::Precipitation => "PRECTOTCORR",
            Self::RelativeHumidity => "RH2M",
            Self::MeanTemperature => "T2M",
            Self::MaxTemperature => "T2M_MAX",
            Self::MinTemperature => "T2M_MIN",
            Self::DewPoint => "T2MDEW",
            Self::MeanWindSpeed => "WS2M",
            Self::MaxWindSpeed => "WS2M_MAX",
            Self::MinWindSpeed => "WS2M_MIN",
            Self::SolarRadiation => "ALLSKY_SFC_SW_DWN",
            Self::ClearSkySolarRadiation => "CLRSKY_SFC_SW_DWN",
        }
    }

    /// Short column name used in the table and the workbook
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Precipitation => "P",
            Self::RelativeHumidity => "UR",
            Self::MeanTemperature => "Tmed",
            Self::MaxTemperature => "Tmax",
            Self::MinTemperature => "Tmin",
            Self::DewPoint => "Tdew",
            Self::MeanWindSpeed => "U2",
            Self::MaxWindSpeed => "U2max",
            Self::MinWindSpeed => "U2min",
            Self::SolarRadiation => "Qg",
            Self::ClearSkySolarRadiation => "Qo",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Precipitation => "Precipitação acumulada (mm)",
            Self::RelativeHumidity => "Umidade relativa ao nível de 2 metros (%)",
            Self::MeanTemperature => "Temperatura média diária (°C)",
            Self::MaxTemperature => "Temperatura máxima diária (°C)",
            Self::MinTemperature => "Temperatura mínima diária (°C)",
            Self::DewPoint => "Temperatura do ponto de orvalho ao nível de 2 metros (°C)",
            Self::MeanWindSpeed => "Velocidade média do vento a 2 metros (m/s)",
            Self::MaxWindSpeed => "Velocidade máxima do vento a 2 metros (m/s)",
            Self::MinWindSpeed => "Velocidade mínima do vento a 2 metros (m/s)",
            Self::SolarRadiation => "Radiação solar incidente na superfície terrestre (W/m²)",
            Self::ClearSkySolarRadiation => "Radiação solar em condições de céu claro (W/m²)",
        }
    }

    /// Comma-joined parameter list for the POWER `parameters` query field
    #[must_use]
    pub fn power_parameter_list() -> String {
        Self::all()
            .map(ClimateVariable::power_code)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// One day of climate observations for a single point
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClimateRecord {
    pub date: NaiveDate,
    /// Corrected precipitation, mm/day
    pub precipitation: f64,
    /// Relative humidity at 2 m, %
    pub relative_humidity: f64,
    /// Temperature at 2 m, °C
    pub mean_temperature: f64,
    pub max_temperature: f64,
    pub min_temperature: f64,
    /// Dew/frost point at 2 m, °C
    pub dew_point: f64,
    /// Wind speed at 2 m, m/s
    pub mean_wind_speed: f64,
    pub max_wind_speed: f64,
    pub min_wind_speed: f64,
    /// All-sky surface shortwave downward irradiance
    pub solar_radiation: f64,
    /// Clear-sky surface shortwave downward irradiance
    pub clear_sky_solar_radiation: f64,
}

impl ClimateRecord {
    #[must_use]
    pub fn value(&self, variable: ClimateVariable) -> f64 {
        match variable {
            ClimateVariable::Precipitation => self.precipitation,
            ClimateVariable::RelativeHumidity => self.relative_humidity,
            ClimateVariable::MeanTemperature => self.mean_temperature,
            ClimateVariable::MaxTemperature => self.max_temperature,
            ClimateVariable::MinTemperature => self.min_temperature,
            ClimateVariable::DewPoint => self.dew_point,
            ClimateVariable::MeanWindSpeed => self.mean_wind_speed,
            ClimateVariable::MaxWindSpeed => self.max_wind_speed,
            ClimateVariable::MinWindSpeed => self.min_wind_speed,
            ClimateVariable::SolarRadiation => self.solar_radiation,
            ClimateVariable::ClearSkySolarRadiation => self.clear_sky_solar_radiation,
        }
    }

    /// Values in column order
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        ClimateVariable::all().map(|variable| self.value(variable))
    }

    /// Date as the `YYYYMMDD` key the service uses
    #[must_use]
    pub fn date_key(&self) -> String {
        self.date.format(DATE_KEY_FORMAT).to_string()
    }

    /// Table header: the date column followed by every variable column
    #[must_use]
    pub fn header() -> Vec<&'static str> {
        std::iter::once(DATE_COLUMN)
            .chain(ClimateVariable::all().map(ClimateVariable::column))
            .collect()
    }
}
