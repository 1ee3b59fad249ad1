//! Run configuration for the interpolation engine.

use crate::interpolation::error::ConfigurationError;
use crate::interpolation::idw::validate_power;
use crate::types::date_range::DateRange;
use crate::types::parameter::Parameter;
use bon::Builder;
use serde::{Deserialize, Serialize};

/// Number of nearest stations used for solar radiation.
pub const DEFAULT_SOLAR_STATION_COUNT: usize = 3;

/// Order of stations that sit at exactly the same distance from a target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Ascending station id.
    #[default]
    StationId,
    /// Order in which the stations were handed to the engine.
    InputOrder,
}

/// Settings of one interpolation run.
///
/// Passed explicitly into [`crate::InterpolationEngine::new`]; nothing is read from
/// global state.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use swat_meteo::{DateRange, InterpolationConfig, Parameter};
///
/// let config = InterpolationConfig::builder()
///     .radius_km(30.0)
///     .apply_richter(true)
///     .date_range(DateRange::new(
///         NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
///         NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
///     )?)
///     .build();
///
/// assert_eq!(config.power, 2.0);
/// assert_eq!(config.solar_station_count, 3);
/// assert_eq!(config.parameters, Parameter::SWAT_INPUTS.to_vec());
/// assert!(config.validate().is_ok());
/// # Ok::<(), swat_meteo::ConfigurationError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct InterpolationConfig {
    /// Search radius for radius-selected parameters, in km.
    pub radius_km: f64,
    /// IDW distance exponent.
    #[builder(default = 2.0)]
    #[serde(default = "default_power")]
    pub power: f64,
    /// Correct precipitation with the Richter model before interpolating.
    #[builder(default)]
    #[serde(default)]
    pub apply_richter: bool,
    /// Days to interpolate.
    pub date_range: DateRange,
    /// Number of nearest stations used for solar radiation.
    #[builder(default = DEFAULT_SOLAR_STATION_COUNT)]
    #[serde(default = "default_solar_station_count")]
    pub solar_station_count: usize,
    /// Parameters to interpolate, in output order.
    #[builder(default = Parameter::SWAT_INPUTS.to_vec())]
    #[serde(default = "default_parameters")]
    pub parameters: Vec<Parameter>,
    #[builder(default)]
    #[serde(default)]
    pub tie_break: TieBreak,
}

fn default_power() -> f64 {
    2.0
}
fn default_solar_station_count() -> usize {
    DEFAULT_SOLAR_STATION_COUNT
}
fn default_parameters() -> Vec<Parameter> {
    Parameter::SWAT_INPUTS.to_vec()
}

impl InterpolationConfig {
    /// Validates this configuration.
    ///
    /// Returns an error if the power is not positive, the radius is negative or
    /// not finite, the solar station count is zero, no parameter is selected, a
    /// parameter is listed twice, or the date range is reversed.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        validate_power(self.power)?;
        if !self.radius_km.is_finite() || self.radius_km < 0.0 {
            return Err(ConfigurationError::InvalidRadius(self.radius_km));
        }
        if self.solar_station_count == 0 {
            return Err(ConfigurationError::InvalidSolarStationCount);
        }
        if self.parameters.is_empty() {
            return Err(ConfigurationError::NoParameters);
        }
        for (i, parameter) in self.parameters.iter().enumerate() {
            if self.parameters[..i].contains(parameter) {
                return Err(ConfigurationError::DuplicateParameter(*parameter));
            }
        }
        // Deserialized ranges skip the constructor check.
        DateRange::new(self.date_range.start(), self.date_range.end())?;
        Ok(())
    }
}
