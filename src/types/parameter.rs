//! The meteorological parameters handled by the interpolation pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A daily meteorological parameter.
///
/// The first six variants are the SWAT weather inputs. [`Parameter::TempMean`] is
/// auxiliary: it is not written to any output file, but when present it is the
/// temperature used to classify precipitation for the Richter correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    /// Daily precipitation sum in mm.
    Precipitation,
    /// Daily maximum air temperature in °C.
    TempMax,
    /// Daily minimum air temperature in °C.
    TempMin,
    /// Daily mean relative humidity.
    Humidity,
    /// Daily mean wind speed in m/s.
    Wind,
    /// Daily global solar radiation.
    Solar,
    /// Daily mean air temperature in °C.
    TempMean,
}

impl Parameter {
    /// Parameters interpolated when the configuration does not say otherwise.
    pub const SWAT_INPUTS: [Parameter; 6] = [
        Parameter::Precipitation,
        Parameter::TempMax,
        Parameter::TempMin,
        Parameter::Humidity,
        Parameter::Wind,
        Parameter::Solar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Parameter::Precipitation => "precipitation",
            Parameter::TempMax => "temp_max",
            Parameter::TempMin => "temp_min",
            Parameter::Humidity => "humidity",
            Parameter::Wind => "wind",
            Parameter::Solar => "solar",
            Parameter::TempMean => "temp_mean",
        }
    }

    /// Resolves a parameter from the names used by the supported data sources.
    ///
    /// Accepts the crate's own names, the DWD observation names
    /// (`precipitation_height`, `temperature_air_max_2m`, ...) and the short SWAT
    /// file prefixes (`pcp`, `tmax`, `rh`, ...). Matching ignores ASCII case.
    ///
    /// # Examples
    ///
    /// ```
    /// use swat_meteo::Parameter;
    ///
    /// assert_eq!(Parameter::from_name("precipitation_height"), Some(Parameter::Precipitation));
    /// assert_eq!(Parameter::from_name("TMAX"), Some(Parameter::TempMax));
    /// assert_eq!(Parameter::from_name("snow_depth"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Parameter> {
        let lower = name.trim().to_ascii_lowercase();
        let parameter = match lower.as_str() {
            "precipitation" | "precipitation_height" | "pcp" | "prcp" => Parameter::Precipitation,
            "temp_max" | "temperature_air_max_2m" | "tmax" | "max_temperature" => {
                Parameter::TempMax
            }
            "temp_min" | "temperature_air_min_2m" | "tmin" | "min_temperature" => {
                Parameter::TempMin
            }
            "humidity" | "rh" | "rhum" | "hmd" => Parameter::Humidity,
            "wind" | "wind_speed" | "wspd" | "wnd" => Parameter::Wind,
            "solar" | "radiation_global" | "slr" => Parameter::Solar,
            "temp_mean" | "temperature_air_mean_2m" | "tavg" | "temperature" => {
                Parameter::TempMean
            }
            _ => return None,
        };
        Some(parameter)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
