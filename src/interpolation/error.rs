use crate::types::parameter::Parameter;
use chrono::NaiveDate;
use thiserror::Error;

/// Fatal problems with the inputs of an interpolation run.
///
/// These are detected before any cell is interpolated and abort the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("IDW power must be finite and greater than 0, got {0}")]
    InvalidPower(f64),

    #[error("Search radius must be finite and non-negative, got {0} km")]
    InvalidRadius(f64),

    #[error("Solar station count must be at least 1")]
    InvalidSolarStationCount,

    #[error("Date range start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("No parameters selected for interpolation")]
    NoParameters,

    #[error("Parameter {0} is selected more than once")]
    DuplicateParameter(Parameter),

    #[error("No subbasin targets provided")]
    EmptyTargets,

    #[error("No stations provided")]
    EmptyStations,

    #[error("Station id '{0}' occurs more than once")]
    DuplicateStation(String),

    #[error("Subbasin {0} occurs more than once")]
    DuplicateSubbasin(u32),

    #[error("Invalid Richter coefficient '{field}': {reason}")]
    InvalidRichterCoefficient { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ConfigurationError::InvalidPower(-1.0).to_string(),
            "IDW power must be finite and greater than 0, got -1"
        );
        assert_eq!(
            ConfigurationError::DuplicateStation("01766".into()).to_string(),
            "Station id '01766' occurs more than once"
        );
    }

    #[test]
    fn test_is_send_and_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<ConfigurationError>();
    }
}
