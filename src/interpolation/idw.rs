//! Inverse Distance Weighting over precomputed station distances.

use crate::interpolation::error::ConfigurationError;

/// Distances at or below this are treated as "station sits on the target".
pub const ZERO_DISTANCE_KM: f64 = 1e-12;

/// One station's contribution to a cell: its value and its distance to the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub distance_km: f64,
}

impl Sample {
    pub fn new(value: f64, distance_km: f64) -> Self {
        Self { value, distance_km }
    }
}

/// Checks that `power` is usable as an IDW exponent.
pub fn validate_power(power: f64) -> Result<(), ConfigurationError> {
    if power.is_finite() && power > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidPower(power))
    }
}

/// Interpolates a value from `samples` with weights `1 / distance^power`.
///
/// The first sample (in input order) whose distance is zero is returned as is.
/// Samples with a non-finite value or distance are ignored. Returns `Ok(None)`
/// when no usable sample is left, which callers treat as a data gap.
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidPower`] if `power` is not finite and positive.
///
/// # Examples
///
/// ```
/// use swat_meteo::{idw_interpolate, Sample};
///
/// let samples = [Sample::new(10.0, 5.0), Sample::new(20.0, 5.0)];
/// let value = idw_interpolate(&samples, 2.0)?.unwrap();
/// assert!((value - 15.0).abs() < 1e-12);
///
/// assert_eq!(idw_interpolate(&[], 2.0)?, None);
/// # Ok::<(), swat_meteo::ConfigurationError>(())
/// ```
pub fn interpolate(samples: &[Sample], power: f64) -> Result<Option<f64>, ConfigurationError> {
    validate_power(power)?;

    let usable = || {
        samples
            .iter()
            .filter(|s| s.value.is_finite() && s.distance_km.is_finite())
    };

    let mut min_distance = f64::INFINITY;
    for sample in usable() {
        if sample.distance_km <= ZERO_DISTANCE_KM {
            return Ok(Some(sample.value));
        }
        min_distance = min_distance.min(sample.distance_km);
    }

    // Weights are relative to the nearest sample and stay within (0, 1].
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    for sample in usable() {
        let weight = (min_distance / sample.distance_km).powf(power);
        weighted_sum += weight * sample.value;
        weight_sum += weight;
    }

    if weight_sum > 0.0 {
        Ok(Some(weighted_sum / weight_sum))
    } else {
        Ok(None)
    }
}
