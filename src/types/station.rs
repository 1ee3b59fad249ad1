//! Observation stations as seen by the interpolation core.

use crate::types::point::Point;
use serde::{Deserialize, Serialize};

/// A weather station that contributes observations to the interpolation.
///
/// Stations are identified by `id`, which must be unique within one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Source specific identifier (e.g. a Meteostat or DWD station id).
    pub id: String,
    /// Station location.
    pub location: Point,
    /// Elevation above sea level in meters, if available.
    pub elevation: Option<f64>,
}

impl Station {
    pub fn new(id: impl Into<String>, location: Point) -> Self {
        Self {
            id: id.into(),
            location,
            elevation: None,
        }
    }
}
