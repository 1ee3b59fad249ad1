//! Geographic point type shared by stations and subbasin centroids.

use serde::{Deserialize, Serialize};

/// A geographical coordinate in decimal degrees.
///
/// Latitude is positive for North, longitude positive for East. Values are not
/// range-checked; any finite pair is accepted.
///
/// # Examples
///
/// ```
/// use swat_meteo::Point;
///
/// let frankfurt = Point::new(50.11, 8.68);
/// assert_eq!(frankfurt.latitude, 50.11);
/// assert_eq!(frankfurt.longitude, 8.68);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}
