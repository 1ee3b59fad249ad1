//! Subbasin centroids, the locations weather values are interpolated to.

use crate::types::point::Point;
use serde::{Deserialize, Serialize};

/// A watershed subbasin centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// SWAT subbasin number, unique within a watershed.
    pub subbasin_id: u32,
    /// Centroid of the subbasin.
    pub location: Point,
    /// Mean elevation of the subbasin in meters, if known.
    pub elevation: Option<f64>,
}

impl Target {
    pub fn new(subbasin_id: u32, location: Point) -> Self {
        Self {
            subbasin_id,
            location,
            elevation: None,
        }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }
}
