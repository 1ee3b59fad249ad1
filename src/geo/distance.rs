//! Great-circle distances between geographic points.

use crate::types::point::Point;
use haversine::{distance, Location as HaversineLocation, Units};

impl From<Point> for HaversineLocation {
    fn from(point: Point) -> Self {
        HaversineLocation {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

/// Haversine distance between two points in kilometers, on a mean Earth radius
/// of 6371 km.
///
/// # Examples
///
/// ```
/// use swat_meteo::{distance_km, Point};
///
/// let a = Point::new(50.0, 8.0);
/// let b = Point::new(51.0, 8.0);
/// assert!((distance_km(a, b) - 111.19).abs() < 0.01);
/// assert_eq!(distance_km(a, a), 0.0);
/// ```
pub fn distance_km(a: Point, b: Point) -> f64 {
    distance(a.into(), b.into(), Units::Kilometers)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE_KM: f64 = 1e-9;

    #[test]
    fn test_identical_points_are_zero_apart() {
        for point in [
            Point::new(0.0, 0.0),
            Point::new(50.1, 8.7),
            Point::new(-33.87, 151.21),
            Point::new(89.9, -179.9),
        ] {
            assert_eq!(distance_km(point, point), 0.0);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let berlin = Point::new(52.52, 13.405);
        let munich = Point::new(48.137, 11.575);
        let d1 = distance_km(berlin, munich);
        let d2 = distance_km(munich, berlin);
        assert!((d1 - d2).abs() < TOLERANCE_KM);
        assert!(d1 > 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = distance_km(Point::new(50.0, 8.0), Point::new(51.0, 8.0));
        assert!((d - 111.0).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_reference_city_distance() {
        // Berlin to Munich is about 504 km along the great circle.
        let d = distance_km(Point::new(52.52, 13.405), Point::new(48.137, 11.575));
        assert!((d - 504.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn test_triangle_inequality() {
        let a = Point::new(50.0, 8.0);
        let b = Point::new(50.5, 9.2);
        let c = Point::new(49.4, 10.1);
        let ab = distance_km(a, b);
        let bc = distance_km(b, c);
        let ac = distance_km(a, c);
        assert!(ac <= ab + bc + TOLERANCE_KM);
        assert!(ab <= ac + bc + TOLERANCE_KM);
        assert!(bc <= ab + ac + TOLERANCE_KM);
    }
}
