//! Geodetic calculations.
//!
//! Control point derivation needs distances, bearings and midpoints
//! on the surface of the earth.  These come from a [`Geodesy`]
//! implementation; [`Wgs84`] does them properly on the WGS84
//! ellipsoid, while [`Planar`] treats longitude and latitude as plane
//! coordinates, which is handy for small sketches and for tests that
//! need exact answers.

use std::fmt::Debug;

use geo::{Bearing, Destination, Distance, Geodesic, InterpolatePoint, Point};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    fn to_geo(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    fn from_geo(p: Point<f64>) -> GeoPoint {
        GeoPoint::new(p.y(), p.x())
    }
}

/// Reduces a bearing in degrees to the range `[0, 360)`.
pub fn normalize_bearing(degrees: f64) -> f64 {
    let b = degrees.rem_euclid(360.0);
    if b >= 360.0 {
        0.0
    } else {
        b
    }
}

/// Distances are in metres and bearings in degrees clockwise from
/// north.
pub trait Geodesy: Debug + Send + Sync {
    fn distance(&self, from: &GeoPoint, to: &GeoPoint) -> f64;

    /// Initial bearing of the path from `from` to `to`, in `[0, 360)`.
    fn bearing(&self, from: &GeoPoint, to: &GeoPoint) -> f64;

    fn point_at_distance(&self, origin: &GeoPoint, bearing: f64, distance: f64) -> GeoPoint;

    /// The point `fraction` of the way along the path from `from` to
    /// `to`.
    fn point_at_fraction(&self, from: &GeoPoint, to: &GeoPoint, fraction: f64) -> GeoPoint;

    fn midpoint(&self, a: &GeoPoint, b: &GeoPoint) -> GeoPoint {
        self.point_at_fraction(a, b, 0.5)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Wgs84;

impl Geodesy for Wgs84 {
    fn distance(&self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        Geodesic.distance(from.to_geo(), to.to_geo())
    }

    fn bearing(&self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        normalize_bearing(Geodesic.bearing(from.to_geo(), to.to_geo()))
    }

    fn point_at_distance(&self, origin: &GeoPoint, bearing: f64, distance: f64) -> GeoPoint {
        GeoPoint::from_geo(Geodesic.destination(origin.to_geo(), bearing, distance))
    }

    fn point_at_fraction(&self, from: &GeoPoint, to: &GeoPoint, fraction: f64) -> GeoPoint {
        GeoPoint::from_geo(Geodesic.point_at_ratio_between(from.to_geo(), to.to_geo(), fraction))
    }
}

/// Treats longitude as x and latitude as y on a flat plane, with
/// distances in the same units as the coordinates.
#[derive(Debug, Default, Clone, Copy)]
pub struct Planar;

impl Geodesy for Planar {
    fn distance(&self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        (to.longitude - from.longitude).hypot(to.latitude - from.latitude)
    }

    fn bearing(&self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        let dx = to.longitude - from.longitude;
        let dy = to.latitude - from.latitude;
        normalize_bearing(dx.atan2(dy).to_degrees())
    }

    fn point_at_distance(&self, origin: &GeoPoint, bearing: f64, distance: f64) -> GeoPoint {
        let radians = bearing.to_radians();
        GeoPoint::new(
            origin.latitude + distance * radians.cos(),
            origin.longitude + distance * radians.sin(),
        )
    }

    fn point_at_fraction(&self, from: &GeoPoint, to: &GeoPoint, fraction: f64) -> GeoPoint {
        GeoPoint::new(
            from.latitude + (to.latitude - from.latitude) * fraction,
            from.longitude + (to.longitude - from.longitude) * fraction,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }

    #[test]
    fn test_normalize_bearing() {
        assert_eq!(normalize_bearing(-90.0), 270.0);
        assert_eq!(normalize_bearing(360.0), 0.0);
        assert_eq!(normalize_bearing(725.0), 5.0);
    }

    #[test]
    fn test_planar() {
        let g = Planar;
        let origin = GeoPoint::new(0.0, 0.0);
        let east = GeoPoint::new(0.0, 4.0);
        let north = GeoPoint::new(3.0, 0.0);
        assert_eq!(g.distance(&north, &east), 5.0);
        assert!(close(g.bearing(&origin, &east), 90.0, 1e-9));
        assert!(close(g.bearing(&origin, &north), 0.0, 1e-9));
        assert!(close(g.bearing(&east, &origin), 270.0, 1e-9));
        assert_eq!(g.midpoint(&north, &east), GeoPoint::new(1.5, 2.0));
        let p = g.point_at_distance(&origin, 90.0, 2.0);
        assert!(close(p.latitude, 0.0, 1e-9) && close(p.longitude, 2.0, 1e-9));
    }

    #[test]
    fn test_wgs84_along_the_equator() {
        let g = Wgs84;
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 1.0);
        // One degree of longitude at the equator is about 111.32km.
        assert!(close(g.distance(&a, &b), 111_319.5, 1.0));
        assert!(close(g.bearing(&a, &b), 90.0, 1e-6));
        assert!(close(g.bearing(&b, &a), 270.0, 1e-6));
        let m = g.midpoint(&a, &b);
        assert!(close(m.latitude, 0.0, 1e-9));
        assert!(close(m.longitude, 0.5, 1e-9));
    }

    #[test]
    fn test_wgs84_destination_inverts_distance() {
        let g = Wgs84;
        let origin = GeoPoint::new(38.95, 8.40);
        let target = g.point_at_distance(&origin, 45.0, 10_000.0);
        assert!(close(g.distance(&origin, &target), 10_000.0, 0.01));
        assert!(close(g.bearing(&origin, &target), 45.0, 1e-6));
    }
}
