use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::{GeoError, Result};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Half the modeled circumference; no two points on the sphere are farther apart.
pub const MAX_DISTANCE_METERS: f64 = PI * EARTH_RADIUS_METERS;

/// A longitude/latitude pair in decimal degrees, longitude first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    longitude: f64,
    latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self> {
        let point = Self {
            longitude,
            latitude,
        };
        point.validate()?;
        Ok(point)
    }

    /// Skips validation. Distances computed from an invalid point are meaningless.
    pub fn new_unchecked(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn validate(&self) -> Result<()> {
        if !self.longitude.is_finite() {
            return Err(GeoError::NonFinite {
                field: "longitude",
                value: self.longitude,
            });
        }
        if !self.latitude.is_finite() {
            return Err(GeoError::NonFinite {
                field: "latitude",
                value: self.latitude,
            });
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(GeoError::LatitudeOutOfRange(self.latitude));
        }
        if self.longitude <= -180.0 || self.longitude > 180.0 {
            return Err(GeoError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }

    /// Distance to `other` in meters. Both points were validated on construction
    /// unless one came from `new_unchecked`.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_meters(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.longitude, self.latitude)
    }
}

impl FromStr for GeoPoint {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self> {
        let (lng, lat) = s
            .split_once(',')
            .ok_or_else(|| GeoError::Malformed(s.to_string()))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| GeoError::Malformed(s.to_string()))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| GeoError::Malformed(s.to_string()))?;
        GeoPoint::new(lng, lat)
    }
}

/// Great-circle distance between `a` and `b` in meters, rejecting invalid points.
pub fn distance_meters(a: &GeoPoint, b: &GeoPoint) -> Result<f64> {
    a.validate()?;
    b.validate()?;
    Ok(a.distance_to(b))
}

/// Great-circle distance using the haversine formula.
/// Input lat/lon in degrees. Output in meters.
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    // Rounding can push h a hair outside [0, 1] near antipodes.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lng: f64, lat: f64) -> GeoPoint {
        GeoPoint::new(lng, lat).unwrap()
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} +/- {}, got {}",
            expected,
            tolerance,
            actual
        );
    }

    #[test]
    fn identical_points_are_zero_apart() {
        let copenhagen = p(12.5683, 55.6761);
        assert_eq!(distance_meters(&copenhagen, &copenhagen).unwrap(), 0.0);
    }

    #[test]
    fn copenhagen_to_aarhus() {
        let copenhagen = p(12.5683, 55.6761);
        let aarhus = p(10.2039, 56.1496);
        assert_close(distance_meters(&copenhagen, &aarhus).unwrap(), 156_462.8, 1.0);
    }

    #[test]
    fn one_degree_on_the_equator() {
        assert_close(distance_meters(&p(0.0, 0.0), &p(1.0, 0.0)).unwrap(), 111_194.9, 1.0);
        assert_close(distance_meters(&p(0.0, 0.0), &p(0.0, 1.0)).unwrap(), 111_194.9, 1.0);
    }

    #[test]
    fn antipodes_are_half_the_circumference() {
        let d = distance_meters(&p(0.0, 0.0), &p(180.0, 0.0)).unwrap();
        assert_close(d, 20_015_086.8, 1.0);
        assert!(d <= MAX_DISTANCE_METERS);

        let poles = distance_meters(&p(0.0, 90.0), &p(0.0, -90.0)).unwrap();
        assert_close(poles, MAX_DISTANCE_METERS, 1e-6);
    }

    #[test]
    fn longitude_wraps_around() {
        let d = distance_meters(&p(179.0, 0.0), &p(-179.0, 0.0)).unwrap();
        assert_close(d, 222_389.9, 1.0);
    }

    #[test]
    fn rejects_invalid_coordinates() {
        assert_eq!(
            GeoPoint::new(0.0, 90.5),
            Err(GeoError::LatitudeOutOfRange(90.5))
        );
        assert_eq!(
            GeoPoint::new(-180.0, 0.0),
            Err(GeoError::LongitudeOutOfRange(-180.0))
        );
        assert!(GeoPoint::new(180.0, 0.0).is_ok());
        assert!(matches!(
            GeoPoint::new(f64::NAN, 0.0),
            Err(GeoError::NonFinite { field: "longitude", .. })
        ));
        assert!(matches!(
            GeoPoint::new(0.0, f64::INFINITY),
            Err(GeoError::NonFinite { field: "latitude", .. })
        ));
    }

    #[test]
    fn distance_rejects_unchecked_garbage() {
        let bad = GeoPoint::new_unchecked(f64::NAN, 10.0);
        let err = distance_meters(&bad, &p(0.0, 0.0)).unwrap_err();
        assert!(matches!(err, GeoError::NonFinite { field: "longitude", .. }));
    }

    #[test]
    fn parses_lng_lat() {
        let point: GeoPoint = " 12.5683, 55.6761 ".parse().unwrap();
        assert_eq!(point, p(12.5683, 55.6761));
        assert_eq!(point.to_string(), "12.5683,55.6761");
        assert!(matches!("12.5".parse::<GeoPoint>(), Err(GeoError::Malformed(_))));
        assert!(matches!("a,b".parse::<GeoPoint>(), Err(GeoError::Malformed(_))));
        assert!(matches!(
            "0,91".parse::<GeoPoint>(),
            Err(GeoError::LatitudeOutOfRange(_))
        ));
    }

    fn valid_point() -> impl proptest::strategy::Strategy<Value = GeoPoint> {
        use proptest::prelude::*;
        (-179.999_999f64..=180.0, -90.0f64..=90.0).prop_map(|(lng, lat)| p(lng, lat))
    }

    proptest::proptest! {
        #[test]
        fn identity(a in valid_point()) {
            proptest::prop_assert_eq!(distance_meters(&a, &a).unwrap(), 0.0);
        }

        #[test]
        fn symmetric_and_bounded(a in valid_point(), b in valid_point()) {
            let ab = distance_meters(&a, &b).unwrap();
            let ba = distance_meters(&b, &a).unwrap();
            proptest::prop_assert!((ab - ba).abs() < 1e-6);
            proptest::prop_assert!(ab >= 0.0);
            proptest::prop_assert!(ab <= MAX_DISTANCE_METERS);
        }
    }
}
