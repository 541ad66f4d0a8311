//! Haversine distance on a spherical Earth.

use crate::models::GeoPoint;

/// Mean Earth radius in kilometres (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Great-circle distance between two points in kilometres.
///
/// Pure and commutative; exactly zero for identical points.
///
/// # Examples
///
/// ```
/// use u_grouping::distance::haversine_km;
/// use u_grouping::models::GeoPoint;
///
/// let a = GeoPoint::new(0.0, 0.0);
/// let b = GeoPoint::new(0.0, 1.0);
/// // One degree of longitude on the equator.
/// assert!((haversine_km(a, b) - 111.195).abs() < 0.01);
/// assert_eq!(haversine_km(a, a), 0.0);
/// ```
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat().to_radians();
    let phi2 = b.lat().to_radians();
    let dphi = (b.lat() - a.lat()).to_radians();
    let dlambda = (b.lon() - a.lon()).to_radians();

    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    // Rounding can push h marginally above 1 for antipodal points.
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_for_same_point() {
        let p = GeoPoint::new(52.52, 13.405);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn test_commutative() {
        let a = GeoPoint::new(53.55, 9.99);
        let b = GeoPoint::new(48.14, 11.58);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_known_distance() {
        // Hamburg -> Munich, roughly 612 km
        let hamburg = GeoPoint::new(53.5511, 9.9937);
        let munich = GeoPoint::new(48.1351, 11.5820);
        let d = haversine_km(hamburg, munich);
        assert!(d > 600.0 && d < 625.0, "got {d}");
    }

    #[test]
    fn test_antipodal_is_half_circumference() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 180.0);
        let expected = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((haversine_km(a, b) - expected).abs() < 1e-6);
    }
}
