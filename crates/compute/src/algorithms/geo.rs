//! Great-circle distance and a planar centroid for geo-point sequences.

/// Mean Earth radius used by the Haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two (lat, lon) pairs in degrees.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push `a` a hair outside [0, 1] for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Arithmetic mean of latitudes and longitudes.
///
/// Treats coordinates as planar, so it drifts near the poles and across the
/// antimeridian. Good enough at city/country scale, and the spatial score is
/// calibrated against it.
pub fn planar_centroid(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (lat_sum, lon_sum) = points
        .iter()
        .fold((0.0, 0.0), |(la, lo), &(lat, lon)| (la + lat, lo + lon));
    Some((lat_sum / n, lon_sum / n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(haversine_km(52.52, 13.405, 52.52, 13.405), 0.0);
        assert_eq!(haversine_km(-33.87, 151.21, -33.87, 151.21), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            ((52.52, 13.405), (48.8566, 2.3522)),
            ((40.7128, -74.006), (-33.8688, 151.2093)),
            ((0.0, 179.5), (0.0, -179.5)),
        ];
        for ((la1, lo1), (la2, lo2)) in pairs {
            let ab = haversine_km(la1, lo1, la2, lo2);
            let ba = haversine_km(la2, lo2, la1, lo1);
            assert!((ab - ba).abs() < 1e-9, "{ab} != {ba}");
        }
    }

    #[test]
    fn berlin_to_paris() {
        let d = haversine_km(52.52, 13.405, 48.8566, 2.3522);
        assert!((d - 878.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.195).abs() < 0.01, "got {d}");
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let d = haversine_km(0.0, 0.0, 0.0, 180.0);
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn centroid_is_planar_mean() {
        assert_eq!(planar_centroid(&[]), None);
        let c = planar_centroid(&[(10.0, 20.0), (20.0, 40.0)]).unwrap();
        assert_eq!(c, (15.0, 30.0));
    }

    #[test]
    fn centroid_across_antimeridian_is_a_known_approximation() {
        // Points either side of ±180° average to longitude 0, not 180.
        let c = planar_centroid(&[(0.0, 179.0), (0.0, -179.0)]).unwrap();
        assert_eq!(c, (0.0, 0.0));
    }
}
