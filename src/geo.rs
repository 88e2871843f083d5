//! Geodesic helpers and Philippine Area of Responsibility membership
//!
//! Pure geometric utilities shared by the storm parsers and the aggregation
//! layer: great-circle distance and the fixed PAR bounding box test.

/// Mean Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Southern latitude limit of the PAR bounding box in degrees
pub const PAR_LAT_MIN: f64 = 5.0;
/// Northern latitude limit of the PAR bounding box in degrees
pub const PAR_LAT_MAX: f64 = 25.0;
/// Western longitude limit of the PAR bounding box in degrees
pub const PAR_LON_MIN: f64 = 115.0;
/// Eastern longitude limit of the PAR bounding box in degrees
pub const PAR_LON_MAX: f64 = 135.0;

/// Great-circle distance between two points using the haversine formula.
///
/// Returns kilometers. Finite, non-negative output for finite inputs.
pub fn haversine_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let lat1_r = lat1.to_radians();
    let lat2_r = lat2.to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1_r.cos() * lat2_r.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Whether a coordinate falls inside the PAR bounding box (inclusive edges).
pub fn is_in_par(lat: f64, lon: f64) -> bool {
    (PAR_LAT_MIN..=PAR_LAT_MAX).contains(&lat) && (PAR_LON_MIN..=PAR_LON_MAX).contains(&lon)
}

/// Distance in kilometers from a coordinate to the nearest point of the PAR
/// bounding box. Zero when the coordinate is already inside.
pub fn distance_to_par_km(lat: f64, lon: f64) -> f64 {
    if is_in_par(lat, lon) {
        return 0.0;
    }
    let nearest_lat = lat.clamp(PAR_LAT_MIN, PAR_LAT_MAX);
    let nearest_lon = lon.clamp(PAR_LON_MIN, PAR_LON_MAX);
    haversine_distance_km(lat, lon, nearest_lat, nearest_lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero_for_identical_points() {
        assert_eq!(haversine_distance_km(14.5995, 120.9842, 14.5995, 120.9842), 0.0);
        assert_eq!(haversine_distance_km(0.0, 0.0, 0.0, 0.0), 0.0);
        assert_eq!(haversine_distance_km(-33.87, 151.21, -33.87, 151.21), 0.0);
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let d1 = haversine_distance_km(14.5995, 120.9842, 35.6762, 139.6503);
        let d2 = haversine_distance_km(35.6762, 139.6503, 14.5995, 120.9842);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_manila_to_tokyo() {
        // Manila to Tokyo is roughly 3,000 km
        let d = haversine_distance_km(14.5995, 120.9842, 35.6762, 139.6503);
        assert!(d > 2900.0 && d < 3100.0, "unexpected distance: {d}");
    }

    #[test]
    fn test_haversine_never_negative() {
        let d = haversine_distance_km(-45.0, -170.0, 45.0, 170.0);
        assert!(d >= 0.0);
        assert!(d.is_finite());
    }

    #[test]
    fn test_par_membership_inside() {
        // Manila
        assert!(is_in_par(14.5995, 120.9842));
        // Davao
        assert!(is_in_par(7.1907, 125.4553));
    }

    #[test]
    fn test_par_membership_edges_are_inclusive() {
        assert!(is_in_par(5.0, 115.0));
        assert!(is_in_par(25.0, 135.0));
        assert!(is_in_par(5.0, 135.0));
        assert!(is_in_par(25.0, 115.0));
    }

    #[test]
    fn test_par_membership_outside() {
        // Just south of the box
        assert!(!is_in_par(4.99, 121.0));
        // Tokyo
        assert!(!is_in_par(35.6762, 139.6503));
        // Right latitude, too far east
        assert!(!is_in_par(15.0, 140.0));
    }

    #[test]
    fn test_distance_to_par_zero_inside() {
        assert_eq!(distance_to_par_km(14.5995, 120.9842), 0.0);
        assert_eq!(distance_to_par_km(5.0, 115.0), 0.0);
    }

    #[test]
    fn test_distance_to_par_east_of_box() {
        // 5 degrees of longitude at 15N is roughly 535 km
        let d = distance_to_par_km(15.0, 140.0);
        assert!(d > 500.0 && d < 570.0, "unexpected distance: {d}");
    }

    #[test]
    fn test_distance_to_par_positive_outside() {
        assert!(distance_to_par_km(35.6762, 139.6503) > 0.0);
        assert!(distance_to_par_km(0.0, 100.0) > 0.0);
    }
}
