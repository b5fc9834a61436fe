const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance at which arcs stop growing taller; roughly half the circumference.
const NORMALIZATION_KM: f64 = 20_000.0;

/// Haversine great-circle distance in kilometres.
pub fn geodesic_distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lng2 - lng1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).max(0.0).sqrt());

    EARTH_RADIUS_KM * c
}

pub fn normalize(km: f64) -> f64 {
    (km / NORMALIZATION_KM).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_has_zero_distance() {
        assert_eq!(geodesic_distance_km(35.68, 139.65, 35.68, 139.65), 0.0);
    }

    #[test]
    fn tokyo_to_london_is_about_9560_km() {
        let km = geodesic_distance_km(35.68, 139.65, 51.51, -0.13);
        assert!((km - 9560.0).abs() < 30.0, "got {km}");
    }

    #[test]
    fn antipodes_are_half_the_circumference() {
        let km = geodesic_distance_km(0.0, 0.0, 0.0, 180.0);
        assert!((km - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn distance_is_symmetric() {
        let forward = geodesic_distance_km(60.17, 24.94, -33.92, 18.42);
        let backward = geodesic_distance_km(-33.92, 18.42, 60.17, 24.94);
        assert!((forward - backward).abs() < 1e-9);
    }

    #[test]
    fn normalize_caps_at_one() {
        assert_eq!(normalize(0.0), 0.0);
        assert_eq!(normalize(10_000.0), 0.5);
        assert_eq!(normalize(20_000.0), 1.0);
        assert_eq!(normalize(25_000.0), 1.0);
    }
}
