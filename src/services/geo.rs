use crate::models::restaurant::Location;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers using the haversine formula.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `a` just outside [0, 1] for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

pub fn distance_between(from: Location, to: Location) -> f64 {
    haversine_km(from.lat, from.lng, to.lat, to.lng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn identical_points_are_zero_apart() {
        for (lat, lng) in [(0.0, 0.0), (48.8566, 2.3522), (-33.8688, 151.2093), (90.0, 0.0)] {
            assert_eq!(haversine_km(lat, lng, lat, lng), 0.0);
        }
    }

    #[test]
    fn antipodal_points_are_half_the_circumference() {
        let distance = haversine_km(0.0, 0.0, 0.0, 180.0);
        assert!(distance <= 2.0 * PI * EARTH_RADIUS_KM);
        assert!((distance - PI * EARTH_RADIUS_KM).abs() < 1e-6);

        let pole_to_pole = haversine_km(90.0, 0.0, -90.0, 0.0);
        assert!((pole_to_pole - PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn paris_to_london_matches_known_distance() {
        let distance = distance_between(
            Location { lat: 48.8566, lng: 2.3522 },
            Location { lat: 51.5074, lng: -0.1278 },
        );
        assert!((distance - 343.5).abs() < 1.0, "got {distance}");
    }

    #[test]
    fn distance_is_symmetric() {
        let there = haversine_km(35.6762, 139.6503, 40.7128, -74.0060);
        let back = haversine_km(40.7128, -74.0060, 35.6762, 139.6503);
        assert!((there - back).abs() < 1e-9);
    }
}
