// src/utils/geo.rs
//! Great-circle distance and the fixed-speed ETA used for driver offers.
//! Not a routing estimate; real traffic is out of scope.

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two (lat, lng) pairs, in kilometers.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Minutes to cover `distance_km` at the given assumed speed, rounded up.
pub fn eta_minutes(distance_km: f64, assumed_speed_kmh: f64) -> i64 {
    if assumed_speed_kmh <= 0.0 {
        return 0;
    }
    (distance_km / assumed_speed_kmh * 60.0).ceil() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_same_point() {
        assert!(haversine_km(5.6037, -0.187, 5.6037, -0.187) < 1e-9);
    }

    #[test]
    fn known_distance_accra_to_kumasi() {
        // Accra (5.6037, -0.1870) to Kumasi (6.6885, -1.6244), ~200km straight line
        let d = haversine_km(5.6037, -0.1870, 6.6885, -1.6244);
        assert!(d > 190.0 && d < 210.0, "got {}", d);
    }

    #[test]
    fn eta_is_monotone_in_distance() {
        let speed = 30.0;
        let mut prev = 0;
        for d in [0.5, 1.0, 2.3, 5.0, 12.0, 40.0] {
            let eta = eta_minutes(d, speed);
            assert!(eta >= prev, "eta({}) = {} < {}", d, eta, prev);
            prev = eta;
        }
    }

    #[test]
    fn eta_rounds_up() {
        // 1 km at 30 km/h is 2 minutes exactly; 1.1 km rounds up to 3
        assert_eq!(eta_minutes(1.0, 30.0), 2);
        assert_eq!(eta_minutes(1.1, 30.0), 3);
    }
}
