use super::domain::Coordinates;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance in kilometres between two points given in decimal degrees.
///
/// Callers validate input; out-of-range coordinates are a contract violation.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    debug_assert!(
        Coordinates::new(lat1, lon1).is_some() && Coordinates::new(lat2, lon2).is_some(),
        "distance_km called with invalid coordinates"
    );

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

impl Coordinates {
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        distance_km(
            self.latitude(),
            self.longitude(),
            other.latitude(),
            other.longitude(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SARAJEVO: (f64, f64) = (43.8563, 18.4131);
    const BANJA_LUKA: (f64, f64) = (44.7722, 17.1910);

    #[test]
    fn identical_points_are_zero_apart() {
        let distance = distance_km(SARAJEVO.0, SARAJEVO.1, SARAJEVO.0, SARAJEVO.1);
        assert_eq!(distance, 0.0);
    }

    #[test]
    fn quarter_circle_along_equator() {
        let distance = distance_km(0.0, 0.0, 0.0, 90.0);
        assert!((distance - 10007.543).abs() < 0.01, "got {distance}");
    }

    #[test]
    fn antipodal_points_are_half_circumference() {
        let distance = distance_km(0.0, 0.0, 0.0, 180.0);
        assert!((distance - 20015.087).abs() < 0.01, "got {distance}");

        let poles = distance_km(90.0, 0.0, -90.0, 0.0);
        assert!((poles - 20015.087).abs() < 0.01, "got {poles}");
    }

    #[test]
    fn distance_is_symmetric() {
        let samples = [
            (SARAJEVO, BANJA_LUKA),
            ((43.3438, 17.8078), (44.8727, 18.8106)),
            ((-33.8688, 151.2093), (51.5074, -0.1278)),
        ];
        for ((lat1, lon1), (lat2, lon2)) in samples {
            let forward = distance_km(lat1, lon1, lat2, lon2);
            let backward = distance_km(lat2, lon2, lat1, lon1);
            assert!((forward - backward).abs() < 1e-9);
        }
    }

    #[test]
    fn sarajevo_to_banja_luka_is_roughly_140_km() {
        let sarajevo = Coordinates::new(SARAJEVO.0, SARAJEVO.1).unwrap();
        let banja_luka = Coordinates::new(BANJA_LUKA.0, BANJA_LUKA.1).unwrap();
        let distance = sarajevo.distance_to(&banja_luka);
        assert!((130.0..150.0).contains(&distance), "got {distance}");
    }
}
