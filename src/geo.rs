use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on the map in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Returns `None` unless both values are finite and inside the valid
    /// latitude/longitude ranges.
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return None;
        }
        Some(Self { lat, lng })
    }

    /// Builds coordinates from the nullable columns stored on a cafe.
    pub fn from_optional(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Self::new(lat, lng),
            _ => None,
        }
    }
}

/// Great-circle distance between two points using the haversine formula.
/// Returns kilometers.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points.
    let c = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// "750 m" below one kilometer, "1.2 km" from there on.
pub fn format_distance(km: f64) -> String {
    let meters = (km * 1000.0).round();
    if meters < 1000.0 {
        format!("{} m", meters as i64)
    } else {
        format!("{:.1} km", km)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tugu() -> Coordinates {
        Coordinates::new(-7.7829, 110.3671).unwrap()
    }

    fn malioboro() -> Coordinates {
        Coordinates::new(-7.7926, 110.3658).unwrap()
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(haversine_km(tugu(), tugu()), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let ab = haversine_km(tugu(), malioboro());
        let ba = haversine_km(malioboro(), tugu());
        assert!((ab - ba).abs() < 1e-12);
    }

    #[test]
    fn jakarta_to_bandung_is_roughly_120_km() {
        let jakarta = Coordinates::new(-6.2088, 106.8456).unwrap();
        let bandung = Coordinates::new(-6.9175, 107.6191).unwrap();
        let d = haversine_km(jakarta, bandung);
        assert!(d > 100.0 && d < 150.0, "got {d}");
    }

    #[test]
    fn nearby_points_are_about_a_kilometer_apart() {
        let d = haversine_km(tugu(), malioboro());
        assert!(d > 1.0 && d < 1.2, "got {d}");
    }

    #[test]
    fn rejects_out_of_range_and_non_finite() {
        assert!(Coordinates::new(91.0, 0.0).is_none());
        assert!(Coordinates::new(0.0, -181.0).is_none());
        assert!(Coordinates::new(f64::NAN, 0.0).is_none());
        assert!(Coordinates::from_optional(Some(-7.7), None).is_none());
        assert!(Coordinates::from_optional(Some(-7.7), Some(110.3)).is_some());
    }

    #[test]
    fn formats_meters_below_one_km() {
        assert_eq!(format_distance(0.75), "750 m");
        assert_eq!(format_distance(0.0), "0 m");
        assert_eq!(format_distance(0.9994), "999 m");
    }

    #[test]
    fn formats_kilometers_with_one_decimal() {
        assert_eq!(format_distance(1.0), "1.0 km");
        assert_eq!(format_distance(1.24), "1.2 km");
        assert_eq!(format_distance(12.96), "13.0 km");
    }

    #[test]
    fn just_under_a_kilometer_rounds_up_to_kilometers() {
        assert_eq!(format_distance(0.9996), "1.0 km");
        assert_eq!(format_distance(0.9995), "1.0 km");
    }
}
