use serde::{Deserialize, Serialize};

/// A point picked on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate from raw map input.
    ///
    /// Returns `None` for non-finite values or a latitude beyond the poles.
    /// Longitudes from wrapped copies of the world are folded back into
    /// `[-180, 180)`; values already within ±180 are kept as given.
    pub fn from_map(lat: f64, lng: f64) -> Option<Self> {
        if !lat.is_finite() || !lng.is_finite() || lat.abs() > 90.0 {
            return None;
        }

        let longitude = if (-180.0..=180.0).contains(&lng) {
            lng
        } else {
            (lng + 180.0).rem_euclid(360.0) - 180.0
        };
        Some(Self {
            latitude: lat,
            longitude,
        })
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Current conditions for one place, as returned by a successful lookup.
///
/// Everything past temperature, condition, humidity and wind is optional so
/// that minimal provider responses still produce a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location_name: Option<String>,
    pub temperature_c: f64,
    pub feels_like_c: Option<f64>,
    pub condition_description: String,
    pub condition_icon_id: String,
    pub humidity_pct: u8,
    pub pressure_hpa: Option<u32>,
    pub wind_speed_mps: f64,
    pub wind_direction_deg: Option<u16>,
    pub visibility_m: Option<u32>,
    pub cloudiness_pct: Option<u8>,
    pub sunrise_epoch_sec: Option<i64>,
    pub sunset_epoch_sec: Option<i64>,
}

impl WeatherSnapshot {
    /// Snapshot carrying only the mandatory fields.
    pub fn basic(
        temperature_c: f64,
        condition_description: impl Into<String>,
        condition_icon_id: impl Into<String>,
        humidity_pct: u8,
        wind_speed_mps: f64,
    ) -> Self {
        Self {
            location_name: None,
            temperature_c,
            feels_like_c: None,
            condition_description: condition_description.into(),
            condition_icon_id: condition_icon_id.into(),
            humidity_pct,
            pressure_hpa: None,
            wind_speed_mps,
            wind_direction_deg: None,
            visibility_m: None,
            cloudiness_pct: None,
            sunrise_epoch_sec: None,
            sunset_epoch_sec: None,
        }
    }

    pub fn with_location_name(mut self, name: impl Into<String>) -> Self {
        self.location_name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_map_keeps_in_range_points() {
        let c = Coordinate::from_map(28.6139, 77.2090).expect("valid point");
        assert_eq!(c.latitude, 28.6139);
        assert_eq!(c.longitude, 77.2090);
    }

    #[test]
    fn from_map_wraps_longitude() {
        let c = Coordinate::from_map(10.0, 190.0).expect("valid point");
        assert!((c.longitude - -170.0).abs() < 1e-9);

        let c = Coordinate::from_map(10.0, -540.0).expect("valid point");
        assert!((c.longitude - -180.0).abs() < 1e-9);
    }

    #[test]
    fn from_map_rejects_bad_input() {
        assert!(Coordinate::from_map(91.0, 0.0).is_none());
        assert!(Coordinate::from_map(f64::NAN, 0.0).is_none());
        assert!(Coordinate::from_map(0.0, f64::INFINITY).is_none());
    }

    #[test]
    fn basic_snapshot_has_no_extended_fields() {
        let s = WeatherSnapshot::basic(25.0, "clear sky", "01d", 40, 2.1);
        assert!(s.location_name.is_none());
        assert!(s.feels_like_c.is_none());
        assert!(s.sunrise_epoch_sec.is_none());
        assert_eq!(s.with_location_name("Delhi").location_name.as_deref(), Some("Delhi"));
    }
}
