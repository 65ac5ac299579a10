use chrono::{DateTime, Utc};
use geo_types::Coord;
use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS: f64 = 6371000.0; // unit: meter

/// Number of historical samples `smooth_speed` averages together with the
/// new one.
pub const SPEED_SMOOTHING_WINDOW: usize = 5;

/// A single GPS sample. Coordinates are in degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp_ms: i64,
    pub accuracy: Option<f64>,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64, timestamp_ms: i64) -> Self {
        GeoPoint {
            latitude,
            longitude,
            timestamp_ms,
            accuracy: None,
        }
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    /// Map layers work in `[lng, lat]` order, so `x` is the longitude.
    pub fn lng_lat(&self) -> Coord<f64> {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }

    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance_meters(self, other)
    }
}

// https://en.wikipedia.org/wiki/Haversine_formula
pub fn distance_meters(a: &GeoPoint, b: &GeoPoint) -> f64 {
    haversine(a.latitude, a.longitude, b.latitude, b.longitude)
}

pub fn haversine(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // rounding can push `h` a hair above 1 for antipodal points
    // `clamp` keeps NaN, `min` would not
    let c = 2.0 * h.sqrt().clamp(0.0, 1.0).asin();
    EARTH_RADIUS * c
}

/// Moving average of the last `SPEED_SMOOTHING_WINDOW - 1` entries of
/// `history` plus `new_speed`.
pub fn smooth_speed(history: &[f64], new_speed: f64) -> f64 {
    smooth_speed_with_window(history, new_speed, SPEED_SMOOTHING_WINDOW)
}

pub fn smooth_speed_with_window(history: &[f64], new_speed: f64, window: usize) -> f64 {
    let take = window.saturating_sub(1).min(history.len());
    let recent = &history[history.len() - take..];
    let sum: f64 = recent.iter().sum::<f64>() + new_speed;
    sum / (recent.len() + 1) as f64
}

pub fn ms_to_kmh(speed_ms: f64) -> f64 {
    speed_ms * 3.6
}

pub fn kmh_to_ms(speed_kmh: f64) -> f64 {
    speed_kmh / 3.6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothing_window_only_uses_recent_history() {
        let history = [100.0, 1.0, 2.0, 3.0, 4.0];
        // 100.0 falls out of the window
        assert_eq!(smooth_speed(&history, 5.0), 3.0);
    }

    #[test]
    fn smoothing_with_short_history() {
        assert_eq!(smooth_speed(&[2.0], 4.0), 3.0);
        assert_eq!(smooth_speed_with_window(&[2.0, 4.0], 6.0, 1), 6.0);
    }

    #[test]
    fn speed_conversion() {
        assert!((ms_to_kmh(10.0) - 36.0).abs() < 1e-9);
        assert!((kmh_to_ms(36.0) - 10.0).abs() < 1e-9);
    }
}
