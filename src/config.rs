use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::user::DEFAULT_PREV_ZONE_RADIUS_M;

lazy_static! {
    pub static ref DEFAULT_CONFIG: TrackingConfig = TrackingConfig::default();
}

/// Tunables for location tracking. Every field has a default so a config
/// file only needs to list what it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Moves shorter than this are treated as GPS jitter.
    pub min_movement_meters: f64,
    /// Smoothed speeds above this are sensor errors (50 m/s is 180 km/h).
    pub max_speed_ms: f64,
    pub speed_history_capacity: usize,
    pub speed_smoothing_window: usize,
    pub default_prev_zone_radius_meters: f64,
    pub check_in_radius_meters: f64,
    /// Fixes reporting a worse accuracy are left out of recorded traces.
    pub trace_accuracy_threshold_meters: f64,
    pub trace_segment_gap_ms: i64,
    pub route_animation_duration_ms: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        TrackingConfig {
            min_movement_meters: 0.5,
            max_speed_ms: 50.0,
            speed_history_capacity: 10,
            speed_smoothing_window: 5,
            default_prev_zone_radius_meters: DEFAULT_PREV_ZONE_RADIUS_M,
            check_in_radius_meters: 40.0,
            trace_accuracy_threshold_meters: 30.0,
            trace_segment_gap_ms: 30 * 1000,
            route_animation_duration_ms: 1000,
        }
    }
}

impl TrackingConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TrackingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read tracking config {path:?}"))?;
        let config = Self::from_json_str(&content)
            .with_context(|| format!("invalid tracking config {path:?}"))?;
        info!("loaded tracking config from {path:?}: {config:?}");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("min_movement_meters", self.min_movement_meters),
            ("max_speed_ms", self.max_speed_ms),
            (
                "default_prev_zone_radius_meters",
                self.default_prev_zone_radius_meters,
            ),
            ("check_in_radius_meters", self.check_in_radius_meters),
            (
                "trace_accuracy_threshold_meters",
                self.trace_accuracy_threshold_meters,
            ),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                bail!("`{name}` must be a positive number, got {value}");
            }
        }
        if self.speed_history_capacity == 0 {
            bail!("`speed_history_capacity` must be at least 1");
        }
        if self.speed_smoothing_window == 0
            || self.speed_smoothing_window > self.speed_history_capacity + 1
        {
            bail!(
                "`speed_smoothing_window` must be in 1..={}, got {}",
                self.speed_history_capacity + 1,
                self.speed_smoothing_window
            );
        }
        if self.trace_segment_gap_ms <= 0 {
            bail!("`trace_segment_gap_ms` must be positive");
        }
        Ok(())
    }
}
