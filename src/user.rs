use crate::{
    config::{TrackingConfig, DEFAULT_CONFIG},
    geo_utils::{distance_meters, ms_to_kmh, smooth_speed_with_window, GeoPoint},
    osrm::Traject,
    route_geometry::zone_radius_for_speed,
    zone::{Zone, ZoneKind},
};

pub const DEFAULT_PREV_ZONE_RADIUS_M: f64 = 200.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    /// The sample is not newer than the current location.
    OutOfOrder,
    /// Moved less than the jitter threshold.
    Stationary,
    /// Implied speed is not physically plausible.
    Outlier,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SpeedUpdate {
    /// First sample, nothing to compute a speed from.
    Seeded,
    Updated { speed: f64 },
    // the state is left untouched
    Ignored(IgnoreReason),
}

/// Tracking state of one user, owned by whoever receives the GPS updates for
/// that user.
#[derive(Clone, Debug)]
pub struct User {
    pub id: String,
    pub current_location: Option<GeoPoint>,
    pub prev_zone: Option<Zone>,
    pub current_zone: Option<Zone>,
    /// m/s
    pub speed: f64,
    /// m/s
    pub avg_speed: f64,
    /// Oldest first.
    pub speed_history: Vec<f64>,
    pub current_traject: Option<Traject>,
    pub prev_traject: Option<Traject>,
    config: TrackingConfig,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_config(id, DEFAULT_CONFIG.clone())
    }

    pub fn with_config(id: impl Into<String>, config: TrackingConfig) -> Self {
        User {
            id: id.into(),
            current_location: None,
            prev_zone: None,
            current_zone: None,
            speed: 0.,
            avg_speed: 0.,
            speed_history: Vec::with_capacity(config.speed_history_capacity),
            current_traject: None,
            prev_traject: None,
            config,
        }
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    pub fn update_speed(&mut self, new_location: &GeoPoint) -> SpeedUpdate {
        let last = match self.current_location.clone() {
            None => {
                self.current_location = Some(new_location.clone());
                return SpeedUpdate::Seeded;
            }
            Some(last) => last,
        };

        let elapsed_secs = (new_location.timestamp_ms - last.timestamp_ms) as f64 / 1000.;
        if elapsed_secs <= 0. {
            debug!(
                "[{}] dropping out of order sample ({}ms after the last one)",
                self.id,
                new_location.timestamp_ms - last.timestamp_ms
            );
            return SpeedUpdate::Ignored(IgnoreReason::OutOfOrder);
        }
        let distance = distance_meters(&last, new_location);
        if distance < self.config.min_movement_meters {
            return SpeedUpdate::Ignored(IgnoreReason::Stationary);
        }

        let raw_speed = distance / elapsed_secs;
        let speed = smooth_speed_with_window(
            &self.speed_history,
            raw_speed,
            self.config.speed_smoothing_window,
        );
        if speed > self.config.max_speed_ms {
            debug!(
                "[{}] dropping outlier, smoothed speed {speed:.1}m/s (raw {raw_speed:.1}m/s)",
                self.id
            );
            return SpeedUpdate::Ignored(IgnoreReason::Outlier);
        }

        self.speed = speed;
        self.speed_history.push(speed);
        if self.speed_history.len() > self.config.speed_history_capacity {
            let overflow = self.speed_history.len() - self.config.speed_history_capacity;
            self.speed_history.drain(..overflow);
        }
        self.avg_speed =
            self.speed_history.iter().sum::<f64>() / self.speed_history.len() as f64;
        self.current_location = Some(new_location.clone());
        SpeedUpdate::Updated { speed }
    }

    /// Recenters `prev_zone` on `new_location` only when the user has left
    /// it. Returns true if the zone was replaced.
    pub fn ensure_prev_zone_contains(
        &mut self,
        new_location: &GeoPoint,
        default_radius: f64,
    ) -> bool {
        let radius = match &self.prev_zone {
            Some(zone) if zone.contains(new_location) => return false,
            Some(zone) => zone.radius_meters,
            None => default_radius,
        };
        self.prev_zone = Some(Zone::new(new_location.clone(), radius, ZoneKind::Fixed));
        true
    }

    /// Zone that follows the user, sized for how fast they are moving.
    pub fn refresh_current_zone(&mut self, location: &GeoPoint) -> &Zone {
        let radius = zone_radius_for_speed(ms_to_kmh(self.avg_speed));
        self.current_zone
            .insert(Zone::new(location.clone(), radius, ZoneKind::Realtime))
    }

    pub fn set_traject(&mut self, traject: Traject) {
        self.prev_traject = self.current_traject.replace(traject);
    }

    pub fn avg_speed_kmh(&self) -> f64 {
        ms_to_kmh(self.avg_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_bounded() {
        let config = TrackingConfig {
            speed_history_capacity: 3,
            speed_smoothing_window: 2,
            ..TrackingConfig::default()
        };
        let mut user = User::with_config("u", config);
        // ~11m per second going north
        for i in 0..6 {
            let point = GeoPoint::new(34.0 + 0.0001 * i as f64, -5.0, 1000 * i);
            user.update_speed(&point);
        }
        assert_eq!(user.speed_history.len(), 3);
        let mean = user.speed_history.iter().sum::<f64>() / 3.;
        assert!((user.avg_speed - mean).abs() < 1e-9);
    }
}
