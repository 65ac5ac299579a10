use std::time::{Duration, Instant};

use geo_types::Coord;
use geojson::{FeatureCollection, Geometry};

use crate::{
    circuit_progress::{CircuitProgress, Poi, ProgressUpdate},
    config::TrackingConfig,
    geo_utils::GeoPoint,
    osrm::Traject,
    route_animation::{AnimationHandle, RouteAnimator},
    route_geometry::{self, zoom_for_speed},
    user::{IgnoreReason, SpeedUpdate, User},
};

/// The route currently shown on the map.
#[derive(Clone, Debug)]
pub struct ActiveRoute {
    pub line: Geometry,
    pub start: Coord<f64>,
}

/// Everything the map needs to redraw after a location update.
#[derive(Clone, Debug)]
pub struct NavigationFrame {
    pub speed_update: SpeedUpdate,
    pub zoom: u8,
    pub prev_zone_recentered: bool,
    pub prev_zone_polygon: Option<FeatureCollection>,
    pub current_zone_polygon: Option<FeatureCollection>,
    pub passed_segment: Option<FeatureCollection>,
    pub progress: Option<ProgressUpdate>,
}

pub struct NavigationSession {
    user: User,
    route: Option<ActiveRoute>,
    circuit: Option<CircuitProgress>,
    animator: RouteAnimator,
    config: TrackingConfig,
}

impl NavigationSession {
    pub fn new(user_id: impl Into<String>, config: TrackingConfig) -> Self {
        NavigationSession {
            user: User::with_config(user_id, config.clone()),
            route: None,
            circuit: None,
            animator: RouteAnimator::new(),
            config,
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn route(&self) -> Option<&ActiveRoute> {
        self.route.as_ref()
    }

    pub fn circuit(&self) -> Option<&CircuitProgress> {
        self.circuit.as_ref()
    }

    pub fn set_route(&mut self, line: Geometry, start: Coord<f64>) {
        self.route = Some(ActiveRoute { line, start });
    }

    pub fn clear_route(&mut self) {
        self.route = None;
    }

    /// The route starts where the routing engine says it does. A traject
    /// without coordinates clears the route.
    pub fn set_traject(&mut self, traject: Traject) {
        self.route = traject.start().map(|start| ActiveRoute {
            line: traject.line_geometry(),
            start,
        });
        if self.route.is_none() {
            warn!("traject has no usable geometry, clearing the route");
        }
        self.user.set_traject(traject);
    }

    pub fn start_circuit(&mut self, circuit_id: impl Into<String>, pois: Vec<Poi>) {
        let circuit = CircuitProgress::new(circuit_id, pois, &self.config);
        info!(
            "starting circuit {} with {} POIs",
            circuit.circuit_id(),
            circuit.pois().len()
        );
        self.circuit = Some(circuit);
    }

    pub fn end_circuit(&mut self) -> Option<CircuitProgress> {
        self.circuit.take()
    }

    pub fn connectors(&self) -> Option<FeatureCollection> {
        let route = self.route.as_ref()?;
        let circuit = self.circuit.as_ref()?;
        route_geometry::build_connectors(&route.line, circuit.pois())
    }

    pub fn on_location(&mut self, point: &GeoPoint) -> NavigationFrame {
        let speed_update = self.user.update_speed(point);

        let mut prev_zone_recentered = false;
        let mut current_zone_polygon = None;
        let mut passed_segment = None;
        if let Some(location) = self.user.current_location.clone() {
            prev_zone_recentered = self
                .user
                .ensure_prev_zone_contains(&location, self.config.default_prev_zone_radius_meters);
            let current_zone = self.user.refresh_current_zone(&location);
            current_zone_polygon = route_geometry::zone_to_polygon(Some(current_zone));
            if let Some(route) = &self.route {
                passed_segment = route_geometry::compute_passed_segment(
                    &route.line,
                    location.lng_lat(),
                    route.start,
                );
            }
        }

        // a GPS jump must not reach the trace or check in at a POI
        let progress = match speed_update {
            SpeedUpdate::Ignored(IgnoreReason::Outlier) => None,
            _ => self.circuit.as_mut().map(|circuit| circuit.record(point)),
        };

        NavigationFrame {
            speed_update,
            zoom: zoom_for_speed(self.user.avg_speed_kmh()),
            prev_zone_recentered,
            prev_zone_polygon: route_geometry::zone_to_polygon(self.user.prev_zone.as_ref()),
            current_zone_polygon,
            passed_segment,
            progress,
        }
    }

    /// Animates the active route, or clears the animated line if there is
    /// none.
    pub fn start_route_animation<F>(&mut self, now: Instant, set_state: F) -> Option<AnimationHandle>
    where
        F: FnMut(Option<Vec<Coord<f64>>>),
    {
        let coords = match self.route.as_ref().map(|route| &route.line.value) {
            Some(geojson::Value::LineString(positions)) => positions.clone(),
            _ => Vec::new(),
        };
        let duration = Duration::from_millis(self.config.route_animation_duration_ms);
        self.animator.start(&coords, duration, now, set_state)
    }

    pub fn animator_mut(&mut self) -> &mut RouteAnimator {
        &mut self.animator
    }
}
