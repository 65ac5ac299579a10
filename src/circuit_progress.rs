use std::collections::HashSet;

use chrono::{DateTime, Utc};
use geo_types::Coord;
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};

use crate::{
    config::TrackingConfig,
    geo_utils::{haversine, GeoPoint},
    gps_trace::{GpsTrace, ProcessResult, TraceRecorder},
};

/// A point of interest on a circuit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Poi {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Poi {
            id: id.into(),
            name: None,
            latitude,
            longitude,
        }
    }

    pub fn lng_lat(&self) -> Coord<f64> {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }

    pub fn distance_to(&self, point: &GeoPoint) -> f64 {
        haversine(self.latitude, self.longitude, point.latitude, point.longitude)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub poi_id: String,
    pub timestamp_ms: i64,
}

impl CheckIn {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProgressUpdate {
    pub process_result: ProcessResult,
    /// POIs checked in by this fix, in circuit order.
    pub new_check_ins: Vec<String>,
}

/// Progress of one user through one circuit: the trace they walked and the
/// POIs they reached. POIs can be visited in any order.
pub struct CircuitProgress {
    circuit_id: String,
    pois: Vec<Poi>,
    check_ins: Vec<CheckIn>,
    visited: HashSet<String>,
    trace: GpsTrace,
    recorder: TraceRecorder,
    check_in_radius_meters: f64,
}

impl CircuitProgress {
    pub fn new(circuit_id: impl Into<String>, pois: Vec<Poi>, config: &TrackingConfig) -> Self {
        CircuitProgress {
            circuit_id: circuit_id.into(),
            pois,
            check_ins: Vec::new(),
            visited: HashSet::new(),
            trace: GpsTrace::new(),
            recorder: TraceRecorder::new(
                config.trace_accuracy_threshold_meters,
                config.trace_segment_gap_ms,
            ),
            check_in_radius_meters: config.check_in_radius_meters,
        }
    }

    pub fn circuit_id(&self) -> &str {
        &self.circuit_id
    }

    pub fn pois(&self) -> &[Poi] {
        &self.pois
    }

    pub fn record(&mut self, point: &GeoPoint) -> ProgressUpdate {
        let process_result = self.recorder.preprocess(point);
        self.trace.push(point, process_result);

        let mut new_check_ins = Vec::new();
        // a fix too inaccurate for the trace is not trusted for check-ins either
        if process_result != ProcessResult::Ignore {
            for poi in &self.pois {
                if self.visited.contains(&poi.id) {
                    continue;
                }
                if poi.distance_to(point) <= self.check_in_radius_meters {
                    info!("[{}] checked in at POI {}", self.circuit_id, poi.id);
                    self.visited.insert(poi.id.clone());
                    self.check_ins.push(CheckIn {
                        poi_id: poi.id.clone(),
                        timestamp_ms: point.timestamp_ms,
                    });
                    new_check_ins.push(poi.id.clone());
                }
            }
        }
        ProgressUpdate {
            process_result,
            new_check_ins,
        }
    }

    pub fn check_ins(&self) -> &[CheckIn] {
        &self.check_ins
    }

    pub fn is_checked_in(&self, poi_id: &str) -> bool {
        self.visited.contains(poi_id)
    }

    /// First POI in circuit order not visited yet.
    pub fn next_poi(&self) -> Option<&Poi> {
        self.remaining_pois().next()
    }

    pub fn remaining_pois(&self) -> impl Iterator<Item = &Poi> {
        self.pois.iter().filter(move |poi| !self.visited.contains(&poi.id))
    }

    pub fn completion_ratio(&self) -> f64 {
        if self.pois.is_empty() {
            return 1.;
        }
        let visited = self
            .pois
            .iter()
            .filter(|poi| self.visited.contains(&poi.id))
            .count();
        visited as f64 / self.pois.len() as f64
    }

    pub fn is_complete(&self) -> bool {
        self.pois.iter().all(|poi| self.visited.contains(&poi.id))
    }

    pub fn trace(&self) -> &GpsTrace {
        &self.trace
    }

    pub fn trace_length_meters(&self) -> f64 {
        self.trace.length_meters()
    }

    pub fn trace_to_geojson(&self) -> FeatureCollection {
        self.trace.to_geojson()
    }
}
