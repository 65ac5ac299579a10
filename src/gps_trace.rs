use geojson::{Feature, FeatureCollection, Geometry, Value};

use crate::geo_utils::{haversine, GeoPoint};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum ProcessResult {
    Append = 0,
    NewSegment = 1,
    // negative values are for ones that are not part of the trace
    Ignore = -1,
}

impl ProcessResult {
    pub fn to_int(&self) -> i8 {
        *self as i8
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TracePoint {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp_ms: i64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraceSegment {
    pub points: Vec<TracePoint>,
}

/// What the user actually walked, split wherever the GPS went quiet for a
/// while.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GpsTrace {
    pub segments: Vec<TraceSegment>,
}

impl GpsTrace {
    pub fn new() -> Self {
        GpsTrace {
            segments: Vec::new(),
        }
    }

    pub fn push(&mut self, point: &GeoPoint, result: ProcessResult) {
        let track_point = TracePoint {
            latitude: point.latitude,
            longitude: point.longitude,
            timestamp_ms: point.timestamp_ms,
        };
        match result {
            ProcessResult::Ignore => {}
            ProcessResult::NewSegment => self.segments.push(TraceSegment {
                points: vec![track_point],
            }),
            ProcessResult::Append => match self.segments.last_mut() {
                Some(segment) => segment.points.push(track_point),
                None => self.segments.push(TraceSegment {
                    points: vec![track_point],
                }),
            },
        }
    }

    pub fn num_points(&self) -> usize {
        self.segments.iter().map(|s| s.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Gaps between segments do not count.
    pub fn length_meters(&self) -> f64 {
        self.segments
            .iter()
            .flat_map(|segment| segment.points.windows(2))
            .map(|pair| {
                haversine(
                    pair[0].latitude,
                    pair[0].longitude,
                    pair[1].latitude,
                    pair[1].longitude,
                )
            })
            .sum()
    }

    /// One `LineString` feature per segment with at least 2 points.
    pub fn to_geojson(&self) -> FeatureCollection {
        let features = self
            .segments
            .iter()
            .filter(|segment| segment.points.len() >= 2)
            .enumerate()
            .map(|(i, segment)| {
                let line = segment
                    .points
                    .iter()
                    .map(|p| vec![p.longitude, p.latitude])
                    .collect();
                let mut feature = Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(Value::LineString(line))),
                    id: None,
                    properties: None,
                    foreign_members: None,
                };
                feature.set_property("segment", i);
                feature
            })
            .collect();
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

pub struct TraceRecorder {
    last_data: Option<GeoPoint>,
    accuracy_threshold: f64,
    segment_gap_ms: i64,
}

impl TraceRecorder {
    pub fn new(accuracy_threshold: f64, segment_gap_ms: i64) -> Self {
        TraceRecorder {
            last_data: None,
            accuracy_threshold,
            segment_gap_ms,
        }
    }

    pub fn last_data(&self) -> Option<&GeoPoint> {
        self.last_data.as_ref()
    }

    pub fn preprocess(&mut self, curr_data: &GeoPoint) -> ProcessResult {
        let should_ignore = !curr_data.is_finite()
            || match curr_data.accuracy {
                Some(accuracy) => accuracy > self.accuracy_threshold,
                None => false,
            };

        let result = if should_ignore {
            ProcessResult::Ignore
        } else {
            match &self.last_data {
                None => ProcessResult::NewSegment,
                Some(last_data) => {
                    let time_diff_in_ms = curr_data.timestamp_ms - last_data.timestamp_ms;
                    if time_diff_in_ms < 0 {
                        // NOTE: a stale update from a while ago would make the
                        // trace zigzag, so it is dropped.
                        ProcessResult::Ignore
                    } else if time_diff_in_ms > self.segment_gap_ms {
                        ProcessResult::NewSegment
                    } else {
                        ProcessResult::Append
                    }
                }
            }
        };
        if result != ProcessResult::Ignore {
            self.last_data = Some(curr_data.clone());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use crate::gps_trace::ProcessResult;

    #[test]
    fn to_int() {
        assert_eq!(ProcessResult::NewSegment.to_int(), 1);
        assert_eq!(ProcessResult::Ignore.to_int(), -1);
    }
}
